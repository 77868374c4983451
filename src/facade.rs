use std::{path::Path, sync::Arc};

use log::error;
use om_format::{vertex, Material, Mesh, SimpleMaterial, TextureSlot, VertexRecord};

use crate::{
    cache::{ModelCache, ModelHandle},
    factory::{FactoryHandle, FactoryRegistry, ObjFactory},
    mirror::{self, MeshData, MirrorMode},
};

/// Host-facing boundary over a model cache and a factory registry.
///
/// Nothing here panics or returns an error: failures are logged and turned
/// into sentinels. Handles and counts are `-1` on error, names are `None`,
/// and an absent name is the empty string.
#[derive(Default)]
pub struct ObjMaster {
    cache: ModelCache,
    factories: FactoryRegistry,
}

impl ObjMaster {
    pub fn new(cache: ModelCache) -> Self {
        Self {
            cache,
            factories: FactoryRegistry::new(),
        }
    }

    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }

    pub fn load_model(&mut self, path: impl AsRef<Path>, file: &str) -> i32 {
        match self.cache.load(path.as_ref(), file) {
            Ok(handle) => match i32::try_from(handle.id()) {
                Ok(id) => id,
                Err(_) => {
                    error!("Model handle {:?} does not fit the host range", handle);
                    self.cache.unload(handle);
                    -1
                }
            },
            Err(err) => {
                error!("Failed to load {}: {}", path.as_ref().join(file).display(), err);
                -1
            }
        }
    }

    pub fn unload_model(&mut self, handle: i32) -> bool {
        model_handle(handle).map_or(false, |handle| self.cache.unload(handle))
    }

    pub fn unload_all_models(&mut self) -> bool {
        self.cache.unload_all();
        true
    }

    pub fn mesh_count(&self, handle: i32) -> i32 {
        model_handle(handle)
            .and_then(|handle| log_err(self.cache.mesh_count(handle)))
            .map_or(-1, to_sentinel)
    }

    /// The wire material of a mesh, all fields disabled on error.
    pub fn mesh_material(&self, handle: i32, index: i32) -> SimpleMaterial {
        self.material(handle, index)
            .map(Material::to_simple)
            .unwrap_or_default()
    }

    pub fn vertex_count(&self, handle: i32, index: i32) -> i32 {
        self.mesh(handle, index)
            .map_or(-1, |mesh| to_sentinel(mesh.vertex_count()))
    }

    pub fn vertex_buffer(&self, handle: i32, index: i32) -> Option<&[VertexRecord]> {
        self.mesh(handle, index).map(|mesh| mesh.vertices.as_slice())
    }

    /// The vertex buffer as striped `[pos.xyz, normal.xyz, uv.uv]` floats.
    pub fn vertex_floats(&self, handle: i32, index: i32) -> Option<&[f32]> {
        self.vertex_buffer(handle, index).map(vertex::as_floats)
    }

    pub fn index_count(&self, handle: i32, index: i32) -> i32 {
        self.mesh(handle, index)
            .map_or(-1, |mesh| to_sentinel(mesh.index_count()))
    }

    /// Stored indices, including the base vertex offset.
    pub fn indices(&self, handle: i32, index: i32) -> Option<&[u32]> {
        self.mesh(handle, index).map(|mesh| mesh.indices.as_slice())
    }

    pub fn base_vertex_offset(&self, handle: i32, index: i32) -> i32 {
        self.mesh(handle, index)
            .map_or(-1, |mesh| to_sentinel(mesh.base_vertex as usize))
    }

    pub fn material_name(&self, handle: i32, index: i32) -> Option<&str> {
        self.mesh(handle, index).map(Mesh::material_name)
    }

    pub fn group_face_name(&self, handle: i32, index: i32) -> Option<&str> {
        self.mesh(handle, index)
            .map(|mesh| mesh.group_face_name.as_str())
    }

    pub fn group_name(&self, handle: i32, index: i32) -> Option<&str> {
        self.mesh(handle, index).map(|mesh| mesh.group_name.as_str())
    }

    pub fn texture_file_name(&self, handle: i32, index: i32, slot: TextureSlot) -> Option<&str> {
        self.material(handle, index)
            .map(|material| material.texture(slot).unwrap_or(""))
    }

    pub fn mirrored_indices(
        &self,
        handle: i32,
        index: i32,
        mode: MirrorMode,
        reset_to_zero: bool,
    ) -> Option<Vec<u32>> {
        self.mesh(handle, index)
            .map(|mesh| mirror::mirrored_indices(mesh, mode, reset_to_zero))
    }

    pub fn mesh_data(&self, handle: i32, index: i32, mode: MirrorMode) -> Option<MeshData> {
        self.mesh(handle, index)
            .map(|mesh| mirror::mesh_data(mesh, mode))
    }

    fn mesh(&self, handle: i32, index: i32) -> Option<&Mesh> {
        let handle = model_handle(handle)?;
        let index = match usize::try_from(index) {
            Ok(index) => index,
            Err(_) => {
                error!("Invalid mesh index {}", index);
                return None;
            }
        };
        log_err(self.cache.mesh(handle, index))
    }

    fn material(&self, handle: i32, index: i32) -> Option<&Material> {
        self.mesh(handle, index).map(|mesh| &mesh.material)
    }

    pub fn create_factory(&mut self) -> i32 {
        let handle = self.factories.create();
        self.factory_sentinel(handle)
    }

    /// Opens a factory seeded with a model file; the file itself is untouched.
    pub fn create_factory_from_model(&mut self, path: impl AsRef<Path>, file: &str) -> i32 {
        let handle = match self.load_model(path, file) {
            -1 => return -1,
            handle => ModelHandle::from_id(handle as u32),
        };

        let model = self.cache.model(handle).map(Arc::clone);
        self.cache.unload(handle);
        match log_err(model) {
            Some(model) => {
                let handle = self.factories.create_from_model(&model);
                self.factory_sentinel(handle)
            }
            None => -1,
        }
    }

    pub fn factory_add_vertex(&mut self, handle: i32, vertex: VertexRecord) -> i32 {
        self.factory(handle)
            .map_or(-1, |factory| to_sentinel(factory.add_vertex(vertex) as usize))
    }

    pub fn factory_add_face(&mut self, handle: i32, a: u32, b: u32, c: u32) -> i32 {
        self.factory(handle)
            .and_then(|factory| log_err(factory.add_face(a, b, c)))
            .map_or(-1, |face| to_sentinel(face as usize))
    }

    pub fn factory_use_group(&mut self, handle: i32, name: &str) -> bool {
        match self.factory(handle) {
            Some(factory) => {
                factory.use_group(name);
                true
            }
            None => false,
        }
    }

    pub fn factory_use_material(&mut self, handle: i32, name: &str) -> bool {
        match self.factory(handle) {
            Some(factory) => {
                factory.use_material(name);
                true
            }
            None => false,
        }
    }

    pub fn factory_add_material(&mut self, handle: i32, material: Material) -> bool {
        match self.factory(handle) {
            Some(factory) => {
                factory.add_material(material);
                true
            }
            None => false,
        }
    }

    pub fn save_factory(
        &mut self,
        handle: i32,
        path: impl AsRef<Path>,
        file: &str,
        close_after: bool,
    ) -> bool {
        factory_handle(handle)
            .and_then(|handle| {
                log_err(self.factories.save(handle, path.as_ref(), file, close_after))
            })
            .is_some()
    }

    pub fn reset_factory(&mut self, handle: i32) -> bool {
        factory_handle(handle)
            .and_then(|handle| log_err(self.factories.reset(handle)))
            .is_some()
    }

    pub fn close_factory(&mut self, handle: i32) -> bool {
        factory_handle(handle).map_or(false, |handle| self.factories.close(handle))
    }

    pub fn close_all_factories(&mut self) -> bool {
        self.factories.close_all();
        true
    }

    // a handle the host cannot represent is closed again
    fn factory_sentinel(&mut self, handle: FactoryHandle) -> i32 {
        match i32::try_from(handle.id()) {
            Ok(id) => id,
            Err(_) => {
                error!("Factory handle {:?} does not fit the host range", handle);
                self.factories.close(handle);
                -1
            }
        }
    }

    fn factory(&mut self, handle: i32) -> Option<&mut ObjFactory> {
        let handle = factory_handle(handle)?;
        log_err(self.factories.get_mut(handle))
    }
}

fn model_handle(handle: i32) -> Option<ModelHandle> {
    match u32::try_from(handle) {
        Ok(id) => Some(ModelHandle::from_id(id)),
        Err(_) => {
            error!("Invalid model handle {}", handle);
            None
        }
    }
}

fn factory_handle(handle: i32) -> Option<FactoryHandle> {
    match u32::try_from(handle) {
        Ok(id) => Some(FactoryHandle::from_id(id)),
        Err(_) => {
            error!("Invalid factory handle {}", handle);
            None
        }
    }
}

fn to_sentinel(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(-1)
}

fn log_err<T, E: std::fmt::Display>(result: Result<T, E>) -> Option<T> {
    result.map_err(|err| error!("{}", err)).ok()
}
