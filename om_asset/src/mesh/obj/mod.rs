mod meta;

use anyhow::{Context, Result};
use log::info;
use objmaster::{mirror, split_to_short_indices, FileAssets, ModelCache, MirrorMode, ObjFactory};
use om_format::{BufferLayout, Mesh, Model};
use std::path::Path;

use crate::utils;

use self::meta::ObjMeta;

fn load(path: &Path, meta: &ObjMeta) -> Result<Model> {
    let dir = path
        .parent()
        .with_context(|| format!("Path terminates in root or prefix: {}", path.display()))?;
    let file = utils::file_name(path)?;

    let mut cache = ModelCache::new(FileAssets, meta.load_options());
    let handle = cache
        .load(dir, file)
        .with_context(|| format!("Could not load model: {}", path.display()))?;
    let model = Model::clone(cache.model(handle)?);
    cache.unload(handle);
    Ok(model)
}

// re-derives base offsets after meshes were cut
fn with_layout(meshes: Vec<Mesh>, layout: BufferLayout) -> Model {
    let mut base_vertex = 0;
    let meshes = meshes
        .into_iter()
        .map(|mut mesh| {
            let local: Vec<u32> = mesh.local_indices().collect();
            mesh.base_vertex = match layout {
                BufferLayout::PerMesh => 0,
                BufferLayout::Shared => base_vertex,
            };
            mesh.indices = local.into_iter().map(|i| i + mesh.base_vertex).collect();
            base_vertex += mesh.vertices.len() as u32;
            mesh
        })
        .collect();

    Model { meshes, layout }
}

fn split(model: Model, max_short_index: u32) -> Result<Model> {
    let mut meshes = Vec::with_capacity(model.meshes.len());
    for mesh in &model.meshes {
        let parts = split_to_short_indices(mesh, max_short_index)
            .with_context(|| format!("Could not split mesh {}", mesh.group_face_name))?;
        if parts.len() > 1 {
            info!(
                "Split mesh {} into {} parts",
                mesh.group_face_name,
                parts.len()
            );
        }
        meshes.extend(parts);
    }
    Ok(with_layout(meshes, model.layout))
}

fn serialize(model: Model) -> Result<Vec<u8>> {
    model.to_bytes().context("Could not serialize Model")
}

fn save(path: &Path, output_dir: &Path, data: &[u8]) -> Result<()> {
    let file_name = utils::file_stem(path)?;
    let target = utils::combine_path(output_dir, file_name, "vem");
    utils::write_file(&target, data)
}

fn resave_obj(path: &Path, output_dir: &Path, model: &Model) -> Result<()> {
    let file_name = utils::file_name(path)?;
    ObjFactory::from_model(model)
        .save(output_dir, file_name)
        .with_context(|| format!("Could not re-save {}", path.display()))?;
    Ok(())
}

/// Parse meta from file called `<stem>.toml` or alternatively from the folder scoped meta file
/// `obj.toml`, else use the default meta
fn parse_meta(path: &Path) -> Result<ObjMeta> {
    let dir = path
        .parent()
        .with_context(|| format!("Path terminates in root or prefix: {}", path.display()))?;

    let model_meta = utils::combine_path(dir, utils::file_stem(path)?, "toml");
    if model_meta.is_file() {
        return ObjMeta::parse(&model_meta);
    }

    // check if folder scoped meta exists
    let folder_meta = utils::combine_path(dir, "obj", "toml");
    if folder_meta.is_file() {
        return ObjMeta::parse(&folder_meta);
    }

    Ok(ObjMeta::default())
}

pub(crate) fn process(path: &Path, output_dir: &Path, max_short_index: Option<u32>) -> Result<()> {
    info!("Processing Wavefront `.obj`-file: `{}`", path.display());
    let meta = parse_meta(path)?;

    let mut model = load(path, &meta)?;
    let mirror_mode = meta.mirror_mode();
    if mirror_mode != MirrorMode::NONE {
        model = mirror::mirror_model(&model, mirror_mode);
    }
    if let Some(max_short_index) = max_short_index.or(meta.max_short_index) {
        model = split(model, max_short_index)?;
    }

    if meta.resave_obj {
        resave_obj(path, output_dir, &model)?;
    }
    save(path, output_dir, &serialize(model)?)
}
