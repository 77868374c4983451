use std::{collections::HashMap, path::Path, path::PathBuf, sync::Arc};

use log::{debug, info};
use om_format::{Material, Mesh, Model};
use parking_lot::Mutex;

use crate::{
    assets::{AssetSource, FileAssets},
    error::{CacheError, LoadError},
    obj,
    partition::LoadOptions,
};

/// Opaque id of a loaded model. Ids are never reused by the cache that
/// issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelHandle(u32);

impl ModelHandle {
    pub fn id(self) -> u32 {
        self.0
    }

    pub fn from_id(id: u32) -> Self {
        Self(id)
    }
}

#[derive(Debug)]
struct CacheEntry {
    key: PathBuf,
    model: Arc<Model>,
    ref_count: usize,
}

/// Reference counted models, at most one per distinct file.
pub struct ModelCache {
    assets: Box<dyn AssetSource + Send>,
    options: LoadOptions,
    entries: HashMap<ModelHandle, CacheEntry>,
    keys: HashMap<PathBuf, ModelHandle>,
    pub(crate) next_handle: u32,
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new(FileAssets, LoadOptions::default())
    }
}

impl ModelCache {
    pub fn new(assets: impl AssetSource + Send + 'static, options: LoadOptions) -> Self {
        Self {
            assets: Box::new(assets),
            options,
            entries: HashMap::new(),
            keys: HashMap::new(),
            next_handle: 0,
        }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Loads `dir/file`, or takes another reference to it if already loaded.
    ///
    /// A failed load leaves the cache unchanged.
    pub fn load(&mut self, dir: &Path, file: &str) -> Result<ModelHandle, LoadError> {
        let key = self
            .assets
            .canonical_key(dir, file)
            .map_err(|source| LoadError::Io {
                path: dir.join(file),
                source,
            })?;

        if let Some(&handle) = self.keys.get(&key) {
            if let Some(entry) = self.entries.get_mut(&handle) {
                entry.ref_count += 1;
                debug!(
                    "Cache hit for {} ({:?}, {} references)",
                    key.display(),
                    handle,
                    entry.ref_count
                );
                return Ok(handle);
            }
        }

        let model = obj::load_model(&*self.assets, dir, file, &self.options)?;

        let handle = ModelHandle(self.next_handle);
        self.next_handle += 1;
        info!(
            "Loaded {} as {:?} with {} meshes",
            key.display(),
            handle,
            model.meshes.len()
        );

        self.keys.insert(key.clone(), handle);
        self.entries.insert(
            handle,
            CacheEntry {
                key,
                model: Arc::new(model),
                ref_count: 1,
            },
        );
        Ok(handle)
    }

    /// Drops one reference; the model is freed with the last one.
    ///
    /// Returns `false` for handles that are not loaded.
    pub fn unload(&mut self, handle: ModelHandle) -> bool {
        let entry = match self.entries.get_mut(&handle) {
            Some(entry) => entry,
            None => {
                debug!("Unload of unknown handle {:?}", handle);
                return false;
            }
        };

        entry.ref_count -= 1;
        if entry.ref_count == 0 {
            if let Some(entry) = self.entries.remove(&handle) {
                self.keys.remove(&entry.key);
                info!("Freed {} ({:?})", entry.key.display(), handle);
            }
        }
        true
    }

    /// Frees every model regardless of outstanding references and returns
    /// how many were freed.
    pub fn unload_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.keys.clear();
        info!("Freed all {} models", count);
        count
    }

    pub fn is_loaded(&self, handle: ModelHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ref_count(&self, handle: ModelHandle) -> Result<usize, CacheError> {
        Ok(self.entry(handle)?.ref_count)
    }

    pub fn model(&self, handle: ModelHandle) -> Result<&Arc<Model>, CacheError> {
        Ok(&self.entry(handle)?.model)
    }

    pub fn mesh_count(&self, handle: ModelHandle) -> Result<usize, CacheError> {
        Ok(self.model(handle)?.meshes.len())
    }

    pub fn mesh(&self, handle: ModelHandle, index: usize) -> Result<&Mesh, CacheError> {
        let meshes = &self.model(handle)?.meshes;
        meshes.get(index).ok_or(CacheError::MeshIndexOutOfRange {
            index,
            count: meshes.len(),
        })
    }

    pub fn material(&self, handle: ModelHandle, index: usize) -> Result<&Material, CacheError> {
        Ok(&self.mesh(handle, index)?.material)
    }

    fn entry(&self, handle: ModelHandle) -> Result<&CacheEntry, CacheError> {
        self.entries
            .get(&handle)
            .ok_or(CacheError::InvalidHandle(handle))
    }
}

/// A [`ModelCache`] for concurrent callers.
///
/// Every refcount change happens under one lock; queries hand out `Arc`
/// snapshots that stay valid after the model is unloaded.
#[derive(Clone)]
pub struct SharedModelCache {
    inner: Arc<Mutex<ModelCache>>,
}

impl SharedModelCache {
    pub fn new(cache: ModelCache) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    pub fn load(&self, dir: &Path, file: &str) -> Result<ModelHandle, LoadError> {
        self.inner.lock().load(dir, file)
    }

    pub fn unload(&self, handle: ModelHandle) -> bool {
        self.inner.lock().unload(handle)
    }

    pub fn unload_all(&self) -> usize {
        self.inner.lock().unload_all()
    }

    pub fn model(&self, handle: ModelHandle) -> Result<Arc<Model>, CacheError> {
        self.inner.lock().model(handle).map(Arc::clone)
    }

    pub fn ref_count(&self, handle: ModelHandle) -> Result<usize, CacheError> {
        self.inner.lock().ref_count(handle)
    }
}
