use std::{collections::HashMap, path::Path};

use log::debug;
use om_format::Model;

use super::ObjFactory;
use crate::error::FactoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactoryHandle(u32);

impl FactoryHandle {
    pub fn id(self) -> u32 {
        self.0
    }

    pub fn from_id(id: u32) -> Self {
        Self(id)
    }
}

/// Open factories by handle. Handles are not reused after a close.
#[derive(Debug, Default)]
pub struct FactoryRegistry {
    factories: HashMap<FactoryHandle, ObjFactory>,
    pub(crate) next_handle: u32,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self) -> FactoryHandle {
        self.insert(ObjFactory::new())
    }

    pub fn create_from_model(&mut self, model: &Model) -> FactoryHandle {
        self.insert(ObjFactory::from_model(model))
    }

    fn insert(&mut self, factory: ObjFactory) -> FactoryHandle {
        let handle = FactoryHandle(self.next_handle);
        self.next_handle += 1;
        self.factories.insert(handle, factory);
        debug!("Opened factory {:?}", handle);
        handle
    }

    pub fn get(&self, handle: FactoryHandle) -> Result<&ObjFactory, FactoryError> {
        self.factories
            .get(&handle)
            .ok_or(FactoryError::InvalidHandle(handle))
    }

    pub fn get_mut(&mut self, handle: FactoryHandle) -> Result<&mut ObjFactory, FactoryError> {
        self.factories
            .get_mut(&handle)
            .ok_or(FactoryError::InvalidHandle(handle))
    }

    /// Saves a factory; with `close_after` it is closed once the save succeeded.
    pub fn save(
        &mut self,
        handle: FactoryHandle,
        dir: &Path,
        file: &str,
        close_after: bool,
    ) -> Result<(), FactoryError> {
        self.get(handle)?.save(dir, file)?;
        if close_after {
            self.close(handle);
        }
        Ok(())
    }

    pub fn reset(&mut self, handle: FactoryHandle) -> Result<(), FactoryError> {
        self.get_mut(handle)?.reset();
        Ok(())
    }

    pub fn close(&mut self, handle: FactoryHandle) -> bool {
        let closed = self.factories.remove(&handle).is_some();
        if closed {
            debug!("Closed factory {:?}", handle);
        }
        closed
    }

    /// Closes every open factory and returns how many there were.
    pub fn close_all(&mut self) -> usize {
        let count = self.factories.len();
        self.factories.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use om_format::VertexRecord;

    #[test]
    fn test_handles() -> Result<(), FactoryError> {
        let mut registry = FactoryRegistry::new();
        let a = registry.create();
        let b = registry.create();
        assert_ne!(a, b);

        registry.get_mut(a)?.add_vertex(VertexRecord::default());
        assert_eq!(registry.get(a)?.vertices().len(), 1);
        assert!(registry.get(b)?.vertices().is_empty());

        registry.reset(a)?;
        assert!(registry.get(a)?.vertices().is_empty());

        assert!(registry.close(a));
        assert!(!registry.close(a));
        assert!(matches!(registry.get(a), Err(FactoryError::InvalidHandle(h)) if h == a));

        let c = registry.create();
        assert_ne!(c, a);
        assert_eq!(registry.close_all(), 2);
        assert!(registry.is_empty());
        Ok(())
    }

    #[test]
    fn test_save_invalid_handle() {
        let mut registry = FactoryRegistry::new();
        assert!(matches!(
            registry.save(FactoryHandle::from_id(7), Path::new("."), "x.obj", true),
            Err(FactoryError::InvalidHandle(_))
        ));
    }
}
