//! Loads Wavefront OBJ/MTL models into renderer-ready meshes, caches them by
//! file, cuts oversized meshes for short index buffers and writes OBJ data
//! back out.

pub mod assets;
pub mod cache;
pub mod error;
pub mod facade;
pub mod factory;
pub mod mirror;
pub mod obj;
pub mod partition;
pub mod split;

pub use om_format;

pub use assets::{AssetSource, FileAssets, MemoryAssets};
pub use cache::{ModelCache, ModelHandle, SharedModelCache};
pub use error::{CacheError, FactoryError, LoadError, ParseError, ParseErrorKind, SplitError};
pub use facade::ObjMaster;
pub use factory::{FactoryHandle, FactoryRegistry, ObjFactory};
pub use mirror::{MeshData, MirrorMode};
pub use partition::LoadOptions;
pub use split::{short_index_head_tail_cut, split_to_short_indices, HeadTailCut};
