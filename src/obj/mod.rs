mod builder;
mod mtl;
mod parser;

use std::path::Path;

use om_format::Model;

pub use builder::{FaceGroup, FacePoint, ObjScene};
pub use mtl::MaterialLibrary;

use crate::{assets::AssetSource, error::LoadError, partition, partition::LoadOptions};

/// Parses an OBJ file and its material libraries without partitioning.
pub fn parse_scene(assets: &dyn AssetSource, dir: &Path, file: &str) -> Result<ObjScene, LoadError> {
    parser::parse(assets, dir, file)
}

/// Parses an OBJ file and partitions it into one mesh per (group, material).
pub fn load_model(
    assets: &dyn AssetSource,
    dir: &Path,
    file: &str,
    options: &LoadOptions,
) -> Result<Model, LoadError> {
    let scene = parser::parse(assets, dir, file)?;
    Ok(partition::partition(&scene, options))
}
