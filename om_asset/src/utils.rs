use anyhow::{anyhow, Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// The file stem, e.g. `cube` for `models/cube.obj`.
pub fn file_stem(path: &Path) -> Result<&str> {
    path.file_stem()
        .ok_or_else(|| anyhow!("No file stem found: {}", path.display()))?
        .to_str()
        .ok_or_else(|| anyhow!("Can't convert file stem to string: {}", path.display()))
}

/// The full file name, e.g. `cube.obj` for `models/cube.obj`.
pub fn file_name(path: &Path) -> Result<&str> {
    path.file_name()
        .ok_or_else(|| anyhow!("No file name found: {}", path.display()))?
        .to_str()
        .ok_or_else(|| anyhow!("Can't convert file name to string: {}", path.display()))
}

pub fn combine_path(directory: &Path, file_name: &str, extension: &str) -> PathBuf {
    directory.join(format!("{}.{}", file_name, extension))
}

pub fn write_file(target: &Path, data: &[u8]) -> Result<()> {
    fs::write(target, data)
        .with_context(|| format!("Could not write data to file: {}", target.display()))
}
