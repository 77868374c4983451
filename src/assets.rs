use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufRead, BufReader, Cursor},
    path::{Component, Path, PathBuf},
};

/// Where OBJ and MTL text comes from.
///
/// `canonical_key` must map every spelling of the same file to one key; the
/// model cache relies on it to keep a single copy per file.
pub trait AssetSource {
    fn open(&self, dir: &Path, file: &str) -> io::Result<Box<dyn BufRead + '_>>;

    fn canonical_key(&self, dir: &Path, file: &str) -> io::Result<PathBuf>;
}

/// Reads assets from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileAssets;

impl AssetSource for FileAssets {
    fn open(&self, dir: &Path, file: &str) -> io::Result<Box<dyn BufRead + '_>> {
        let file = File::open(dir.join(file))?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn canonical_key(&self, dir: &Path, file: &str) -> io::Result<PathBuf> {
        std::fs::canonicalize(dir.join(file))
    }
}

/// Serves assets from memory, keyed by lexically normalized path.
#[derive(Debug, Default, Clone)]
pub struct MemoryAssets {
    files: HashMap<PathBuf, String>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, text: impl Into<String>) {
        self.files.insert(normalize(path.as_ref()), text.into());
    }

    pub fn with(mut self, path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    fn lookup(&self, dir: &Path, file: &str) -> io::Result<(PathBuf, &str)> {
        let key = normalize(&dir.join(file));
        match self.files.get(&key) {
            Some(text) => Ok((key, text.as_str())),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no asset at {}", key.display()),
            )),
        }
    }
}

impl AssetSource for MemoryAssets {
    fn open(&self, dir: &Path, file: &str) -> io::Result<Box<dyn BufRead + '_>> {
        let (_, text) = self.lookup(dir, file)?;
        Ok(Box::new(Cursor::new(text.as_bytes())))
    }

    fn canonical_key(&self, dir: &Path, file: &str) -> io::Result<PathBuf> {
        self.lookup(dir, file).map(|(key, _)| key)
    }
}

// resolves "." and ".." without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
