use std::{io, num, path::PathBuf};

use crate::{cache::ModelHandle, factory::FactoryHandle};

/// A malformed OBJ or MTL input, located by file and 1-based line.
#[derive(thiserror::Error, Debug)]
#[error("{}:{}: {}", .file.display(), .line, .kind)]
pub struct ParseError {
    pub file: PathBuf,
    pub line: usize,
    #[source]
    pub kind: ParseErrorKind,
}

#[derive(thiserror::Error, Debug)]
pub enum ParseErrorKind {
    #[error("Failed to parse float.")]
    ParseFloat(#[from] num::ParseFloatError),
    #[error("Failed to parse integer.")]
    ParseInt(#[from] num::ParseIntError),
    #[error("\"{directive}\" needs at least {expected} components, found {found}")]
    MissingComponents {
        directive: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Face has {0} points, at least 3 are required")]
    TooFewFacePoints(usize),
    #[error("Face point \"{0}\" has no position index")]
    MissingPosition(String),
    #[error("Face references {element} {index}, but only {count} are defined")]
    DanglingIndex {
        element: &'static str,
        index: i64,
        count: usize,
    },
    #[error("Material library \"{0}\" could not be read")]
    MissingMaterialLibrary(String, #[source] io::Error),
    #[error("Invalid material library")]
    Material(#[source] Box<ParseError>),
    #[error("\"{0}\" needs a name")]
    MissingName(&'static str),
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("Failed to read \"{}\"", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("Invalid model handle {0:?}")]
    InvalidHandle(ModelHandle),
    #[error("Mesh index {index} out of range, model has {count} meshes")]
    MeshIndexOutOfRange { index: usize, count: usize },
    #[error("Failed to load model")]
    Load(#[from] LoadError),
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SplitError {
    #[error("Short index bound {0} cannot hold a single triangle")]
    BoundTooSmall(u32),
    #[error("Index count {0} is not a multiple of 3")]
    NotTriangleList(usize),
}

#[derive(thiserror::Error, Debug)]
pub enum FactoryError {
    #[error("Invalid factory handle {0:?}")]
    InvalidHandle(FactoryHandle),
    #[error("Vertex index {index} out of range, factory has {count} vertices")]
    VertexOutOfRange { index: u32, count: usize },
    #[error("Failed to write obj data")]
    Io(#[from] io::Error),
}
