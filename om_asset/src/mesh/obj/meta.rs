use anyhow::{Context, Result};
use objmaster::{om_format::BufferLayout, LoadOptions, MirrorMode};
use serde::Deserialize;
use std::path::Path;

/// Per-model bake settings, read from `<stem>.toml` or a folder wide `obj.toml`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct ObjMeta {
    /// Negate these axes of positions and normals (x, y, z)
    pub(crate) mirror: [bool; 3],
    pub(crate) shared_vertex_buffer: bool,
    pub(crate) max_short_index: Option<u32>,
    /// Also write a normalized copy of the obj and mtl next to the baked file
    pub(crate) resave_obj: bool,
}

impl ObjMeta {
    pub(crate) fn parse(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let meta: Self = toml::from_slice(&data)
            .with_context(|| format!("Invalid meta file: {}", path.display()))?;
        Ok(meta)
    }

    pub(crate) fn load_options(&self) -> LoadOptions {
        LoadOptions {
            layout: if self.shared_vertex_buffer {
                BufferLayout::Shared
            } else {
                BufferLayout::PerMesh
            },
        }
    }

    pub(crate) fn mirror_mode(&self) -> MirrorMode {
        MirrorMode::from_axes(self.mirror)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_meta() -> Result<()> {
        let meta: ObjMeta = toml::from_str(
            r#"
            mirror = [true, false, false]
            shared_vertex_buffer = true
            max_short_index = 65535
            "#,
        )?;

        assert_eq!(meta.mirror_mode(), MirrorMode::X);
        assert_eq!(meta.load_options(), LoadOptions::shared());
        assert_eq!(meta.max_short_index, Some(65535));
        assert!(!meta.resave_obj);
        Ok(())
    }

    #[test]
    fn test_empty_meta_is_default() -> Result<()> {
        let meta: ObjMeta = toml::from_str("")?;
        assert_eq!(meta, ObjMeta::default());
        assert_eq!(meta.mirror_mode(), MirrorMode::NONE);
        Ok(())
    }
}
