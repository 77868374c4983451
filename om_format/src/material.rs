use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Presence bits of the optional material fields.
    ///
    /// The bit positions are fixed by the host interface and must not be
    /// reordered.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EnabledFields: u32 {
        const KA = 1 << 0;
        const KD = 1 << 1;
        const KS = 1 << 2;
        const MAP_KA = 1 << 3;
        const MAP_KD = 1 << 4;
        const MAP_KS = 1 << 5;
        const MAP_BUMP = 1 << 6;
    }
}

/// The texture slots a material can reference by file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Ambient,
    Diffuse,
    Specular,
    Normal,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 4] = [
        TextureSlot::Ambient,
        TextureSlot::Diffuse,
        TextureSlot::Specular,
        TextureSlot::Normal,
    ];

    pub fn field(self) -> EnabledFields {
        match self {
            TextureSlot::Ambient => EnabledFields::MAP_KA,
            TextureSlot::Diffuse => EnabledFields::MAP_KD,
            TextureSlot::Specular => EnabledFields::MAP_KS,
            TextureSlot::Normal => EnabledFields::MAP_BUMP,
        }
    }

    /// The `.mtl` directive used when writing this slot.
    pub fn mtl_keyword(self) -> &'static str {
        match self {
            TextureSlot::Ambient => "map_Ka",
            TextureSlot::Diffuse => "map_Kd",
            TextureSlot::Specular => "map_Ks",
            TextureSlot::Normal => "map_Bump",
        }
    }
}

/// A material as described by a `newmtl` block.
///
/// Every optional field is `None` unless the source populated it; the wire
/// bitset is derived from that presence in [`Material::enabled_fields`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub ambient: Option<[f32; 4]>,
    pub diffuse: Option<[f32; 4]>,
    pub specular: Option<[f32; 4]>,
    pub ambient_texture: Option<String>,
    pub diffuse_texture: Option<String>,
    pub specular_texture: Option<String>,
    pub normal_texture: Option<String>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_ambient(mut self, rgb: [f32; 3]) -> Self {
        self.ambient = Some(opaque(rgb));
        self
    }

    pub fn with_diffuse(mut self, rgb: [f32; 3]) -> Self {
        self.diffuse = Some(opaque(rgb));
        self
    }

    pub fn with_specular(mut self, rgb: [f32; 3]) -> Self {
        self.specular = Some(opaque(rgb));
        self
    }

    pub fn with_texture(mut self, slot: TextureSlot, file_name: impl Into<String>) -> Self {
        self.set_texture(slot, file_name);
        self
    }

    /// Sets a texture reference. An empty file name clears the slot.
    pub fn set_texture(&mut self, slot: TextureSlot, file_name: impl Into<String>) {
        let file_name = file_name.into();
        *self.texture_mut(slot) = if file_name.is_empty() {
            None
        } else {
            Some(file_name)
        };
    }

    /// Returns the texture file name of the slot, `None` if absent or empty.
    pub fn texture(&self, slot: TextureSlot) -> Option<&str> {
        let name = match slot {
            TextureSlot::Ambient => &self.ambient_texture,
            TextureSlot::Diffuse => &self.diffuse_texture,
            TextureSlot::Specular => &self.specular_texture,
            TextureSlot::Normal => &self.normal_texture,
        };
        name.as_deref().filter(|name| !name.is_empty())
    }

    fn texture_mut(&mut self, slot: TextureSlot) -> &mut Option<String> {
        match slot {
            TextureSlot::Ambient => &mut self.ambient_texture,
            TextureSlot::Diffuse => &mut self.diffuse_texture,
            TextureSlot::Specular => &mut self.specular_texture,
            TextureSlot::Normal => &mut self.normal_texture,
        }
    }

    pub fn enabled_fields(&self) -> EnabledFields {
        let mut fields = EnabledFields::empty();
        fields.set(EnabledFields::KA, self.ambient.is_some());
        fields.set(EnabledFields::KD, self.diffuse.is_some());
        fields.set(EnabledFields::KS, self.specular.is_some());
        for slot in TextureSlot::ALL.iter().copied() {
            fields.set(slot.field(), self.texture(slot).is_some());
        }
        fields
    }

    /// True if no optional field is populated.
    pub fn is_empty(&self) -> bool {
        self.enabled_fields().is_empty()
    }

    pub fn to_simple(&self) -> SimpleMaterial {
        SimpleMaterial {
            enabled_fields: self.enabled_fields().bits(),
            ka: self.ambient.unwrap_or_default(),
            kd: self.diffuse.unwrap_or_default(),
            ks: self.specular.unwrap_or_default(),
        }
    }
}

fn opaque([r, g, b]: [f32; 3]) -> [f32; 4] {
    [r, g, b, 1.0]
}

/// Fixed-layout material value handed across the host boundary.
///
/// Colours are only meaningful when their bit is set in `enabled_fields`;
/// disabled colours are zeroed.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SimpleMaterial {
    pub enabled_fields: u32,
    pub ka: [f32; 4],
    pub kd: [f32; 4],
    pub ks: [f32; 4],
}

impl SimpleMaterial {
    pub fn fields(&self) -> EnabledFields {
        EnabledFields::from_bits_truncate(self.enabled_fields)
    }

    pub fn has(&self, field: EnabledFields) -> bool {
        self.fields().contains(field)
    }
}
