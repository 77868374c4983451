use std::collections::HashMap;

use log::{debug, warn};
use om_format::Material;

use super::mtl::MaterialLibrary;
use crate::error::ParseErrorKind;

/// A face point as written in the file: 1-based, or negative for relative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RawFacePoint {
    pub(crate) position: i64,
    pub(crate) uv: Option<i64>,
    pub(crate) normal: Option<i64>,
}

/// A face point resolved to zero-based indices into the scene's element lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FacePoint {
    pub position: usize,
    pub uv: Option<usize>,
    pub normal: Option<usize>,
}

/// All triangles read while one (group, material) pair was active.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FaceGroup {
    pub group: String,
    pub material: String,
    pub triangles: Vec<[FacePoint; 3]>,
}

/// The raw result of parsing one OBJ file and its material libraries.
///
/// `groups` are in first-seen order and hold at least one triangle each.
#[derive(Debug, Default, Clone)]
pub struct ObjScene {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub groups: Vec<FaceGroup>,
    pub materials: MaterialLibrary,
}

impl ObjScene {
    pub fn triangle_count(&self) -> usize {
        self.groups.iter().map(|group| group.triangles.len()).sum()
    }

    /// The material a group refers to, or an empty placeholder of that name.
    pub fn material_for(&self, group: &FaceGroup) -> Material {
        self.materials
            .get(&group.material)
            .cloned()
            .unwrap_or_else(|| Material::new(group.material.as_str()))
    }
}

#[derive(Debug, Default)]
pub(crate) struct ObjBuilder {
    scene: ObjScene,
    current_group: String,
    current_material: String,
    group_lookup: HashMap<(String, String), usize>,
}

impl ObjBuilder {
    pub(crate) fn set_group(&mut self, name: &str) {
        debug!("Start of group: \"{}\"", name);
        self.current_group = name.to_owned();
    }

    pub(crate) fn use_material(&mut self, name: &str) {
        debug!("Using material: \"{}\"", name);
        self.current_material = name.to_owned();
    }

    pub(crate) fn add_materials(&mut self, library: MaterialLibrary) {
        self.scene.materials.merge(library);
    }

    pub(crate) fn push_position(&mut self, position: [f32; 3]) {
        self.scene.positions.push(position);
    }

    pub(crate) fn push_uv(&mut self, uv: [f32; 2]) {
        self.scene.uvs.push(uv);
    }

    pub(crate) fn push_normal(&mut self, normal: [f32; 3]) {
        self.scene.normals.push(normal);
    }

    /// Adds a polygon, fan-triangulated around its first point.
    pub(crate) fn push_face(&mut self, points: &[RawFacePoint]) -> Result<(), ParseErrorKind> {
        if points.len() < 3 {
            return Err(ParseErrorKind::TooFewFacePoints(points.len()));
        }

        let resolved = points
            .iter()
            .map(|point| self.resolve(point))
            .collect::<Result<Vec<_>, _>>()?;

        let group = self.current_group_index();
        let triangles = &mut self.scene.groups[group].triangles;
        for i in 2..resolved.len() {
            triangles.push([resolved[0], resolved[i - 1], resolved[i]]);
        }

        Ok(())
    }

    fn resolve(&self, point: &RawFacePoint) -> Result<FacePoint, ParseErrorKind> {
        Ok(FacePoint {
            position: resolve_index("position", point.position, self.scene.positions.len())?,
            uv: point
                .uv
                .map(|uv| resolve_index("texture coordinate", uv, self.scene.uvs.len()))
                .transpose()?,
            normal: point
                .normal
                .map(|normal| resolve_index("normal", normal, self.scene.normals.len()))
                .transpose()?,
        })
    }

    fn current_group_index(&mut self) -> usize {
        let key = (self.current_group.clone(), self.current_material.clone());
        if let Some(&index) = self.group_lookup.get(&key) {
            return index;
        }

        let index = self.scene.groups.len();
        self.scene.groups.push(FaceGroup {
            group: key.0.clone(),
            material: key.1.clone(),
            triangles: Vec::new(),
        });
        self.group_lookup.insert(key, index);
        index
    }

    pub(crate) fn build(self) -> ObjScene {
        let scene = self.scene;
        for group in &scene.groups {
            if !group.material.is_empty() && scene.materials.get(&group.material).is_none() {
                warn!(
                    "Material \"{}\" is not defined in any material library, using an empty one",
                    group.material
                );
            }
        }
        scene
    }
}

// 1-based indices count from the start, negative ones back from the last element
fn resolve_index(element: &'static str, index: i64, count: usize) -> Result<usize, ParseErrorKind> {
    let resolved = if index > 0 {
        Some(index as usize - 1)
    } else if index < 0 {
        (count as i64 + index).try_into().ok()
    } else {
        None
    };

    resolved
        .filter(|&i| i < count)
        .ok_or(ParseErrorKind::DanglingIndex {
            element,
            index,
            count,
        })
}
