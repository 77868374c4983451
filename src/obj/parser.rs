use std::{io::BufRead, path::Path};

use log::{debug, info, warn};

use super::{
    builder::{ObjBuilder, ObjScene, RawFacePoint},
    mtl,
};
use crate::{
    assets::AssetSource,
    error::{LoadError, ParseError, ParseErrorKind},
};

// parses wavefront obj (https://en.wikipedia.org/wiki/Wavefront_.obj_file)
// together with every material library it references
pub(crate) fn parse(assets: &dyn AssetSource, dir: &Path, file: &str) -> Result<ObjScene, LoadError> {
    let path = dir.join(file);
    let reader = assets.open(dir, file).map_err(|source| LoadError::Io {
        path: path.clone(),
        source,
    })?;
    info!("Loading model: {}", path.display());

    let mut parser = ObjParser {
        assets,
        dir,
        builder: ObjBuilder::default(),
    };

    for (number, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;

        if let Some((token, value)) = split_directive(&line) {
            parser
                .parse_token(token, value)
                .map_err(|kind| ParseError {
                    file: path.clone(),
                    line: number + 1,
                    kind,
                })?;
        }
    }

    let scene = parser.builder.build();
    info!(
        "Read {} positions, {} uvs, {} normals, {} triangles in {} groups, {} materials",
        scene.positions.len(),
        scene.uvs.len(),
        scene.normals.len(),
        scene.triangle_count(),
        scene.groups.len(),
        scene.materials.len()
    );
    Ok(scene)
}

struct ObjParser<'a> {
    assets: &'a dyn AssetSource,
    dir: &'a Path,
    builder: ObjBuilder,
}

impl ObjParser<'_> {
    fn parse_token(&mut self, token: &str, value: &str) -> Result<(), ParseErrorKind> {
        match token {
            // material libraries
            "mtllib" => self.load_material_libraries(value)?,
            // object and group names both start a new group
            "o" | "g" => self.builder.set_group(value),
            "usemtl" => self.builder.use_material(value),
            // vertex
            "v" => self.builder.push_position(parse_vec3("v", value)?),
            // texture coordinates
            "vt" => self.builder.push_uv(parse_uv(value)?),
            // vertex normals
            "vn" => self.builder.push_normal(parse_vec3("vn", value)?),
            "f" => self.builder.push_face(&parse_face(value)?)?,
            // smoothing groups, parameter space vertices, lines and points
            "s" | "vp" | "l" | "p" => debug!("Ignoring \"{}\" directive", token),
            _ => warn!("Found unknown token: \"{}\"", token),
        };

        Ok(())
    }

    fn load_material_libraries(&mut self, value: &str) -> Result<(), ParseErrorKind> {
        if value.is_empty() {
            warn!("mtllib without a file name. Ignoring.");
        }

        for name in value.split_whitespace() {
            let reader = self
                .assets
                .open(self.dir, name)
                .map_err(|err| ParseErrorKind::MissingMaterialLibrary(name.to_owned(), err))?;

            let library = match mtl::parse_mtl(reader, &self.dir.join(name)) {
                Ok(library) => library,
                Err(LoadError::Io { source, .. }) => {
                    return Err(ParseErrorKind::MissingMaterialLibrary(name.to_owned(), source))
                }
                Err(LoadError::Parse(err)) => return Err(ParseErrorKind::Material(Box::new(err))),
            };
            self.builder.add_materials(library);
        }

        Ok(())
    }
}

/// Splits a line into its directive and the trimmed rest.
///
/// Blank lines and comments yield `None`.
pub(crate) fn split_directive(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    Some(match line.split_once(char::is_whitespace) {
        Some((token, value)) => (token, value.trim()),
        None => (line, ""),
    })
}

// parses numbers seperated by whitespace, requiring at least `expected` of them
pub(crate) fn parse_numbers(
    directive: &'static str,
    value: &str,
    expected: usize,
) -> Result<Vec<f32>, ParseErrorKind> {
    let numbers = value
        .split_whitespace()
        .map(|x| x.parse())
        .collect::<Result<Vec<f32>, _>>()?;

    if numbers.len() < expected {
        return Err(ParseErrorKind::MissingComponents {
            directive,
            expected,
            found: numbers.len(),
        });
    }
    Ok(numbers)
}

// extra components (w, vertex colours) are ignored
fn parse_vec3(directive: &'static str, value: &str) -> Result<[f32; 3], ParseErrorKind> {
    let numbers = parse_numbers(directive, value, 3)?;
    Ok([numbers[0], numbers[1], numbers[2]])
}

fn parse_uv(value: &str) -> Result<[f32; 2], ParseErrorKind> {
    let numbers = parse_numbers("vt", value, 1)?;
    Ok([numbers[0], numbers.get(1).copied().unwrap_or(0.0)])
}

fn parse_face(value: &str) -> Result<Vec<RawFacePoint>, ParseErrorKind> {
    value.split_whitespace().map(parse_face_point).collect()
}

// v, v/vt, v/vt/vn or v//vn
fn parse_face_point(value: &str) -> Result<RawFacePoint, ParseErrorKind> {
    let triplet = parse_triplet(value)?;

    Ok(RawFacePoint {
        position: triplet[0].ok_or_else(|| ParseErrorKind::MissingPosition(value.to_owned()))?,
        uv: triplet[1],
        normal: triplet[2],
    })
}

fn parse_triplet(value: &str) -> Result<[Option<i64>; 3], ParseErrorKind> {
    let mut ret = [None; 3];

    for (a, b) in ret.iter_mut().zip(value.split('/')) {
        *a = if b.is_empty() { None } else { Some(b.parse()?) }
    }

    Ok(ret)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::assets::MemoryAssets;

    fn parse_text(obj: &str) -> Result<ObjScene, LoadError> {
        let assets = MemoryAssets::new().with("m/model.obj", obj);
        parse(&assets, Path::new("m"), "model.obj")
    }

    #[test]
    fn test_split_directive() {
        assert_eq!(split_directive("v 1 2 3"), Some(("v", "1 2 3")));
        assert_eq!(split_directive("  f\t1 2   3  "), Some(("f", "1 2   3")));
        assert_eq!(split_directive("g"), Some(("g", "")));
        assert_eq!(split_directive("# comment"), None);
        assert_eq!(split_directive("#comment"), None);
        assert_eq!(split_directive("   "), None);
    }

    #[test]
    fn test_parse_numbers() -> Result<(), ParseErrorKind> {
        assert_eq!(parse_vec3("v", "1.0 -2 3e1 1.0")?, [1.0, -2.0, 30.0]);
        assert_eq!(parse_uv("0.5")?, [0.5, 0.0]);
        assert_eq!(parse_uv("0.5 0.25 0")?, [0.5, 0.25]);
        assert!(matches!(
            parse_vec3("vn", "1 2"),
            Err(ParseErrorKind::MissingComponents { found: 2, .. })
        ));
        assert!(matches!(parse_vec3("v", "1 a 2"), Err(ParseErrorKind::ParseFloat(_))));
        Ok(())
    }

    #[test]
    fn test_parse_face() -> Result<(), ParseErrorKind> {
        let face = parse_face("1 2/3 4/5/6 7//8 -1/-2/-3")?;
        assert_eq!(
            face,
            vec![
                RawFacePoint { position: 1, uv: None, normal: None },
                RawFacePoint { position: 2, uv: Some(3), normal: None },
                RawFacePoint { position: 4, uv: Some(5), normal: Some(6) },
                RawFacePoint { position: 7, uv: None, normal: Some(8) },
                RawFacePoint { position: -1, uv: Some(-2), normal: Some(-3) },
            ]
        );
        assert!(matches!(parse_face("/1/1"), Err(ParseErrorKind::MissingPosition(_))));
        assert!(matches!(parse_face("1 x 3"), Err(ParseErrorKind::ParseInt(_))));
        Ok(())
    }

    #[test]
    fn test_parse_scene() -> Result<(), LoadError> {
        let scene = parse_text(
            "\
# quad in two groups
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vn 0 0 1
s off
g first
f 1/1/1 2/1/1 3/1/1
o second
f -4//1 -2//1 -1//1
",
        )?;

        assert_eq!(scene.positions.len(), 4);
        assert_eq!(scene.uvs.len(), 1);
        assert_eq!(scene.normals.len(), 1);
        assert_eq!(scene.groups.len(), 2);
        assert_eq!(scene.groups[0].group, "first");
        assert_eq!(scene.groups[1].group, "second");
        assert_eq!(scene.groups[1].triangles[0][0].position, 0);
        assert_eq!(scene.groups[1].triangles[0][2].position, 3);
        assert_eq!(scene.groups[1].triangles[0][0].uv, None);
        Ok(())
    }

    #[test]
    fn test_errors_carry_line() {
        let err = parse_text("v 0 0 0\nv 1 0 0\n\nf 1 2 3\n").err();
        match err {
            Some(LoadError::Parse(err)) => {
                assert_eq!(err.line, 4);
                assert_eq!(err.file, Path::new("m/model.obj"));
                assert!(matches!(err.kind, ParseErrorKind::DanglingIndex { index: 3, .. }));
            }
            other => panic!("unexpected result: {:?}", other),
        }

        assert!(matches!(
            parse_text("v 0 0 0\nf 1 1\n"),
            Err(LoadError::Parse(ParseError {
                kind: ParseErrorKind::TooFewFacePoints(2),
                ..
            }))
        ));
    }

    #[test]
    fn test_missing_material_library() {
        assert!(matches!(
            parse_text("mtllib missing.mtl\n"),
            Err(LoadError::Parse(ParseError {
                line: 1,
                kind: ParseErrorKind::MissingMaterialLibrary(..),
                ..
            }))
        ));
    }

    #[test]
    fn test_material_libraries() -> Result<(), LoadError> {
        let assets = MemoryAssets::new()
            .with("m/model.obj", "mtllib a.mtl b.mtl\nv 0 0 0\nusemtl red\nf 1 1 1\n")
            .with("m/a.mtl", "newmtl red\nKd 1 0 0\n")
            .with("m/b.mtl", "newmtl red\nKd 0.5 0 0\nnewmtl blue\nKd 0 0 1\n");
        let scene = parse(&assets, Path::new("m"), "model.obj")?;

        assert_eq!(scene.materials.len(), 2);
        let red = scene.material_for(&scene.groups[0]);
        assert_eq!(red.diffuse, Some([0.5, 0.0, 0.0, 1.0]));
        Ok(())
    }
}
