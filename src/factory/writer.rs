use std::io::{self, Write};

use om_format::{Material, TextureSlot, VertexRecord};

use super::FactoryFace;

pub(crate) fn write_obj(
    out: &mut impl Write,
    vertices: &[VertexRecord],
    faces: &[FactoryFace],
    mtllib: Option<&str>,
) -> io::Result<()> {
    writeln!(out, "# objmaster: {} vertices, {} faces", vertices.len(), faces.len())?;
    if let Some(mtllib) = mtllib {
        writeln!(out, "mtllib {}", mtllib)?;
    }

    for vertex in vertices {
        let [x, y, z] = vertex.position;
        writeln!(out, "v {} {} {}", x, y, z)?;
    }
    for vertex in vertices {
        let [u, v] = vertex.uv;
        writeln!(out, "vt {} {}", u, v)?;
    }
    for vertex in vertices {
        let [i, j, k] = vertex.normal;
        writeln!(out, "vn {} {} {}", i, j, k)?;
    }

    // a reader starts in the unnamed group with no material
    let mut group = "";
    let mut material = "";
    for face in faces {
        if group != face.group {
            writeln!(out, "g {}", face.group)?;
            group = face.group.as_str();
        }
        if material != face.material {
            writeln!(out, "usemtl {}", face.material)?;
            material = face.material.as_str();
        }

        // homogeneous indices, 1-based
        let [a, b, c] = face.indices.map(|index| index + 1);
        writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}", a = a, b = b, c = c)?;
    }

    Ok(())
}

pub(crate) fn write_mtl<'a>(
    out: &mut impl Write,
    materials: impl Iterator<Item = &'a Material>,
) -> io::Result<()> {
    for material in materials.filter(|material| !material.name.is_empty()) {
        writeln!(out, "newmtl {}", material.name)?;
        write_color(out, "Ka", material.ambient)?;
        write_color(out, "Kd", material.diffuse)?;
        write_color(out, "Ks", material.specular)?;
        for slot in TextureSlot::ALL.iter().copied() {
            if let Some(file_name) = material.texture(slot) {
                writeln!(out, "{} {}", slot.mtl_keyword(), file_name)?;
            }
        }
        writeln!(out)?;
    }

    Ok(())
}

// alpha is only written when it differs from the implicit 1.0
fn write_color(out: &mut impl Write, directive: &str, color: Option<[f32; 4]>) -> io::Result<()> {
    match color {
        Some([r, g, b, a]) if a == 1.0 => writeln!(out, "{} {} {} {}", directive, r, g, b),
        Some([r, g, b, a]) => writeln!(out, "{} {} {} {} {}", directive, r, g, b, a),
        None => Ok(()),
    }
}
