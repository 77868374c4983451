use std::{collections::HashMap, io::BufRead, path::Path};

use log::{debug, warn};
use om_format::{Material, TextureSlot};

use super::parser::{parse_numbers, split_directive};
use crate::error::{LoadError, ParseError, ParseErrorKind};

/// Materials by name, in definition order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MaterialLibrary {
    materials: Vec<Material>,
    lookup: HashMap<String, usize>,
}

impl MaterialLibrary {
    pub fn get(&self, name: &str) -> Option<&Material> {
        self.lookup.get(name).map(|&index| &self.materials[index])
    }

    /// Adds a material, replacing an earlier one of the same name in place.
    pub fn insert(&mut self, material: Material) {
        match self.lookup.get(&material.name) {
            Some(&index) => self.materials[index] = material,
            None => {
                self.lookup
                    .insert(material.name.clone(), self.materials.len());
                self.materials.push(material);
            }
        }
    }

    pub fn merge(&mut self, other: MaterialLibrary) {
        for material in other.materials {
            self.insert(material);
        }
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }
}

/// Parses a `.mtl` file.
pub(crate) fn parse_mtl(reader: impl BufRead, file: &Path) -> Result<MaterialLibrary, LoadError> {
    let mut library = MaterialLibrary::default();
    let mut current: Option<Material> = None;

    for (number, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| LoadError::Io {
            path: file.to_owned(),
            source,
        })?;

        parse_mtl_line(&line, &mut current, &mut library).map_err(|kind| ParseError {
            file: file.to_owned(),
            line: number + 1,
            kind,
        })?;
    }

    if let Some(material) = current {
        library.insert(material);
    }

    debug!("Read {} materials from {}", library.len(), file.display());
    Ok(library)
}

fn parse_mtl_line(
    line: &str,
    current: &mut Option<Material>,
    library: &mut MaterialLibrary,
) -> Result<(), ParseErrorKind> {
    let (token, value) = match split_directive(line) {
        Some(directive) => directive,
        None => return Ok(()),
    };
    let token = token.to_ascii_lowercase();

    if token == "newmtl" {
        if value.is_empty() {
            return Err(ParseErrorKind::MissingName("newmtl"));
        }
        if let Some(done) = current.replace(Material::new(value)) {
            library.insert(done);
        }
        return Ok(());
    }

    let material = match current {
        Some(material) => material,
        None => {
            warn!("Ignoring \"{}\" outside of a material", token);
            return Ok(());
        }
    };

    match token.as_str() {
        "ka" => material.ambient = parse_color("Ka", value)?,
        "kd" => material.diffuse = parse_color("Kd", value)?,
        "ks" => material.specular = parse_color("Ks", value)?,
        "map_ka" => material.set_texture(TextureSlot::Ambient, parse_map_file("map_Ka", value)?),
        "map_kd" => material.set_texture(TextureSlot::Diffuse, parse_map_file("map_Kd", value)?),
        "map_ks" => material.set_texture(TextureSlot::Specular, parse_map_file("map_Ks", value)?),
        "map_bump" | "bump" => {
            material.set_texture(TextureSlot::Normal, parse_map_file("map_Bump", value)?)
        }
        _ => debug!("Ignoring material directive \"{}\"", token),
    }

    Ok(())
}

// "r g b [a]"; the spectral and xyz forms leave the colour unset
fn parse_color(directive: &'static str, value: &str) -> Result<Option<[f32; 4]>, ParseErrorKind> {
    if value.starts_with("spectral") || value.starts_with("xyz") {
        warn!("{} {} is not supported. Ignoring.", directive, value);
        return Ok(None);
    }

    let numbers = parse_numbers(directive, value, 3)?;
    let alpha = numbers.get(3).copied().unwrap_or(1.0);
    Ok(Some([numbers[0], numbers[1], numbers[2], alpha]))
}

/// Splits the file name off a `map_*` value.
///
/// Leading options like `-bm 0.5` or `-s 1 1 1` are skipped. Everything after
/// them is the file name, which may contain spaces.
fn parse_map_file<'a>(directive: &'static str, value: &'a str) -> Result<&'a str, ParseErrorKind> {
    let mut rest = value.trim();
    while let Some(arg_count) = map_option_args(next_token(rest).0) {
        rest = next_token(rest).1;
        for taken in 0..arg_count.max {
            let (arg, after) = next_token(rest);
            if taken >= arg_count.min && arg.parse::<f32>().is_err() {
                break;
            }
            rest = after;
        }
    }

    if rest.is_empty() {
        return Err(ParseErrorKind::MissingComponents {
            directive,
            expected: 1,
            found: 0,
        });
    }
    Ok(rest)
}

struct OptionArgs {
    min: usize,
    max: usize,
}

fn map_option_args(option: &str) -> Option<OptionArgs> {
    let (min, max) = match option {
        "-blendu" | "-blendv" | "-cc" | "-clamp" | "-texres" | "-bm" | "-boost" | "-imfchan"
        | "-type" => (1, 1),
        "-mm" => (2, 2),
        "-o" | "-s" | "-t" => (1, 3),
        _ => return None,
    };
    Some(OptionArgs { min, max })
}

// first whitespace separated token and the trimmed remainder
fn next_token(value: &str) -> (&str, &str) {
    let value = value.trim_start();
    let end = value.find(char::is_whitespace).unwrap_or(value.len());
    (&value[..end], value[end..].trim_start())
}
