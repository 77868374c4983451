pub(crate) mod mesh;
pub(crate) mod utils;

use anyhow::{Context, Result};
use log::{debug, warn};
use mesh::obj;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use structopt::StructOpt;
use walkdir::WalkDir;

// Cli arguments
#[derive(StructOpt, Debug)]
#[structopt(name = "om_asset")]
struct CliArgs {
    /// Specify the input folder
    input: PathBuf,
    /// Output directory, to place the baked models in
    #[structopt(short = "o", long = "output")]
    output: PathBuf,
    /// Output debug info
    #[structopt(short = "v", long = "verbose")]
    verbose: bool,
    /// Cut meshes so no part references more vertices than this, overrides the meta files
    #[structopt(long = "max-short-index")]
    max_short_index: Option<u32>,
}

/// Happens during setup
#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("Input folder does not exist: {0}")]
    InputFolderNonExistant(PathBuf),
    #[error("Output folder structure could not be created")]
    ErrorCreatingOutputStructure(#[from] io::Error),
}

fn main() -> Result<()> {
    let args = CliArgs::from_args();

    if !args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    } else {
        env_logger::Builder::new()
            .filter(None, log::LevelFilter::Debug)
            .init();
    }

    prepare(args)
}

fn prepare(args: CliArgs) -> Result<()> {
    let output_path = args.output.as_path();
    let input_path = args.input.as_path();
    if !input_path.is_dir() {
        return Err(CliError::InputFolderNonExistant(input_path.to_owned()).into());
    }

    for entry in WalkDir::new(input_path) {
        let path = match &entry {
            Err(err) => {
                warn!("Error parsing path: {}", err);
                continue;
            }
            Ok(entry) => entry.path(),
        };

        if path.is_dir() {
            continue;
        }

        // creating the output folder of the input file in the same structure
        let output = output_path.join(
            path.strip_prefix(input_path)
                .with_context(|| format!("{} is not inside the input folder", path.display()))?,
        );
        let local_output_folder = output.parent().unwrap_or(output_path);
        if !local_output_folder.exists() {
            fs::create_dir_all(local_output_folder)
                .map_err(CliError::ErrorCreatingOutputStructure)?;
        }

        process_file(path, local_output_folder, args.max_short_index)?;
    }

    Ok(())
}

fn process_file(path: &Path, output_folder: &Path, max_short_index: Option<u32>) -> Result<()> {
    // check extension
    if let Some(Some(extension)) = path.extension().map(|x| x.to_str()) {
        match extension.to_ascii_lowercase().as_ref() {
            "obj" => obj::process(path, output_folder, max_short_index)?,
            "toml" => debug!("Ignored toml file: {}", &path.display()),
            "mtl" => debug!("Ignored mtl file: {}", &path.display()),
            _ => warn!("Could not handle path: {}", &path.display()),
        }
    } else {
        warn!(
            "Ignored file \"{}\", because no file extension was found.",
            path.display()
        );
    }

    Ok(())
}
