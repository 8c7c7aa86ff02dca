use anyhow::{anyhow, Context, Result};
use clap::Parser;
use config::{Config, Environment, File};
use log::info;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::material::MaterialDef;
use crate::sphere::SphereParams;

#[cfg(test)]
mod tests {

    use super::*;

    fn settings() -> Settings {
        Settings {
            domain: [0.1, 0.1, 0.1],
            dl: [0.01, 0.01, 0.01],
            average_volume_objects: true,
            materials: vec![],
            spheres: vec![],
            output_dir: default_output_dir(),
        }
    }

    #[test]
    fn default_config_loads() {
        let config = load_default_config().unwrap();
        assert!(!config.materials.is_empty());
        assert!(!config.spheres.is_empty());
        assert!(config.dl.iter().all(|&d| d > 0.0));
    }

    #[test]
    fn rejects_non_positive_pitch() {
        let mut config = settings();
        assert!(validate_config(&config).is_ok());
        config.dl[1] = 0.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_pitch_larger_than_domain() {
        let mut config = settings();
        config.dl[2] = 0.2;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn cli_overrides() {
        let args = CliArgs::parse_from(["fdtd-geom", "--averaging", "false", "-o", "out"]);
        let mut config = settings();
        apply_cli_overrides(&mut config, &args);
        assert!(!config.average_volume_objects);
        assert_eq!(config.output_dir, "out");
    }
}

/// Model description: the domain, its discretisation, materials and shapes.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    /// Domain extent along x, y, z in metres.
    pub domain: [f64; 3],
    /// Cell pitch (dx, dy, dz) in metres.
    pub dl: [f64; 3],
    /// Whether volumetric shapes are smoothed unless they say otherwise.
    #[serde(default = "default_average_volume_objects")]
    pub average_volume_objects: bool,
    #[serde(default)]
    pub materials: Vec<MaterialDef>,
    /// Sphere commands, applied in order.
    #[serde(default)]
    pub spheres: Vec<SphereParams>,
    /// Directory the report is written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_average_volume_objects() -> bool {
    true
}

fn default_output_dir() -> String {
    "output".to_string()
}

/// Loads `config/default.toml` from the project root, without overrides.
pub fn load_default_config() -> Result<Settings> {
    let root = retrieve_project_root()?;
    let default_config_file = root.join("config/default.toml");

    let settings = Config::builder()
        .add_source(File::from(default_config_file).required(true))
        .build()
        .context("Error loading configuration")?;

    let config: Settings = settings
        .try_deserialize()
        .context("Error deserializing configuration")?;

    validate_config(&config)?;

    Ok(config)
}

/// Loads the settings file at `path`, overridden by `FDTD_GEOM_*` variables.
pub fn load_config_from(path: &Path) -> Result<Settings> {
    let settings = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(Environment::with_prefix("fdtd_geom"))
        .build()
        .with_context(|| format!("Error loading configuration {:?}", path))?;

    let config: Settings = settings
        .try_deserialize()
        .with_context(|| format!("Error deserializing configuration {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Loads settings for the command line tool.
///
/// The file is `--config` if given, otherwise `config/local.toml` when it
/// exists, otherwise `config/default.toml`. Environment variables and then
/// command-line flags override it.
pub fn load_config(args: &CliArgs) -> Result<Settings> {
    let config_file = match &args.config {
        Some(path) => path.clone(),
        None => {
            let root = retrieve_project_root()?;
            let default_config_file = root.join("config/default.toml");
            let local_config = root.join("config/local.toml");
            if local_config.exists() {
                local_config
            } else {
                default_config_file
            }
        }
    };
    info!("Using configuration: {:?}", config_file);

    let mut config = load_config_from(&config_file)?;
    apply_cli_overrides(&mut config, args);
    validate_config(&config)?;

    Ok(config)
}

fn apply_cli_overrides(config: &mut Settings, args: &CliArgs) {
    if let Some(averaging) = args.averaging {
        config.average_volume_objects = averaging;
    }
    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }
}

/// Retrieve the project root directory.
/// This function tries to find the project root directory in different ways:
/// 1. If the CARGO_MANIFEST_DIR environment variable is set, use it.
/// 2. If the FDTD_GEOM_ROOT_DIR environment variable is set, use it.
/// 3. If the "config" subdirectory is found in the executable directory or any of its parents, use it.
fn retrieve_project_root() -> Result<PathBuf> {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        // When running through cargo (e.g. cargo run, cargo test)
        return Ok(PathBuf::from(manifest_dir));
    }
    if let Ok(path) = env::var("FDTD_GEOM_ROOT_DIR") {
        return Ok(PathBuf::from(path));
    }

    // Walk upward from the executable looking for a "config" subdirectory
    let exe_path = env::current_exe().context("Failed to get current executable path")?;
    exe_path
        .ancestors()
        .skip(1)
        .find(|dir| dir.join("config").is_dir())
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("Could not find project root directory"))
}

fn validate_config(config: &Settings) -> Result<()> {
    for (axis, (&extent, &step)) in ["x", "y", "z"]
        .iter()
        .zip(config.domain.iter().zip(config.dl.iter()))
    {
        if !(step.is_finite() && step > 0.0) {
            return Err(anyhow!("Cell pitch along {} must be positive, got {}", axis, step));
        }
        if !(extent.is_finite() && extent > 0.0) {
            return Err(anyhow!("Domain along {} must be positive, got {}", axis, extent));
        }
        if step > extent {
            return Err(anyhow!(
                "Cell pitch along {} ({}) exceeds the domain ({})",
                axis,
                step,
                extent
            ));
        }
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(version, about = "Rasterize shapes onto a Yee grid and resolve their materials")]
pub struct CliArgs {
    /// Settings file. Defaults to config/local.toml if present, else config/default.toml.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory the geometry report is written to.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Default dielectric smoothing for shapes that do not specify it.
    #[arg(long)]
    pub averaging: Option<bool>,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Settings:
  - Domain: {:?} m
  - Cell pitch: {:?} m
  - Dielectric smoothing by default: {}
  - Materials: {}
  - Spheres: {}
  ",
            self.domain,
            self.dl,
            self.average_volume_objects,
            self.materials.len(),
            self.spheres.len(),
        )
    }
}
