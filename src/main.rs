use std::path::Path;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use fdtd_geom::scene::Scene;
use fdtd_geom::settings::{self, CliArgs};
use log::info;

fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let settings = settings::load_config(&args)?;
    info!("{}", settings);

    let mut scene = Scene::new(settings)?;
    let stats = scene.build()?;
    info!(
        "{} materials after averaging {} components",
        scene.registry.len(),
        stats.resolved
    );

    let report = scene.writeup(Path::new(&scene.settings.output_dir))?;
    info!("Report written to {:?}", report);

    Ok(())
}
