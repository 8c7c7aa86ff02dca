use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use itertools::Itertools;
use serde::Serialize;

use crate::{config::REPORT_FILE, material::Material, scene::Scene, sphere::SphereSummary};

#[cfg(test)]
mod tests {

    use super::*;
    use crate::settings::load_default_config;

    #[test]
    fn cell_counts_cover_the_grid() {
        let mut settings = load_default_config().unwrap();
        settings.spheres.truncate(1);
        let mut scene = Scene::new(settings).unwrap();
        scene.build().unwrap();

        let counts = cell_counts(&scene);
        let total: usize = counts.values().sum();
        assert_eq!(total, scene.grid.solid.len());
        assert_eq!(counts["sand"], scene.summaries[0].cells);
    }

    #[test]
    fn writeup_creates_report() {
        let mut settings = load_default_config().unwrap();
        settings.spheres.truncate(1);
        let mut scene = Scene::new(settings).unwrap();
        scene.build().unwrap();

        let dir = std::env::temp_dir().join(format!("fdtd-geom-report-{}", std::process::id()));
        let path = writeup(&scene, &dir).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["spheres"][0]["smoothing"], "on");
        assert_eq!(json["materials"][0]["id"], "pec");
        assert_eq!(json["dims"][0], 60);
        fs::remove_dir_all(&dir).unwrap();
    }
}

#[derive(Serialize)]
struct Report<'a> {
    created: String,
    dims: (usize, usize, usize),
    dl: [f64; 3],
    materials: Vec<&'a Material>,
    spheres: &'a [SphereSummary],
    cell_counts: BTreeMap<String, usize>,
}

/// Number of cells of each material in `solid`, keyed by material ID.
fn cell_counts(scene: &Scene) -> BTreeMap<String, usize> {
    scene
        .grid
        .solid
        .iter()
        .counts()
        .into_iter()
        .map(|(num_id, count)| {
            let id = scene
                .registry
                .get(*num_id)
                .map(|m| m.id.clone())
                .unwrap_or_else(|| format!("#{}", num_id));
            (id, count)
        })
        .collect()
}

/// Write the materials, shapes and cell counts of a scene to a JSON report.
pub fn writeup(scene: &Scene, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    let path = dir.join(REPORT_FILE);

    let report = Report {
        created: chrono::Local::now().to_rfc3339(),
        dims: scene.grid.dims,
        dl: scene.settings.dl,
        materials: scene.registry.iter().collect(),
        spheres: &scene.summaries,
        cell_counts: cell_counts(scene),
    };

    let file = File::create(&path).with_context(|| format!("Failed to create {:?}", path))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &report)?;

    Ok(path)
}
