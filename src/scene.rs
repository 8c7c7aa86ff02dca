//! Model building across many geometry commands.
//!
//! A [`Scene`] owns the grid, the material registry and the discretiser for one
//! model. Shape commands run strictly in declaration order, since a later
//! shape overwrites whatever an earlier one deposited in the cells they share.
//! Once all shapes are in, the averaging pass resolves the edges and faces the
//! smoothed shapes left open.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use nalgebra::{Point3, Vector3};

use crate::{
    averaging::{self, AveragingPolicy, AveragingStats, MeanBlend},
    discretiser::Discretiser,
    error::BuildError,
    grid::GridState,
    output,
    registry::MaterialRegistry,
    settings::Settings,
    sphere::{SphereParams, SphereRequest, SphereSummary},
};


/// A model under construction.
#[derive(Debug, Clone)]
pub struct Scene {
    pub settings: Settings,
    pub grid: GridState,
    pub registry: MaterialRegistry,
    pub discretiser: Discretiser,
    pub summaries: Vec<SphereSummary>, // created shapes, in order
    built: bool,
}

impl Scene {
    /// Allocates the grid and registers the configured materials.
    pub fn new(settings: Settings) -> Result<Self> {
        let dl = Vector3::from(settings.dl);
        let discretiser = Discretiser::new(dl);
        let (nx, ny, nz) = discretiser.discretise(&Point3::from(settings.domain));
        if nx < 1 || ny < 1 || nz < 1 {
            return Err(anyhow!(
                "Domain {:?} holds no cells at pitch {:?}",
                settings.domain,
                settings.dl
            ));
        }
        let grid = GridState::new((nx as usize, ny as usize, nz as usize), dl);
        info!(
            "Grid of {} x {} x {} cells ({} m pitch)",
            nx, ny, nz, settings.dl[0]
        );

        let mut registry = MaterialRegistry::new();
        for def in settings.materials.iter().cloned() {
            let id = def.id.clone();
            let num_id = registry
                .add(def.into_material(0))
                .with_context(|| format!("#material '{}'", id))?;
            info!("Material '{}' registered with numID {}", id, num_id);
        }

        Ok(Self {
            settings,
            grid,
            registry,
            discretiser,
            summaries: Vec::new(),
            built: false,
        })
    }

    /// Validates and deposits one sphere.
    ///
    /// Nothing is written if any part of the request is invalid.
    pub fn add_sphere(&mut self, params: SphereParams) -> Result<SphereSummary, BuildError> {
        let request = SphereRequest::try_from(params)?;
        let summary = request.create(
            &mut self.grid,
            &mut self.registry,
            &self.discretiser,
            self.settings.average_volume_objects,
        )?;
        self.summaries.push(summary.clone());
        Ok(summary)
    }

    /// Runs every configured shape, then the default averaging pass.
    pub fn build(&mut self) -> Result<AveragingStats> {
        self.build_with(&MeanBlend)
    }

    /// Runs every configured shape, then the averaging pass with `policy`.
    ///
    /// A scene is built once; a second call fails without touching the grid.
    pub fn build_with<P: AveragingPolicy + ?Sized>(&mut self, policy: &P) -> Result<AveragingStats> {
        if self.built {
            return Err(anyhow!("Scene has already been built"));
        }
        let start = Instant::now();
        let spheres = self.settings.spheres.clone();

        let pb = ProgressBar::new(spheres.len() as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] {bar:40.green/blue} {pos:>5}/{len:5} {msg}",
            )?
            .progress_chars("█▇▆▅▄▃▂▁"),
        );
        pb.set_message("sphere".to_string());

        for (n, params) in spheres.into_iter().enumerate() {
            self.add_sphere(params)
                .with_context(|| format!("#sphere {}", n + 1))?;
            pb.inc(1);
        }
        pb.finish_and_clear();

        let stats = averaging::build_components(&mut self.grid, &mut self.registry, policy)
            .context("averaging pass")?;
        self.built = true;

        info!(
            "Built {} shape(s) in {:.2?}",
            self.summaries.len(),
            start.elapsed()
        );
        Ok(stats)
    }

    /// Writes the geometry report into `dir` and returns its path.
    pub fn writeup(&self, dir: &Path) -> Result<PathBuf> {
        output::writeup(self, dir)
    }
}
