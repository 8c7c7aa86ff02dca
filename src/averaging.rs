//! Dielectric smoothing of edges and faces left open by the shapes.
//!
//! After all shapes have been deposited, every interior field component whose
//! surrounding cells did not assign it explicitly takes a material derived
//! from the cells sharing it: the four cells around an electric edge or the
//! two cells either side of a magnetic face. How those materials are combined
//! is an [`AveragingPolicy`]; [`MeanBlend`] is the arithmetic mean used by
//! default.

use log::info;

use crate::{
    error::BuildError,
    grid::{Component, GridState},
    registry::MaterialRegistry,
};


/// Combines the materials of the cells sharing a field component.
pub trait AveragingPolicy {
    /// Returns the numeric ID of the material to store for a component
    /// surrounded by the cells `num_ids`.
    fn blend(&self, registry: &mut MaterialRegistry, num_ids: &[u32]) -> Result<u32, BuildError>;
}

/// Arithmetic mean of the surrounding materials, memoized in the registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanBlend;

impl AveragingPolicy for MeanBlend {
    fn blend(&self, registry: &mut MaterialRegistry, num_ids: &[u32]) -> Result<u32, BuildError> {
        match num_ids.split_first() {
            Some((first, rest)) if rest.iter().all(|n| n == first) => Ok(*first),
            _ => registry.synthesize_blend(num_ids),
        }
    }
}

/// Counts from an averaging pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AveragingStats {
    pub resolved: usize, // components assigned by the policy
    pub blended: usize,  // of which had mixed surroundings
}

impl AveragingStats {
    fn record(&mut self, num_ids: &[u32]) {
        self.resolved += 1;
        if num_ids.iter().any(|n| *n != num_ids[0]) {
            self.blended += 1;
        }
    }
}

/// Assigns every non-rigid interior edge and face using `policy`.
pub fn build_components<P: AveragingPolicy + ?Sized>(
    grid: &mut GridState,
    registry: &mut MaterialRegistry,
    policy: &P,
) -> Result<AveragingStats, BuildError> {
    let mut stats = AveragingStats::default();
    build_electric_components(grid, registry, policy, &mut stats)?;
    build_magnetic_components(grid, registry, policy, &mut stats)?;
    info!(
        "Averaging pass assigned {} components ({} blended), {} materials in total",
        stats.resolved,
        stats.blended,
        registry.len()
    );
    Ok(stats)
}

fn build_electric_components<P: AveragingPolicy + ?Sized>(
    grid: &mut GridState,
    registry: &mut MaterialRegistry,
    policy: &P,
    stats: &mut AveragingStats,
) -> Result<(), BuildError> {
    let (nx, ny, nz) = grid.dims;
    let rigid = &grid.rigid_e;
    let solid = &grid.solid;
    let id = &mut grid.id;

    let ex = Component::Ex as usize;
    for i in 0..nx {
        for j in 1..ny {
            for k in 1..nz {
                if rigid[[0, i, j, k]]
                    || rigid[[1, i, j - 1, k]]
                    || rigid[[2, i, j - 1, k - 1]]
                    || rigid[[3, i, j, k - 1]]
                {
                    continue;
                }
                let num_ids = [
                    solid[[i, j, k]],
                    solid[[i, j - 1, k]],
                    solid[[i, j - 1, k - 1]],
                    solid[[i, j, k - 1]],
                ];
                id[[ex, i, j, k]] = policy.blend(registry, &num_ids)?;
                stats.record(&num_ids);
            }
        }
    }

    let ey = Component::Ey as usize;
    for i in 1..nx {
        for j in 0..ny {
            for k in 1..nz {
                if rigid[[4, i, j, k]]
                    || rigid[[5, i - 1, j, k]]
                    || rigid[[6, i - 1, j, k - 1]]
                    || rigid[[7, i, j, k - 1]]
                {
                    continue;
                }
                let num_ids = [
                    solid[[i, j, k]],
                    solid[[i - 1, j, k]],
                    solid[[i - 1, j, k - 1]],
                    solid[[i, j, k - 1]],
                ];
                id[[ey, i, j, k]] = policy.blend(registry, &num_ids)?;
                stats.record(&num_ids);
            }
        }
    }

    let ez = Component::Ez as usize;
    for i in 1..nx {
        for j in 1..ny {
            for k in 0..nz {
                if rigid[[8, i, j, k]]
                    || rigid[[9, i - 1, j, k]]
                    || rigid[[10, i - 1, j - 1, k]]
                    || rigid[[11, i, j - 1, k]]
                {
                    continue;
                }
                let num_ids = [
                    solid[[i, j, k]],
                    solid[[i - 1, j, k]],
                    solid[[i - 1, j - 1, k]],
                    solid[[i, j - 1, k]],
                ];
                id[[ez, i, j, k]] = policy.blend(registry, &num_ids)?;
                stats.record(&num_ids);
            }
        }
    }

    Ok(())
}

fn build_magnetic_components<P: AveragingPolicy + ?Sized>(
    grid: &mut GridState,
    registry: &mut MaterialRegistry,
    policy: &P,
    stats: &mut AveragingStats,
) -> Result<(), BuildError> {
    let (nx, ny, nz) = grid.dims;
    let rigid = &grid.rigid_h;
    let solid = &grid.solid;
    let id = &mut grid.id;

    let hx = Component::Hx as usize;
    for i in 1..nx {
        for j in 0..ny {
            for k in 0..nz {
                if rigid[[0, i, j, k]] || rigid[[1, i - 1, j, k]] {
                    continue;
                }
                let num_ids = [solid[[i, j, k]], solid[[i - 1, j, k]]];
                id[[hx, i, j, k]] = policy.blend(registry, &num_ids)?;
                stats.record(&num_ids);
            }
        }
    }

    let hy = Component::Hy as usize;
    for i in 0..nx {
        for j in 1..ny {
            for k in 0..nz {
                if rigid[[2, i, j, k]] || rigid[[3, i, j - 1, k]] {
                    continue;
                }
                let num_ids = [solid[[i, j, k]], solid[[i, j - 1, k]]];
                id[[hy, i, j, k]] = policy.blend(registry, &num_ids)?;
                stats.record(&num_ids);
            }
        }
    }

    let hz = Component::Hz as usize;
    for i in 0..nx {
        for j in 0..ny {
            for k in 1..nz {
                if rigid[[4, i, j, k]] || rigid[[5, i, j, k - 1]] {
                    continue;
                }
                let num_ids = [solid[[i, j, k]], solid[[i, j, k - 1]]];
                id[[hz, i, j, k]] = policy.blend(registry, &num_ids)?;
                stats.record(&num_ids);
            }
        }
    }

    Ok(())
}
