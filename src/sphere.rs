//! The `#sphere` geometry command.
//!
//! A request is validated once into a [`SphereRequest`], its materials are
//! resolved against the registry, its centre is discretised and finally every
//! cell whose corner lies within the radius is deposited into the grid. All
//! failures happen before the first write.

use std::fmt;

use log::{debug, info, warn};
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    discretiser::Discretiser,
    error::BuildError,
    grid::GridState,
    registry::{MaterialRegistry, ResolvedMaterial},
};


/// A sphere command as written in a settings file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SphereParams {
    pub p1: Option<[f64; 3]>,               // centre
    pub r: Option<f64>,                     // radius
    pub material_id: Option<String>,        // isotropic material
    pub material_ids: Option<Vec<String>>, // x, y, z materials
    pub averaging: Option<bool>,
}

/// The materials a shape is made of.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialAssignment {
    Isotropic(String),
    Anisotropic([String; 3]),
}

impl MaterialAssignment {
    pub fn ids(&self) -> Vec<String> {
        match self {
            MaterialAssignment::Isotropic(id) => vec![id.clone()],
            MaterialAssignment::Anisotropic(ids) => ids.to_vec(),
        }
    }
}

/// A validated sphere command.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereRequest {
    pub center: Point3<f64>,
    pub radius: f64,
    pub materials: MaterialAssignment,
    pub averaging: Option<bool>, // falls back to the grid default when absent
}

impl TryFrom<SphereParams> for SphereRequest {
    type Error = BuildError;

    fn try_from(params: SphereParams) -> Result<Self, Self::Error> {
        let p1 = params
            .p1
            .ok_or(BuildError::MissingParameter { parameter: "p1" })?;
        let radius = params
            .r
            .ok_or(BuildError::MissingParameter { parameter: "r" })?;

        let materials = match (params.material_id, params.material_ids) {
            (Some(id), other) => {
                if other.is_some() {
                    warn!("Both material_id and material_ids given, using material_id '{}'", id);
                }
                MaterialAssignment::Isotropic(id)
            }
            (None, Some(ids)) => match <[String; 3]>::try_from(ids) {
                Ok(ids) => MaterialAssignment::Anisotropic(ids),
                Err(ids) if ids.len() == 1 => MaterialAssignment::Isotropic(ids[0].clone()),
                Err(ids) => return Err(BuildError::InvalidMaterialCount { count: ids.len() }),
            },
            (None, None) => {
                return Err(BuildError::MissingParameter {
                    parameter: "material_id",
                })
            }
        };

        if p1.iter().any(|c| !c.is_finite()) {
            return Err(BuildError::geometry(format!(
                "centre {:?} is not finite",
                p1
            )));
        }
        check_radius(radius)?;

        Ok(Self {
            center: Point3::from(p1),
            radius,
            materials,
            averaging: params.averaging,
        })
    }
}

impl SphereRequest {
    /// Resolves, discretises and rasterizes the sphere.
    ///
    /// `default_averaging` applies when the request does not say whether it
    /// wants dielectric smoothing.
    pub fn create(
        &self,
        grid: &mut GridState,
        registry: &mut MaterialRegistry,
        discretiser: &Discretiser,
        default_averaging: bool,
    ) -> Result<SphereSummary, BuildError> {
        let averaging_requested = self.averaging.unwrap_or(default_averaging);
        let material_ids = self.materials.ids();
        let resolved = registry.resolve(&material_ids, averaging_requested)?;

        let center_display = discretiser.round_to_grid_for_display(&self.center);
        let center = discretiser.discretise(&self.center);

        let cells = rasterize_sphere(center, self.radius, &discretiser.dl, &resolved, grid)?;

        let summary = SphereSummary {
            center_display,
            radius: self.radius,
            material_ids,
            smoothing: resolved.averaging.into(),
            cells,
        };
        info!("{}", summary);
        Ok(summary)
    }
}

fn check_radius(radius: f64) -> Result<(), BuildError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(BuildError::geometry(format!(
            "radius must be positive, got {}",
            radius
        )))
    }
}

/// Cells of `grid` whose lower corner lies within `radius` of the centre cell's.
pub fn sphere_cells(
    center: (i64, i64, i64),
    radius: f64,
    dl: &Vector3<f64>,
    grid: &GridState,
) -> Vec<(usize, usize, usize)> {
    let (xc, yc, zc) = center;
    // clamped in f64 so huge radii or centres cannot overflow the cast
    let bounds = |axis: usize, c: i64, d: f64, n: usize| {
        let reach = radius / d;
        let limit = n as f64 + 1.0;
        let lo = ((c as f64 - reach).round() - 1.0).clamp(-1.0, limit) as i64;
        let hi = ((c as f64 + reach).round() + 1.0).clamp(-1.0, limit) as i64;
        grid.clamp_range(axis, lo, hi)
    };
    let xs = bounds(0, xc, dl.x, grid.nx());
    let ys = bounds(1, yc, dl.y, grid.ny());
    let zs = bounds(2, zc, dl.z, grid.nz());
    let r2 = radius * radius;

    xs.into_par_iter()
        .flat_map_iter(|i| {
            let di = (i as f64 - xc as f64) * dl.x;
            let zs = zs.clone();
            ys.clone().flat_map(move |j| {
                let dj = (j as f64 - yc as f64) * dl.y;
                zs.clone().filter_map(move |k| {
                    let dk = (k as f64 - zc as f64) * dl.z;
                    (di * di + dj * dj + dk * dk <= r2).then_some((i, j, k))
                })
            })
        })
        .collect()
}

/// Deposits a sphere centred on cell `center` into the grid.
///
/// Returns the number of cells written. A sphere entirely outside the grid
/// writes nothing.
pub fn rasterize_sphere(
    center: (i64, i64, i64),
    radius: f64,
    dl: &Vector3<f64>,
    resolved: &ResolvedMaterial,
    grid: &mut GridState,
) -> Result<usize, BuildError> {
    check_radius(radius)?;

    let cells = sphere_cells(center, radius, dl, grid);
    debug!(
        "Rasterizing sphere at cell {:?}, radius {}: {} cells",
        center,
        radius,
        cells.len()
    );
    for &(i, j, k) in &cells {
        grid.build_voxel(
            i,
            j,
            k,
            resolved.num_id,
            resolved.num_id_x,
            resolved.num_id_y,
            resolved.num_id_z,
            resolved.averaging,
        );
    }
    Ok(cells.len())
}

/// Whether dielectric smoothing was applied to a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Smoothing {
    On,
    Off,
}

impl From<bool> for Smoothing {
    fn from(averaging: bool) -> Self {
        if averaging {
            Smoothing::On
        } else {
            Smoothing::Off
        }
    }
}

impl fmt::Display for Smoothing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Smoothing::On => write!(f, "on"),
            Smoothing::Off => write!(f, "off"),
        }
    }
}

/// Human-readable record of a created sphere.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SphereSummary {
    pub center_display: Point3<f64>,
    pub radius: f64,
    pub material_ids: Vec<String>,
    pub smoothing: Smoothing,
    pub cells: usize,
}

impl fmt::Display for SphereSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sphere with centre {}m, {}m, {}m, radius {}m, of material(s) {} created, dielectric smoothing is {}.",
            self.center_display.x,
            self.center_display.y,
            self.center_display.z,
            self.radius,
            self.material_ids.join(", "),
            self.smoothing
        )
    }
}
