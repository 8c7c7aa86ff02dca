//! Mapping between continuous coordinates and grid cell indices.

use nalgebra::{Point3, Vector3};

use crate::config::DISCRETISE_TOLERANCE;


/// Converts points to the indices of the cells containing them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discretiser {
    pub dl: Vector3<f64>, // cell pitch (dx, dy, dz)
}

impl Discretiser {
    pub fn new(dl: Vector3<f64>) -> Self {
        Self { dl }
    }

    /// Indices of the cell containing `point`, by floor division by the pitch.
    pub fn discretise(&self, point: &Point3<f64>) -> (i64, i64, i64) {
        let scaled = point.coords.component_div(&self.dl);
        (
            floor_snapped(scaled.x),
            floor_snapped(scaled.y),
            floor_snapped(scaled.z),
        )
    }

    /// Cell-snapped copy of `point`. Only meant for reporting.
    pub fn round_to_grid_for_display(&self, point: &Point3<f64>) -> Point3<f64> {
        let (i, j, k) = self.discretise(point);
        Point3::new(
            i as f64 * self.dl.x,
            j as f64 * self.dl.y,
            k as f64 * self.dl.z,
        )
    }
}

fn floor_snapped(value: f64) -> i64 {
    let nearest = value.round();
    if (value - nearest).abs() <= DISCRETISE_TOLERANCE * nearest.abs().max(1.0) {
        nearest as i64
    } else {
        value.floor() as i64
    }
}
