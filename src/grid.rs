//! Material arrays of a Yee grid.
//!
//! Cell `(i, j, k)` spans `[i, i+1] x [j, j+1] x [k, k+1]` in units of the
//! pitch. Electric field components live on cell edges and magnetic ones on
//! cell faces, so besides the per-cell `solid` array the grid keeps one
//! material ID per component location in `id`, plus flags telling whether a
//! cell's edges/faces were assigned explicitly (`rigid_e`, `rigid_h`) and so
//! must not be smoothed afterwards.

use nalgebra::Vector3;
use ndarray::{s, Array3, Array4};

use crate::config::FREE_SPACE_NUM_ID;

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn new_grid_is_free_space() {
        let grid = GridState::new((4, 5, 6), Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(grid.solid.dim(), (4, 5, 6));
        assert_eq!(grid.rigid_e.dim(), (12, 4, 5, 6));
        assert_eq!(grid.rigid_h.dim(), (6, 4, 5, 6));
        assert_eq!(grid.id.dim(), (6, 5, 6, 7));
        assert!(grid.solid.iter().all(|&n| n == FREE_SPACE_NUM_ID));
        assert!(grid.id.iter().all(|&n| n == FREE_SPACE_NUM_ID));
        assert!(!grid.rigid_e.iter().any(|&r| r));
    }

    #[test]
    fn hard_voxel_writes_every_edge() {
        let mut grid = GridState::new((3, 3, 3), Vector3::new(1.0, 1.0, 1.0));
        grid.build_voxel(1, 1, 1, 9, 10, 11, 12, false);

        assert_eq!(grid.solid[[1, 1, 1]], 9);
        assert!(grid.is_rigid_cell(1, 1, 1));
        for (j, k) in [(1, 1), (2, 1), (2, 2), (1, 2)] {
            assert_eq!(grid.id[[Component::Ex as usize, 1, j, k]], 10);
        }
        for (i, k) in [(1, 1), (2, 1), (2, 2), (1, 2)] {
            assert_eq!(grid.id[[Component::Ey as usize, i, 1, k]], 11);
        }
        for (i, j) in [(1, 1), (2, 1), (2, 2), (1, 2)] {
            assert_eq!(grid.id[[Component::Ez as usize, i, j, 1]], 12);
        }
        assert_eq!(grid.id[[Component::Hx as usize, 2, 1, 1]], 10);
        assert_eq!(grid.id[[Component::Hy as usize, 1, 2, 1]], 11);
        assert_eq!(grid.id[[Component::Hz as usize, 1, 1, 2]], 12);

        // the neighbour is untouched
        assert_eq!(grid.solid[[0, 1, 1]], FREE_SPACE_NUM_ID);
        assert!(!grid.is_rigid_cell(0, 1, 1));
    }

    #[test]
    fn averaged_voxel_clears_rigid_flags() {
        let mut grid = GridState::new((3, 3, 3), Vector3::new(1.0, 1.0, 1.0));
        grid.build_voxel(1, 1, 1, 9, 9, 9, 9, false);
        grid.build_voxel(1, 1, 1, 7, 7, 7, 7, true);

        assert_eq!(grid.solid[[1, 1, 1]], 7);
        assert!(grid
            .rigid_e
            .slice(s![.., 1, 1, 1])
            .iter()
            .all(|&r| !r));
        assert!(grid
            .rigid_h
            .slice(s![.., 1, 1, 1])
            .iter()
            .all(|&r| !r));
        // edge IDs wait for the averaging pass
        assert_eq!(grid.id[[Component::Ex as usize, 1, 1, 1]], 9);
    }

    #[test]
    fn clamp_range_clips_to_grid() {
        let grid = GridState::new((10, 10, 10), Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(grid.clamp_range(0, -3, 4), 0..4);
        assert_eq!(grid.clamp_range(1, 8, 15), 8..10);
        assert!(grid.clamp_range(2, 12, 15).is_empty());
        assert!(grid.clamp_range(2, -8, -2).is_empty());
    }
}

/// Field component locations, in the order of the first axis of [`GridState::id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Ex = 0,
    Ey = 1,
    Ez = 2,
    Hx = 3,
    Hy = 4,
    Hz = 5,
}

/// Number of edges of a cell, the first axis of [`GridState::rigid_e`].
pub const CELL_EDGES: usize = 12;
/// Number of faces of a cell, the first axis of [`GridState::rigid_h`].
pub const CELL_FACES: usize = 6;

/// Material state of the whole simulation domain.
#[derive(Debug, Clone, PartialEq)]
pub struct GridState {
    pub dims: (usize, usize, usize), // cells along x, y, z
    pub dl: Vector3<f64>,            // cell pitch
    pub solid: Array3<u32>,
    pub rigid_e: Array4<bool>,
    pub rigid_h: Array4<bool>,
    pub id: Array4<u32>,
}

impl GridState {
    /// Allocates a grid of `dims` cells filled with free space.
    pub fn new(dims: (usize, usize, usize), dl: Vector3<f64>) -> Self {
        let (nx, ny, nz) = dims;
        Self {
            dims,
            dl,
            solid: Array3::from_elem((nx, ny, nz), FREE_SPACE_NUM_ID),
            rigid_e: Array4::from_elem((CELL_EDGES, nx, ny, nz), false),
            rigid_h: Array4::from_elem((CELL_FACES, nx, ny, nz), false),
            id: Array4::from_elem((6, nx + 1, ny + 1, nz + 1), FREE_SPACE_NUM_ID),
        }
    }

    pub fn nx(&self) -> usize {
        self.dims.0
    }

    pub fn ny(&self) -> usize {
        self.dims.1
    }

    pub fn nz(&self) -> usize {
        self.dims.2
    }

    /// Intersection of the index range `[lo, hi)` along `axis` with the grid.
    pub fn clamp_range(&self, axis: usize, lo: i64, hi: i64) -> std::ops::Range<usize> {
        let n = match axis {
            0 => self.nx(),
            1 => self.ny(),
            _ => self.nz(),
        } as i64;
        let lo = lo.clamp(0, n) as usize;
        let hi = hi.clamp(0, n) as usize;
        lo..hi.max(lo)
    }

    /// Whether every edge and face of the cell was explicitly assigned.
    pub fn is_rigid_cell(&self, i: usize, j: usize, k: usize) -> bool {
        self.rigid_e.slice(s![.., i, j, k]).iter().all(|&r| r)
            && self.rigid_h.slice(s![.., i, j, k]).iter().all(|&r| r)
    }

    fn set_rigid(&mut self, i: usize, j: usize, k: usize, rigid: bool) {
        self.rigid_e.slice_mut(s![.., i, j, k]).fill(rigid);
        self.rigid_h.slice_mut(s![.., i, j, k]).fill(rigid);
    }

    /// Deposits a material in cell `(i, j, k)`.
    ///
    /// A hard assignment marks all edges and faces of the cell rigid and writes
    /// the directional IDs onto them. An averaged one only sets `solid` and
    /// releases the cell's edges and faces to the averaging pass.
    #[allow(clippy::too_many_arguments)]
    pub fn build_voxel(
        &mut self,
        i: usize,
        j: usize,
        k: usize,
        num_id: u32,
        num_id_x: u32,
        num_id_y: u32,
        num_id_z: u32,
        averaging: bool,
    ) {
        self.solid[[i, j, k]] = num_id;
        if averaging {
            self.set_rigid(i, j, k, false);
            return;
        }
        self.set_rigid(i, j, k, true);

        let ex = Component::Ex as usize;
        let ey = Component::Ey as usize;
        let ez = Component::Ez as usize;
        for (a, b) in [(0, 0), (1, 0), (1, 1), (0, 1)] {
            self.id[[ex, i, j + a, k + b]] = num_id_x;
            self.id[[ey, i + a, j, k + b]] = num_id_y;
            self.id[[ez, i + a, j + b, k]] = num_id_z;
        }

        let hx = Component::Hx as usize;
        let hy = Component::Hy as usize;
        let hz = Component::Hz as usize;
        for a in 0..2 {
            self.id[[hx, i + a, j, k]] = num_id_x;
            self.id[[hy, i, j + a, k]] = num_id_y;
            self.id[[hz, i, j, k + a]] = num_id_z;
        }
    }
}
