//! Rasterization of volumetric shapes onto a Yee grid.
//!
//! Shapes are resolved against a [`registry::MaterialRegistry`], placed on the
//! grid by the [`discretiser::Discretiser`] and written into the arrays of a
//! [`grid::GridState`]. A [`scene::Scene`] drives this for a whole model.

pub mod averaging;
pub mod config;
pub mod discretiser;
pub mod error;
pub mod grid;
pub mod material;
pub mod output;
pub mod registry;
pub mod scene;
pub mod settings;
pub mod sphere;
