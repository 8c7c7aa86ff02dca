use std::fmt;
use std::path::PathBuf;

use fdtd_geom::{scene::Scene, settings};
use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;

/// A model built from a settings file.
#[pyclass(name = "Scene")]
struct PyScene {
    inner: Scene,
}

#[pymethods]
impl PyScene {
    /// Loads the settings file and allocates the grid.
    #[staticmethod]
    fn from_config(path: PathBuf) -> PyResult<Self> {
        let settings = settings::load_config_from(&path).map_err(to_py_err)?;
        let inner = Scene::new(settings).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Runs all shape commands and the averaging pass.
    /// Returns the number of components the averaging pass assigned.
    fn build(&mut self) -> PyResult<usize> {
        let stats = self.inner.build().map_err(to_py_err)?;
        Ok(stats.resolved)
    }

    #[getter]
    fn num_materials(&self) -> usize {
        self.inner.registry.len()
    }

    /// Material IDs ordered by numeric ID.
    #[getter]
    fn material_ids(&self) -> Vec<String> {
        self.inner.registry.iter().map(|m| m.id.clone()).collect()
    }

    /// The per-cell material numeric IDs as nested lists.
    fn solid(&self) -> Vec<Vec<Vec<u32>>> {
        self.inner
            .grid
            .solid
            .outer_iter()
            .map(|plane| plane.outer_iter().map(|row| row.to_vec()).collect())
            .collect()
    }

    /// Writes the geometry report and returns its path.
    fn writeup(&self, dir: PathBuf) -> PyResult<PathBuf> {
        self.inner.writeup(&dir).map_err(to_py_err)
    }
}

fn to_py_err(err: impl fmt::Display) -> PyErr {
    PyRuntimeError::new_err(format!("{:#}", err))
}

/// Yee-grid shape rasterization.
#[pymodule]
fn _fdtd_geom_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyScene>()?;
    Ok(())
}
