//! Error taxonomy for geometry commands.
//!
//! Every variant is a deterministic validation failure raised before the grid
//! is touched. Callers that know which command they are running attach that
//! context with [`anyhow::Context`]; the variants themselves carry the
//! offending values.

use thiserror::Error;

/// Failures while validating or resolving a geometry command.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// A required field (center, radius or a material specification) is absent.
    #[error("missing parameter '{parameter}'")]
    MissingParameter { parameter: &'static str },

    /// One or more requested material IDs are not in the registry.
    #[error("material(s) {ids:?} do not exist")]
    MaterialNotFound { ids: Vec<String> },

    /// Neither one (isotropic) nor three (anisotropic) materials were given.
    #[error("expected 1 or 3 materials, got {count}")]
    InvalidMaterialCount { count: usize },

    /// Degenerate shape parameters.
    #[error("invalid geometry: {reason}")]
    Geometry { reason: String },

    /// A material with this ID has already been registered.
    #[error("material '{id}' is already defined")]
    DuplicateMaterial { id: String },
}

impl BuildError {
    pub(crate) fn geometry(reason: impl Into<String>) -> Self {
        BuildError::Geometry {
            reason: reason.into(),
        }
    }
}
