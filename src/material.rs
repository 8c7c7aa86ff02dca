//! Electromagnetic material descriptions.
//!
//! Materials are referenced from the grid arrays by their dense numeric ID,
//! never by name. A property is either a single value shared by all three
//! axes or a per-axis vector, which is what averaged (smoothed) and
//! anisotropic materials carry.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::config::{FREE_SPACE_ID, PEC_ID};


/// A relative permittivity/permeability or a conductivity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Property {
    Scalar(f64),
    Axial(Vector3<f64>),
}

impl Property {
    /// The value along each of x, y and z.
    pub fn axial(&self) -> Vector3<f64> {
        match self {
            Property::Scalar(value) => Vector3::repeat(*value),
            Property::Axial(values) => *values,
        }
    }

    /// Arithmetic mean, computed axis-wise.
    ///
    /// If every operand is a scalar the result stays scalar, otherwise scalars
    /// are broadcast over the three axes. `values` must not be empty.
    pub fn mean(values: &[Property]) -> Property {
        let sum: Vector3<f64> = values.iter().map(Property::axial).sum();
        let mean = sum / values.len() as f64;
        if values.iter().all(|p| matches!(p, Property::Scalar(_))) {
            Property::Scalar(mean.x)
        } else {
            Property::Axial(mean)
        }
    }
}

impl Default for Property {
    fn default() -> Self {
        Property::Scalar(0.0)
    }
}

/// Where a material came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaterialKind {
    /// Present in every registry from the start.
    Builtin,
    /// Declared by the user.
    Normal,
    /// Synthesized by averaging other materials.
    DielectricSmoothed,
}

/// A material held by the registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Material {
    pub id: String,
    pub num_id: u32,
    pub er: Property, // relative permittivity
    pub se: Property, // electric conductivity (S/m)
    pub mr: Property, // relative permeability
    pub sm: Property, // magnetic loss (Ohm/m)
    pub kind: MaterialKind,
    pub averagable: bool,
}

impl Material {
    /// A lossless, non-magnetic vacuum-like material with the given IDs.
    pub fn new(num_id: u32, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            num_id,
            er: Property::Scalar(1.0),
            se: Property::Scalar(0.0),
            mr: Property::Scalar(1.0),
            sm: Property::Scalar(0.0),
            kind: MaterialKind::Normal,
            averagable: true,
        }
    }

    /// Perfect electric conductor. Never averaged.
    pub fn pec() -> Self {
        Self {
            se: Property::Scalar(f64::INFINITY),
            kind: MaterialKind::Builtin,
            averagable: false,
            ..Self::new(0, PEC_ID)
        }
    }

    /// Free space, the material a fresh grid is filled with.
    pub fn free_space() -> Self {
        Self {
            kind: MaterialKind::Builtin,
            ..Self::new(1, FREE_SPACE_ID)
        }
    }

    /// Builds the averaged material of `constituents` under the given ID.
    pub(crate) fn averaged(num_id: u32, id: String, constituents: &[&Material]) -> Self {
        Self {
            id,
            num_id,
            er: mean_of(constituents, |m| m.er),
            se: mean_of(constituents, |m| m.se),
            mr: mean_of(constituents, |m| m.mr),
            sm: mean_of(constituents, |m| m.sm),
            kind: MaterialKind::DielectricSmoothed,
            averagable: false,
        }
    }
}

fn mean_of(constituents: &[&Material], property: impl Fn(&Material) -> Property) -> Property {
    let values: Vec<Property> = constituents.iter().map(|&m| property(m)).collect();
    Property::mean(&values)
}

/// A user material definition as it appears in the settings file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaterialDef {
    pub id: String,
    #[serde(default = "unit_property")]
    pub er: Property,
    #[serde(default)]
    pub se: Property,
    #[serde(default = "unit_property")]
    pub mr: Property,
    #[serde(default)]
    pub sm: Property,
    #[serde(default = "default_averagable")]
    pub averagable: bool,
}

fn unit_property() -> Property {
    Property::Scalar(1.0)
}

fn default_averagable() -> bool {
    true
}

impl MaterialDef {
    /// Turns the definition into a registry entry with the given numeric ID.
    pub fn into_material(self, num_id: u32) -> Material {
        Material {
            id: self.id,
            num_id,
            er: self.er,
            se: self.se,
            mr: self.mr,
            sm: self.sm,
            kind: MaterialKind::Normal,
            averagable: self.averagable,
        }
    }
}
