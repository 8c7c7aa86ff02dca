//! Append-only material registry with memoized averaged materials.
//!
//! Numeric IDs are handed out as the registry size at the time a material is
//! added, so they stay dense and 0-based. Names are indexed in a hash map while
//! the backing vector keeps creation order.

use std::collections::HashMap;

use itertools::Itertools;
use log::debug;

use crate::{
    config::{ANISOTROPIC_SEPARATOR, BLEND_SEPARATOR},
    error::BuildError,
    material::Material,
};


/// Numeric IDs a shape writes into the grid, and whether it is smoothed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedMaterial {
    pub num_id: u32,   // written to `solid`
    pub num_id_x: u32, // x-directed edges
    pub num_id_y: u32, // y-directed edges
    pub num_id_z: u32, // z-directed edges
    pub averaging: bool,
}

/// Ordered collection of all materials in a model.
#[derive(Debug, Clone)]
pub struct MaterialRegistry {
    materials: Vec<Material>,
    index: HashMap<String, usize>,
}

impl Default for MaterialRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialRegistry {
    /// Creates a registry holding the built-in `pec` and `free_space` materials.
    pub fn new() -> Self {
        let mut registry = Self {
            materials: Vec::new(),
            index: HashMap::new(),
        };
        registry.push(Material::pec());
        registry.push(Material::free_space());
        registry
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn get(&self, num_id: u32) -> Option<&Material> {
        self.materials.get(num_id as usize)
    }

    pub fn find(&self, id: &str) -> Option<&Material> {
        self.index.get(id).map(|&i| &self.materials[i])
    }

    /// Appends a user material. Its `num_id` is overwritten with the next free value.
    pub fn add(&mut self, material: Material) -> Result<u32, BuildError> {
        if self.index.contains_key(&material.id) {
            return Err(BuildError::DuplicateMaterial { id: material.id });
        }
        Ok(self.push(material))
    }

    fn push(&mut self, mut material: Material) -> u32 {
        let num_id = self.materials.len() as u32;
        material.num_id = num_id;
        self.index.insert(material.id.clone(), self.materials.len());
        self.materials.push(material);
        num_id
    }

    /// Returns the material for each requested ID, in request order.
    ///
    /// Fails with every unmatched ID if any of them is unknown.
    pub fn lookup(&self, ids: &[String]) -> Result<Vec<&Material>, BuildError> {
        let notfound: Vec<String> = ids
            .iter()
            .filter(|id| !self.index.contains_key(id.as_str()))
            .cloned()
            .collect();
        if !notfound.is_empty() {
            return Err(BuildError::MaterialNotFound { ids: notfound });
        }
        Ok(ids.iter().filter_map(|id| self.find(id)).collect())
    }

    /// Resolves the numeric IDs a shape made of `ids` deposits in the grid.
    ///
    /// One ID is isotropic and may be smoothed if both the material and the
    /// caller allow it. Three IDs are the x, y, z materials of an anisotropic
    /// shape: these are never smoothed and the cell itself takes the averaged
    /// material of the three.
    pub fn resolve(
        &mut self,
        ids: &[String],
        averaging_requested: bool,
    ) -> Result<ResolvedMaterial, BuildError> {
        let num_ids: Vec<(u32, bool)> = self
            .lookup(ids)?
            .iter()
            .map(|m| (m.num_id, m.averagable))
            .collect();

        match num_ids.as_slice() {
            &[(num_id, averagable)] => Ok(ResolvedMaterial {
                num_id,
                num_id_x: num_id,
                num_id_y: num_id,
                num_id_z: num_id,
                averaging: averagable && averaging_requested,
            }),
            &[(x, _), (y, _), (z, _)] => Ok(ResolvedMaterial {
                num_id: self.synthesize_averaged(x, y, z)?,
                num_id_x: x,
                num_id_y: y,
                num_id_z: z,
                averaging: false,
            }),
            other => Err(BuildError::InvalidMaterialCount { count: other.len() }),
        }
    }

    /// Returns the averaged material of an x, y, z triple, creating it on first use.
    pub fn synthesize_averaged(&mut self, x: u32, y: u32, z: u32) -> Result<u32, BuildError> {
        let key = self.ids_of(&[x, y, z])?.iter().join(ANISOTROPIC_SEPARATOR);
        Ok(self.synthesize(key, &[x, y, z]))
    }

    /// Returns the mean of the materials sharing an edge or face, creating it
    /// on first use. The key does not depend on the order of `num_ids`.
    pub fn synthesize_blend(&mut self, num_ids: &[u32]) -> Result<u32, BuildError> {
        if num_ids.is_empty() {
            return Err(BuildError::InvalidMaterialCount { count: 0 });
        }
        let mut ids = self.ids_of(num_ids)?;
        ids.sort_unstable();
        let key = format!(
            "{sep}{}{sep}",
            ids.iter().join(BLEND_SEPARATOR),
            sep = BLEND_SEPARATOR
        );
        Ok(self.synthesize(key, num_ids))
    }

    /// Names of the materials `num_ids`, failing with every unregistered one.
    fn ids_of(&self, num_ids: &[u32]) -> Result<Vec<&str>, BuildError> {
        let notfound: Vec<String> = num_ids
            .iter()
            .filter(|&&num_id| self.get(num_id).is_none())
            .map(|num_id| num_id.to_string())
            .collect();
        if !notfound.is_empty() {
            return Err(BuildError::MaterialNotFound { ids: notfound });
        }
        Ok(num_ids
            .iter()
            .filter_map(|&num_id| self.get(num_id))
            .map(|m| m.id.as_str())
            .collect())
    }

    fn synthesize(&mut self, key: String, num_ids: &[u32]) -> u32 {
        if let Some(existing) = self.find(&key) {
            return existing.num_id;
        }
        let constituents: Vec<&Material> = num_ids
            .iter()
            .map(|&num_id| &self.materials[num_id as usize])
            .collect();
        let material = Material::averaged(self.materials.len() as u32, key, &constituents);
        debug!(
            "Synthesized dielectric-smoothed material '{}' (numID {})",
            material.id, material.num_id
        );
        self.push(material)
    }
}
