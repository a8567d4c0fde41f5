//! Bounded material registry.
//!
//! Maps case-insensitive names to dense `u8` IDs. ID 0 is always air; new
//! materials take the next free ID and keep it for the life of the palette.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use voxelcore_core::{Color, MaterialId, Result, VoxelError, MATERIAL_AIR};

/// Total material slots, air included (IDs `0..MAX_MATERIALS`).
pub const MAX_MATERIALS: usize = 255;

/// Name under which the air material is registered.
pub const AIR_NAME: &str = "air";

/// Surface properties supplied at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialProps {
    /// 0 = smooth, 1 = rough.
    pub roughness: f32,
    /// 0 = dielectric, 1 = metal.
    pub metallic: f32,
    /// Emissive strength, never negative.
    pub emissive: f32,
    /// Whether the material counts as solid for collision/meshing consumers.
    #[serde(alias = "solid")]
    pub is_solid: bool,
}

impl Default for MaterialProps {
    fn default() -> Self {
        Self {
            roughness: 0.8,
            metallic: 0.0,
            emissive: 0.0,
            is_solid: true,
        }
    }
}

impl MaterialProps {
    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.roughness) {
            return Err(VoxelError::invalid_argument(format!(
                "roughness {} outside [0, 1]",
                self.roughness
            )));
        }
        if !(0.0..=1.0).contains(&self.metallic) {
            return Err(VoxelError::invalid_argument(format!(
                "metallic {} outside [0, 1]",
                self.metallic
            )));
        }
        if !self.emissive.is_finite() || self.emissive < 0.0 {
            return Err(VoxelError::invalid_argument(format!(
                "emissive {} must be finite and non-negative",
                self.emissive
            )));
        }
        Ok(())
    }
}

/// A registered material. Immutable once stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Slot in the palette; equals the material's position in [`Palette::iter`].
    pub id: MaterialId,
    /// Name as registered (trimmed, original casing).
    pub name: String,
    /// Base colour, linear RGBA.
    pub albedo: Color,
    /// 0 = smooth, 1 = rough.
    pub roughness: f32,
    /// 0 = dielectric, 1 = metal.
    pub metallic: f32,
    /// Emissive strength.
    pub emissive: f32,
    /// Whether the material counts as solid for collision/meshing consumers.
    pub is_solid: bool,
}

/// Registry of up to [`MAX_MATERIALS`] materials, indexed by ID.
#[derive(Debug, Clone)]
pub struct Palette {
    materials: Vec<Material>,
    name_to_id: HashMap<String, MaterialId>,
}

/// Case-folded map key. Callers trim before registering; lookups do not trim.
fn lookup_key(name: &str) -> String {
    name.to_lowercase()
}

impl Palette {
    /// Create a palette holding only air.
    pub fn new() -> Self {
        let mut palette = Self {
            materials: Vec::with_capacity(MAX_MATERIALS),
            name_to_id: HashMap::new(),
        };
        palette.insert(
            AIR_NAME,
            Color::TRANSPARENT,
            MaterialProps {
                roughness: 1.0,
                metallic: 0.0,
                emissive: 0.0,
                is_solid: false,
            },
        );
        palette
    }

    /// Palette with the canonical terrain set: dirt=1, grass=2, stone=3, sand=4.
    pub fn create_default() -> Self {
        let mut palette = Self::new();
        let props = MaterialProps::default();
        palette.insert("dirt", Color::rgb(0.35, 0.22, 0.12), props);
        palette.insert("grass", Color::rgb(0.15, 0.55, 0.15), props);
        palette.insert("stone", Color::rgb(0.5, 0.5, 0.5), props);
        palette.insert("sand", Color::rgb(0.85, 0.78, 0.55), props);
        palette
    }

    /// Register a material with default properties.
    pub fn register(&mut self, name: &str, albedo: Color) -> Result<MaterialId> {
        self.register_with(name, albedo, MaterialProps::default())
    }

    /// Register a material and return its ID.
    ///
    /// The name is trimmed before use. Re-registering a known name (any
    /// casing) returns the existing ID and ignores the new albedo/properties.
    /// That lookup runs before the capacity check, so a full palette still
    /// resolves names it already holds instead of failing with
    /// `CapacityExceeded`.
    pub fn register_with(
        &mut self,
        name: &str,
        albedo: Color,
        props: MaterialProps,
    ) -> Result<MaterialId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VoxelError::invalid_argument(
                "material name cannot be empty",
            ));
        }
        if let Some(&existing) = self.name_to_id.get(&lookup_key(name)) {
            return Ok(existing);
        }
        props.validate()?;
        if self.is_full() {
            return Err(VoxelError::CapacityExceeded {
                capacity: MAX_MATERIALS,
            });
        }

        let id = self.insert(name, albedo, props);
        debug!(id, name, "registered voxel material");
        Ok(id)
    }

    /// Store a validated material under the next free ID.
    fn insert(&mut self, name: &str, albedo: Color, props: MaterialProps) -> MaterialId {
        debug_assert!(!self.is_full());
        let id = self.materials.len() as MaterialId;
        self.materials.push(Material {
            id,
            name: name.to_string(),
            albedo,
            roughness: props.roughness,
            metallic: props.metallic,
            emissive: props.emissive,
            is_solid: props.is_solid,
        });
        self.name_to_id.insert(lookup_key(name), id);
        id
    }

    /// Resolve a material ID by its name, ignoring case.
    ///
    /// Unlike registration, surrounding whitespace is significant here.
    pub fn get_id(&self, name: &str) -> Result<MaterialId> {
        self.try_get_id(name)
            .ok_or_else(|| VoxelError::MaterialNotFound(name.to_string()))
    }

    /// Resolve a material ID by its name, if registered.
    pub fn try_get_id(&self, name: &str) -> Option<MaterialId> {
        self.name_to_id.get(&lookup_key(name)).copied()
    }

    /// Look up a material by ID.
    pub fn material(&self, id: MaterialId) -> Result<&Material> {
        if id as usize >= MAX_MATERIALS {
            return Err(VoxelError::MaterialIdOutOfRange {
                id,
                limit: MAX_MATERIALS,
            });
        }
        self.materials
            .get(id as usize)
            .ok_or(VoxelError::MaterialIdNotFound(id))
    }

    /// Whether `id` names a registered solid material. Air and unknown IDs are not solid.
    pub fn is_solid(&self, id: MaterialId) -> bool {
        id != MATERIAL_AIR
            && self
                .materials
                .get(id as usize)
                .is_some_and(|material| material.is_solid)
    }

    /// Registered materials in ID order, air first.
    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    /// Number of registered materials, air included.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// True when nothing beyond air has been registered.
    pub fn is_empty(&self) -> bool {
        self.materials.len() <= 1
    }

    /// True when every slot is taken.
    pub fn is_full(&self) -> bool {
        self.materials.len() >= MAX_MATERIALS
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}
