use serde::{Deserialize, Serialize};

use super::types::Species;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub radius: f64,
    pub thickness: f64,
    pub density: f64,
}

impl Particle {
    pub fn new(radius: f64, thickness: f64, density: f64) -> Self {
        Self {
            radius,
            thickness,
            density,
        }
    }

    /// Returns `true` when every field is finite and strictly positive.
    #[inline]
    pub fn is_physical(&self) -> bool {
        [self.radius, self.thickness, self.density]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }
}

/// The one or two species configured for a simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSet {
    pub a: Particle,
    pub b: Option<Particle>,
}

impl ParticleSet {
    pub fn new(a: Particle, b: Option<Particle>) -> Self {
        Self { a, b }
    }

    pub fn get(&self, species: Species) -> Option<&Particle> {
        match species {
            Species::A => Some(&self.a),
            Species::B => self.b.as_ref(),
        }
    }

    #[inline]
    pub fn has_b(&self) -> bool {
        self.b.is_some()
    }

    /// Configured species in classification order: A first, then B.
    pub fn iter(&self) -> impl Iterator<Item = (Species, &Particle)> {
        std::iter::once((Species::A, &self.a)).chain(self.b.iter().map(|b| (Species::B, b)))
    }
}
