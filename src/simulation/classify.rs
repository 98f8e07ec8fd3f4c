//! Species classification of extracted prisms.
//!
//! The generator output does not say which species an item belongs to,
//! so every item is matched by geometry against the configured species,
//! species A first. The first species whose radius *and* thickness are
//! both within tolerance wins and lends the item its density. An item
//! matching neither species fails the whole extraction.

use crate::model::particle::{Particle, ParticleSet};
use crate::model::prism::HexagonalPrism;
use crate::model::types::Species;

use super::error::Error;
use super::raw::RawPrism;

pub const RELATIVE_TOLERANCE: f64 = 1e-3;
pub const ABSOLUTE_TOLERANCE: f64 = 1e-4;

/// `|a - b| <= max(rel * max(|a|, |b|), abs)`, with exact equality always
/// close and non-finite differences never close.
pub fn is_close(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    let diff = (a - b).abs();
    if !diff.is_finite() {
        return false;
    }
    diff <= (RELATIVE_TOLERANCE * a.abs().max(b.abs())).max(ABSOLUTE_TOLERANCE)
}

/// Species whose geometry matches `(radius, thickness)`, A checked first.
pub fn classify(radius: f64, thickness: f64, particles: &ParticleSet) -> Option<Species> {
    matching(radius, thickness, particles).map(|(species, _)| species)
}

fn matching(
    radius: f64,
    thickness: f64,
    particles: &ParticleSet,
) -> Option<(Species, &Particle)> {
    particles
        .iter()
        .find(|(_, p)| is_close(radius, p.radius) && is_close(thickness, p.thickness))
}

/// Classifies every raw item and builds the corresponding prisms.
///
/// A density already present on a raw item is kept; otherwise the
/// matched species' density is used.
pub fn classify_items(
    items: Vec<RawPrism>,
    particles: &ParticleSet,
) -> Result<Vec<HexagonalPrism>, Error> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let (species, particle) = matching(raw.radius, raw.thickness, particles).ok_or(
                Error::Classification {
                    index,
                    radius: raw.radius,
                    thickness: raw.thickness,
                    a: particles.a,
                    b: particles.b,
                },
            )?;
            let density = raw.density.unwrap_or(particle.density);
            Ok(HexagonalPrism::new(raw.into_geometry(), species, density))
        })
        .collect()
}
