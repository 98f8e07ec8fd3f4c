use serde::{Deserialize, Serialize};

use super::types::Species;

/// Triangulated surface mesh of one extracted prism.
///
/// Connectivity rows index into `points` exactly as the extractor wrote
/// them (one-based).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TriangulatedSurface {
    pub points: Vec<[f64; 3]>,
    pub connectivity: Vec<[usize; 3]>,
}

impl TriangulatedSurface {
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.connectivity.len()
    }
}

/// Rotation of the hexagonal face about the prism normal.
///
/// Usually a single angle; kept as written when the extractor reports
/// one value per component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FaceRotation {
    Angle(f64),
    Components(Vec<f64>),
}

/// Geometry of a prism as reported by the extractor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrismGeometry {
    pub radius: f64,
    pub thickness: f64,
    pub normal: [f64; 3],
    pub position: [f64; 3],
    pub face_rotation: FaceRotation,
    pub vertices: Vec<[f64; 3]>,
    pub triangulation: TriangulatedSurface,
}

/// A classified hexagonal prism with derived volume and mass.
///
/// Volume and mass are computed once in [`HexagonalPrism::new`]; the
/// fields are private so they cannot drift from the geometry afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HexagonalPrism {
    #[serde(flatten)]
    geometry: PrismGeometry,
    species: Species,
    density: f64,
    volume: f64,
    mass: f64,
}

impl HexagonalPrism {
    pub fn new(geometry: PrismGeometry, species: Species, density: f64) -> Self {
        let volume = prism_volume(geometry.radius, geometry.thickness);
        Self {
            geometry,
            species,
            density,
            volume,
            mass: volume * density,
        }
    }

    #[inline]
    pub fn geometry(&self) -> &PrismGeometry {
        &self.geometry
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.geometry.radius
    }

    #[inline]
    pub fn thickness(&self) -> f64 {
        self.geometry.thickness
    }

    #[inline]
    pub fn species(&self) -> Species {
        self.species
    }

    #[inline]
    pub fn density(&self) -> f64 {
        self.density
    }

    #[inline]
    pub fn volume(&self) -> f64 {
        self.volume
    }

    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass
    }
}

/// Volume of a regular hexagonal prism with circumradius `radius`.
pub fn prism_volume(radius: f64, thickness: f64) -> f64 {
    1.5 * 3f64.sqrt() * radius * radius * thickness
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    fn geometry(radius: f64, thickness: f64) -> PrismGeometry {
        PrismGeometry {
            radius,
            thickness,
            normal: [0.0, 0.0, 1.0],
            position: [1.0, 2.0, 3.0],
            face_rotation: FaceRotation::Angle(0.0),
            vertices: Vec::new(),
            triangulation: TriangulatedSurface::default(),
        }
    }

    #[test]
    fn unit_prism_volume() {
        assert_relative_eq!(prism_volume(1.0, 1.0), 2.598_076_211_353_316, epsilon = 1e-12);
    }

    #[test]
    fn volume_formula_holds_for_random_positive_dimensions() {
        let mut rng = ChaChaRng::seed_from_u64(42);

        for _ in 0..500 {
            let r: f64 = rng.gen_range(1e-4..1e3);
            let t: f64 = rng.gen_range(1e-4..1e3);
            let expected = 1.5 * 3f64.sqrt() * r.powi(2) * t;
            assert_relative_eq!(prism_volume(r, t), expected, max_relative = 1e-12);
            assert!(prism_volume(r, t) > 0.0);
        }
    }

    #[test]
    fn mass_is_volume_times_density() {
        let prism = HexagonalPrism::new(geometry(1.0, 0.2), Species::A, 1.5);
        assert_relative_eq!(prism.volume(), prism_volume(1.0, 0.2));
        assert_relative_eq!(prism.mass(), prism.volume() * 1.5);
        assert_eq!(prism.species(), Species::A);
        assert_eq!(prism.radius(), 1.0);
        assert_eq!(prism.thickness(), 0.2);
    }

    #[test]
    fn serializes_flat_with_derived_fields() {
        let prism = HexagonalPrism::new(geometry(0.5, 0.1), Species::B, 1.2);
        let value = serde_json::to_value(&prism).unwrap();

        assert_eq!(value["radius"], 0.5);
        assert_eq!(value["species"], "B");
        assert!(value["volume"].as_f64().unwrap() > 0.0);
        assert!(value["mass"].as_f64().unwrap() > 0.0);
        assert!(value.get("geometry").is_none());
    }
}
