use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

use super::particle::{Particle, ParticleSet};
use super::prism::HexagonalPrism;
use super::types::{Axis, Species};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BoundingBox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub zmin: f64,
    pub zmax: f64,
}

impl BoundingBox {
    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.xmax - self.xmin,
            Axis::Y => self.ymax - self.ymin,
            Axis::Z => self.zmax - self.zmin,
        }
    }

    pub fn volume(&self) -> f64 {
        Axis::ALL.iter().map(|a| self.extent(*a)).product()
    }
}

/// One value per Cartesian axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PerAxis {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PerAxis {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

/// Orientation statistics of the prism normals, as computed by the extractor.
///
/// Serialises flat, one key per statistic and axis
/// (`average_alignment_x` .. `volume_weighted_standard_deviation_alignment_z`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AlignmentStats {
    pub average: PerAxis,
    pub standard_deviation: PerAxis,
    pub volume_weighted_average: PerAxis,
    pub volume_weighted_standard_deviation: PerAxis,
}

impl Serialize for AlignmentStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AlignmentStats", 12)?;
        for (key, value) in [
            ("average_alignment_x", self.average.x),
            ("average_alignment_y", self.average.y),
            ("average_alignment_z", self.average.z),
            ("standard_deviation_alignment_x", self.standard_deviation.x),
            ("standard_deviation_alignment_y", self.standard_deviation.y),
            ("standard_deviation_alignment_z", self.standard_deviation.z),
            ("volume_weighted_average_alignment_x", self.volume_weighted_average.x),
            ("volume_weighted_average_alignment_y", self.volume_weighted_average.y),
            ("volume_weighted_average_alignment_z", self.volume_weighted_average.z),
            (
                "volume_weighted_standard_deviation_alignment_x",
                self.volume_weighted_standard_deviation.x,
            ),
            (
                "volume_weighted_standard_deviation_alignment_y",
                self.volume_weighted_standard_deviation.y,
            ),
            (
                "volume_weighted_standard_deviation_alignment_z",
                self.volume_weighted_standard_deviation.z,
            ),
        ] {
            state.serialize_field(key, &value)?;
        }
        state.end()
    }
}

/// Box edge lengths the generator was asked to fill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxDimensions {
    #[serde(rename = "Lx")]
    pub lx: f64,
    #[serde(rename = "Ly")]
    pub ly: f64,
    #[serde(rename = "Lz")]
    pub lz: f64,
}

/// Aggregate statistics reported by the extractor for the whole packing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PackingStatistics {
    pub volume: f64,
    #[serde(flatten)]
    pub bounds: BoundingBox,
    pub volumetric_filling_fraction: f64,
    #[serde(flatten)]
    pub alignment: AlignmentStats,
}

/// The classified result of one extraction.
///
/// Built once from extractor output and the configured species; it is
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedPacking {
    items: Vec<HexagonalPrism>,
    #[serde(flatten)]
    statistics: PackingStatistics,
    #[serde(rename = "particleA")]
    particle_a: Particle,
    #[serde(rename = "particleB")]
    particle_b: Option<Particle>,
    #[serde(flatten)]
    box_dimensions: BoxDimensions,
    #[serde(rename = "actual_mass_fraction_B")]
    actual_mass_fraction_b: f64,
}

impl ExtractedPacking {
    pub fn new(
        items: Vec<HexagonalPrism>,
        statistics: PackingStatistics,
        particles: ParticleSet,
        box_dimensions: BoxDimensions,
    ) -> Self {
        let actual_mass_fraction_b = if particles.has_b() {
            mass_fraction(&items, Species::B)
        } else {
            0.0
        };

        Self {
            items,
            statistics,
            particle_a: particles.a,
            particle_b: particles.b,
            box_dimensions,
            actual_mass_fraction_b,
        }
    }

    #[inline]
    pub fn items(&self) -> &[HexagonalPrism] {
        &self.items
    }

    #[inline]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn count_of(&self, species: Species) -> usize {
        self.items.iter().filter(|p| p.species() == species).count()
    }

    pub fn total_mass(&self) -> f64 {
        self.items.iter().map(HexagonalPrism::mass).sum()
    }

    #[inline]
    pub fn statistics(&self) -> &PackingStatistics {
        &self.statistics
    }

    #[inline]
    pub fn volume(&self) -> f64 {
        self.statistics.volume
    }

    #[inline]
    pub fn bounds(&self) -> &BoundingBox {
        &self.statistics.bounds
    }

    #[inline]
    pub fn volumetric_filling_fraction(&self) -> f64 {
        self.statistics.volumetric_filling_fraction
    }

    #[inline]
    pub fn alignment(&self) -> &AlignmentStats {
        &self.statistics.alignment
    }

    #[inline]
    pub fn particle_a(&self) -> &Particle {
        &self.particle_a
    }

    #[inline]
    pub fn particle_b(&self) -> Option<&Particle> {
        self.particle_b.as_ref()
    }

    #[inline]
    pub fn box_dimensions(&self) -> &BoxDimensions {
        &self.box_dimensions
    }

    /// Mass of species-B items over the total mass; 0 without species B
    /// or when nothing was extracted.
    #[inline]
    pub fn actual_mass_fraction_b(&self) -> f64 {
        self.actual_mass_fraction_b
    }
}

fn mass_fraction(items: &[HexagonalPrism], species: Species) -> f64 {
    let (selected, total) = items.iter().fold((0.0, 0.0), |(sel, tot), item| {
        let m = item.mass();
        if item.species() == species {
            (sel + m, tot + m)
        } else {
            (sel, tot + m)
        }
    });

    if total > 0.0 { selected / total } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::prism::{FaceRotation, PrismGeometry, TriangulatedSurface};
    use approx::assert_relative_eq;

    const A: Particle = Particle {
        radius: 1.0,
        thickness: 0.2,
        density: 1.0,
    };
    const B: Particle = Particle {
        radius: 0.5,
        thickness: 0.1,
        density: 1.2,
    };

    fn prism(particle: &Particle, species: Species) -> HexagonalPrism {
        HexagonalPrism::new(
            PrismGeometry {
                radius: particle.radius,
                thickness: particle.thickness,
                normal: [0.0, 0.0, 1.0],
                position: [0.0; 3],
                face_rotation: FaceRotation::Angle(0.0),
                vertices: Vec::new(),
                triangulation: TriangulatedSurface::default(),
            },
            species,
            particle.density,
        )
    }

    fn dims() -> BoxDimensions {
        BoxDimensions {
            lx: 10.0,
            ly: 10.0,
            lz: 50.0,
        }
    }

    #[test]
    fn mass_fraction_of_mixed_packing() {
        let items = vec![prism(&A, Species::A), prism(&B, Species::B), prism(&B, Species::B)];
        let packing = ExtractedPacking::new(
            items,
            PackingStatistics::default(),
            ParticleSet::new(A, Some(B)),
            dims(),
        );

        let mass_a = A.density * crate::model::prism::prism_volume(A.radius, A.thickness);
        let mass_b = B.density * crate::model::prism::prism_volume(B.radius, B.thickness);
        let expected = 2.0 * mass_b / (mass_a + 2.0 * mass_b);

        assert_relative_eq!(packing.actual_mass_fraction_b(), expected, epsilon = 1e-12);
        assert_eq!(packing.count_of(Species::A), 1);
        assert_eq!(packing.count_of(Species::B), 2);
        assert_relative_eq!(packing.total_mass(), mass_a + 2.0 * mass_b, epsilon = 1e-12);
    }

    #[test]
    fn mass_fraction_is_zero_without_species_b() {
        let items = vec![prism(&A, Species::A), prism(&A, Species::A)];
        let packing =
            ExtractedPacking::new(items, PackingStatistics::default(), ParticleSet::new(A, None), dims());
        assert_eq!(packing.actual_mass_fraction_b(), 0.0);
        assert!(packing.particle_b().is_none());
    }

    #[test]
    fn mass_fraction_is_zero_for_empty_packing() {
        let packing = ExtractedPacking::new(
            Vec::new(),
            PackingStatistics::default(),
            ParticleSet::new(A, Some(B)),
            dims(),
        );
        assert_eq!(packing.actual_mass_fraction_b(), 0.0);
        assert_eq!(packing.item_count(), 0);
    }

    #[test]
    fn mass_fraction_stays_in_unit_interval() {
        for n_a in 0..5 {
            for n_b in 0..5 {
                let mut items = Vec::new();
                items.extend((0..n_a).map(|_| prism(&A, Species::A)));
                items.extend((0..n_b).map(|_| prism(&B, Species::B)));
                let packing = ExtractedPacking::new(
                    items,
                    PackingStatistics::default(),
                    ParticleSet::new(A, Some(B)),
                    dims(),
                );
                let f = packing.actual_mass_fraction_b();
                assert!((0.0..=1.0).contains(&f), "fraction {f} out of range");
            }
        }
    }

    #[test]
    fn bounding_box_extent_and_volume() {
        let bounds = BoundingBox {
            xmin: 0.0,
            xmax: 2.0,
            ymin: -1.0,
            ymax: 1.0,
            zmin: 0.5,
            zmax: 3.0,
        };
        assert_eq!(bounds.extent(Axis::X), 2.0);
        assert_eq!(bounds.extent(Axis::Y), 2.0);
        assert_eq!(bounds.extent(Axis::Z), 2.5);
        assert_relative_eq!(bounds.volume(), 10.0);
    }

    #[test]
    fn serializes_with_injected_keys() {
        let statistics = PackingStatistics {
            volumetric_filling_fraction: 0.4,
            alignment: AlignmentStats {
                average: PerAxis::new(0.1, 0.2, 0.9),
                volume_weighted_standard_deviation: PerAxis::new(0.04, 0.05, 0.06),
                ..AlignmentStats::default()
            },
            ..PackingStatistics::default()
        };
        let packing = ExtractedPacking::new(
            vec![prism(&A, Species::A)],
            statistics,
            ParticleSet::new(A, None),
            dims(),
        );
        let value = serde_json::to_value(&packing).unwrap();

        assert_eq!(value["volumetric_filling_fraction"], 0.4);
        assert_eq!(value["average_alignment_x"], 0.1);
        assert_eq!(value["average_alignment_z"], 0.9);
        assert_eq!(value["standard_deviation_alignment_y"], 0.0);
        assert_eq!(value["volume_weighted_average_alignment_x"], 0.0);
        assert_eq!(value["volume_weighted_standard_deviation_alignment_z"], 0.06);
        assert!(value.get("alignment").is_none());

        assert_eq!(value["particleA"]["radius"], 1.0);
        assert!(value["particleB"].is_null());
        assert_eq!(value["Lx"], 10.0);
        assert_eq!(value["Lz"], 50.0);
        assert_eq!(value["xmax"], 0.0);
        assert_eq!(value["actual_mass_fraction_B"], 0.0);
        assert_eq!(value["items"].as_array().unwrap().len(), 1);
    }
}
