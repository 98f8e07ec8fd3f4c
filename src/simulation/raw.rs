//! Raw schema of the extractor's JSON output.
//!
//! These records mirror the external document key for key. They are
//! deserialised first and only then turned into model types, so a
//! missing or mistyped key is reported as malformed output before any
//! classification runs.

use serde::{Deserialize, Deserializer};

use crate::model::packing::{AlignmentStats, BoundingBox, PackingStatistics, PerAxis};
use crate::model::prism::{FaceRotation, PrismGeometry, TriangulatedSurface};

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawTriangulation {
    #[serde(rename = "Points", default)]
    pub points: Vec<[f64; 3]>,
    #[serde(rename = "ConnectivityList", default)]
    pub connectivity_list: Vec<[usize; 3]>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPrism {
    pub radius: f64,
    pub thickness: f64,
    pub normal: [f64; 3],
    pub position: [f64; 3],
    #[serde(rename = "faceRotation")]
    pub face_rotation: FaceRotation,
    pub vertices: Vec<[f64; 3]>,
    #[serde(default)]
    pub triangulation: RawTriangulation,
    /// Only present if the extractor was told densities; normally absent.
    #[serde(default)]
    pub density: Option<f64>,
}

impl RawPrism {
    pub fn into_geometry(self) -> PrismGeometry {
        PrismGeometry {
            radius: self.radius,
            thickness: self.thickness,
            normal: self.normal,
            position: self.position,
            face_rotation: self.face_rotation,
            vertices: self.vertices,
            triangulation: TriangulatedSurface {
                points: self.triangulation.points,
                connectivity: self.triangulation.connectivity_list,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExtraction {
    pub items: Vec<RawPrism>,
    #[serde(deserialize_with = "nan_if_null")]
    pub volume: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub xmin: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub xmax: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub ymin: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub ymax: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub zmin: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub zmax: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub volumetric_filling_fraction: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub average_alignment_x: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub average_alignment_y: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub average_alignment_z: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub standard_deviation_alignment_x: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub standard_deviation_alignment_y: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub standard_deviation_alignment_z: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub volume_weighted_average_alignment_x: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub volume_weighted_average_alignment_y: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub volume_weighted_average_alignment_z: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub volume_weighted_standard_deviation_alignment_x: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub volume_weighted_standard_deviation_alignment_y: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub volume_weighted_standard_deviation_alignment_z: f64,
}

/// The extractor writes `NaN` statistics (e.g. over an empty selection)
/// as `null`.
fn nan_if_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl RawExtraction {
    pub fn statistics(&self) -> PackingStatistics {
        PackingStatistics {
            volume: self.volume,
            bounds: BoundingBox {
                xmin: self.xmin,
                xmax: self.xmax,
                ymin: self.ymin,
                ymax: self.ymax,
                zmin: self.zmin,
                zmax: self.zmax,
            },
            volumetric_filling_fraction: self.volumetric_filling_fraction,
            alignment: AlignmentStats {
                average: PerAxis::new(
                    self.average_alignment_x,
                    self.average_alignment_y,
                    self.average_alignment_z,
                ),
                standard_deviation: PerAxis::new(
                    self.standard_deviation_alignment_x,
                    self.standard_deviation_alignment_y,
                    self.standard_deviation_alignment_z,
                ),
                volume_weighted_average: PerAxis::new(
                    self.volume_weighted_average_alignment_x,
                    self.volume_weighted_average_alignment_y,
                    self.volume_weighted_average_alignment_z,
                ),
                volume_weighted_standard_deviation: PerAxis::new(
                    self.volume_weighted_standard_deviation_alignment_x,
                    self.volume_weighted_standard_deviation_alignment_y,
                    self.volume_weighted_standard_deviation_alignment_z,
                ),
            },
        }
    }

    /// Splits off the items, leaving the aggregate statistics.
    pub fn into_parts(self) -> (Vec<RawPrism>, PackingStatistics) {
        let stats = self.statistics();
        (self.items, stats)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::types::Axis;
    use serde_json::json;

    pub(crate) fn document(items: serde_json::Value) -> serde_json::Value {
        json!({
            "items": items,
            "volume": 12.5,
            "xmin": 0.0, "xmax": 10.0,
            "ymin": 0.0, "ymax": 10.0,
            "zmin": 0.0, "zmax": 4.0,
            "volumetricFillingFraction": 0.31,
            "averageAlignmentX": 0.1,
            "averageAlignmentY": 0.2,
            "averageAlignmentZ": 0.9,
            "standardDeviationAlignmentX": 0.01,
            "standardDeviationAlignmentY": 0.02,
            "standardDeviationAlignmentZ": 0.03,
            "volumeWeightedAverageAlignmentX": 0.11,
            "volumeWeightedAverageAlignmentY": 0.21,
            "volumeWeightedAverageAlignmentZ": 0.91,
            "volumeWeightedStandardDeviationAlignmentX": 0.04,
            "volumeWeightedStandardDeviationAlignmentY": 0.05,
            "volumeWeightedStandardDeviationAlignmentZ": 0.06
        })
    }

    pub(crate) fn item(radius: f64, thickness: f64) -> serde_json::Value {
        json!({
            "radius": radius,
            "thickness": thickness,
            "normal": [0.0, 0.0, 1.0],
            "position": [1.0, 2.0, 3.0],
            "faceRotation": 0.25,
            "vertices": [[1.0, 0.0, 0.0], [0.5, 0.866, 0.0]],
            "triangulation": {
                "Points": [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
                "ConnectivityList": [[1, 2, 3]]
            }
        })
    }

    #[test]
    fn parses_camel_case_document() {
        let raw: RawExtraction =
            serde_json::from_value(document(json!([item(1.0, 0.2)]))).unwrap();

        assert_eq!(raw.items.len(), 1);
        let stats = raw.statistics();
        assert_eq!(stats.volume, 12.5);
        assert_eq!(stats.bounds.extent(Axis::Z), 4.0);
        assert_eq!(stats.volumetric_filling_fraction, 0.31);
        assert_eq!(stats.alignment.average.get(Axis::Z), 0.9);
        assert_eq!(stats.alignment.volume_weighted_standard_deviation.y, 0.05);
    }

    #[test]
    fn prism_geometry_keeps_mesh() {
        let raw: RawPrism = serde_json::from_value(item(0.5, 0.1)).unwrap();
        assert!(raw.density.is_none());

        let geometry = raw.into_geometry();
        assert_eq!(geometry.face_rotation, FaceRotation::Angle(0.25));
        assert_eq!(geometry.vertices.len(), 2);
        assert_eq!(geometry.triangulation.points.len(), 3);
        assert_eq!(geometry.triangulation.connectivity, vec![[1, 2, 3]]);
    }

    #[test]
    fn triangulation_is_optional() {
        let mut value = item(1.0, 0.2);
        value.as_object_mut().unwrap().remove("triangulation");

        let raw: RawPrism = serde_json::from_value(value).unwrap();
        assert_eq!(raw.triangulation.connectivity_list.len(), 0);
    }

    #[test]
    fn null_statistics_read_as_nan() {
        let mut value = document(json!([item(1.0, 0.2)]));
        value["standardDeviationAlignmentX"] = serde_json::Value::Null;
        value["volumeWeightedAverageAlignmentZ"] = serde_json::Value::Null;

        let raw: RawExtraction = serde_json::from_value(value).unwrap();
        let stats = raw.statistics();

        assert!(stats.alignment.standard_deviation.x.is_nan());
        assert!(stats.alignment.volume_weighted_average.z.is_nan());
        assert_eq!(stats.alignment.standard_deviation.y, 0.02);
        assert_eq!(stats.volumetric_filling_fraction, 0.31);
    }

    #[test]
    fn face_rotation_may_be_a_vector() {
        let mut value = item(1.0, 0.2);
        value["faceRotation"] = json!([0.0, 0.5, 1.0]);

        let raw: RawPrism = serde_json::from_value(value).unwrap();
        assert_eq!(
            raw.face_rotation,
            FaceRotation::Components(vec![0.0, 0.5, 1.0])
        );
    }

    #[test]
    fn missing_statistic_is_rejected() {
        let mut value = document(json!([]));
        value.as_object_mut().unwrap().remove("volumetricFillingFraction");

        assert!(serde_json::from_value::<RawExtraction>(value).is_err());
    }
}
