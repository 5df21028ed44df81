//! In-memory treatment-plan document model
//!
//! The mutation engine edits these structures in place; the codec moves
//! them between memory and disk. Field layout mirrors the plan file's
//! structure: beams own control points and device geometry, fraction
//! groups cross-reference beams by number for dose bookkeeping.

use serde::{Deserialize, Serialize};

/// Beam-limiting device classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceType {
    /// X jaw pair
    #[serde(rename = "ASYMX")]
    AsymX,
    /// Y jaw pair
    #[serde(rename = "ASYMY")]
    AsymY,
    /// Multi-leaf collimator moving along X
    #[serde(rename = "MLCX")]
    MlcX,
    /// Multi-leaf collimator moving along Y
    #[serde(rename = "MLCY")]
    MlcY,
}

impl DeviceType {
    /// True for multi-leaf collimator types, which store two concatenated
    /// banks of leaf-pair positions.
    pub fn is_mlc(self) -> bool {
        matches!(self, DeviceType::MlcX | DeviceType::MlcY)
    }
}

/// Static description of one beam-limiting device on a beam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceGeometry {
    pub device_type: DeviceType,
    pub leaf_jaw_pairs: usize,
}

/// Position values of one device at one control point.
///
/// MLC types hold bank 0 followed by bank 1 in a single list of length
/// 2 x pair count; ASYM types hold exactly the two jaw bank values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevicePosition {
    pub device_type: DeviceType,
    pub positions: Vec<f64>,
}

/// A discrete delivery state within a beam.
///
/// The angle fields are optional: plans commonly carry them only on the
/// first control point of a beam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ControlPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gantry_angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collimator_angle: Option<f64>,
    #[serde(default)]
    pub device_positions: Vec<DevicePosition>,
}

/// One radiation delivery unit within a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    /// Unique 1-based number used to locate this beam's dose entry
    pub beam_number: u32,
    pub machine_name: String,
    #[serde(default)]
    pub device_geometries: Vec<DeviceGeometry>,
    #[serde(default)]
    pub control_points: Vec<ControlPoint>,
}

impl Beam {
    /// Largest pair count among this beam's MLC device geometries.
    pub fn max_leaf_pairs(&self) -> usize {
        self.device_geometries
            .iter()
            .filter(|g| g.device_type.is_mlc())
            .map(|g| g.leaf_jaw_pairs)
            .max()
            .unwrap_or(0)
    }
}

/// Dose bookkeeping for one beam, keyed by beam number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamDose {
    pub beam_number: u32,
    /// Monitor units delivered by the referenced beam
    pub meterset: f64,
}

/// Groups the dose entries that cross-reference beams by number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FractionGroup {
    pub referenced_beams: Vec<BeamDose>,
}

/// The full treatment-plan document being edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Instance identifier, regenerated per run unless the caller keeps it
    pub uid: String,
    pub beams: Vec<Beam>,
    #[serde(default)]
    pub fraction_groups: Vec<FractionGroup>,
}

impl Plan {
    /// Mutable access to the meterset recorded for a beam number, if any.
    pub fn meterset_mut(&mut self, beam_number: u32) -> Option<&mut f64> {
        self.fraction_groups
            .iter_mut()
            .flat_map(|g| g.referenced_beams.iter_mut())
            .find(|d| d.beam_number == beam_number)
            .map(|d| &mut d.meterset)
    }

    /// Read-only meterset lookup by beam number.
    pub fn meterset(&self, beam_number: u32) -> Option<f64> {
        self.fraction_groups
            .iter()
            .flat_map(|g| g.referenced_beams.iter())
            .find(|d| d.beam_number == beam_number)
            .map(|d| d.meterset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_leaf_pairs_ignores_jaws() {
        let beam = Beam {
            beam_number: 1,
            machine_name: "TB1".to_string(),
            device_geometries: vec![
                DeviceGeometry {
                    device_type: DeviceType::AsymX,
                    leaf_jaw_pairs: 1,
                },
                DeviceGeometry {
                    device_type: DeviceType::MlcX,
                    leaf_jaw_pairs: 60,
                },
            ],
            control_points: vec![],
        };
        assert_eq!(beam.max_leaf_pairs(), 60);
    }

    #[test]
    fn test_max_leaf_pairs_without_mlc() {
        let beam = Beam {
            beam_number: 1,
            machine_name: "TB1".to_string(),
            device_geometries: vec![DeviceGeometry {
                device_type: DeviceType::AsymY,
                leaf_jaw_pairs: 1,
            }],
            control_points: vec![],
        };
        assert_eq!(beam.max_leaf_pairs(), 0);
    }

    #[test]
    fn test_meterset_lookup_by_beam_number() {
        let mut plan = Plan {
            uid: "2.25.1".to_string(),
            beams: vec![],
            fraction_groups: vec![FractionGroup {
                referenced_beams: vec![
                    BeamDose {
                        beam_number: 1,
                        meterset: 100.0,
                    },
                    BeamDose {
                        beam_number: 2,
                        meterset: 150.0,
                    },
                ],
            }],
        };
        assert_eq!(plan.meterset(2), Some(150.0));
        *plan.meterset_mut(1).unwrap() = 90.0;
        assert_eq!(plan.meterset(1), Some(90.0));
        assert_eq!(plan.meterset(3), None);
    }
}
