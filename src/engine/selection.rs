//! Filter resolution
//!
//! Expands the six filter directives of a validated command into concrete
//! entity indices against the plan. Resolution runs in the fixed
//! [`FilterKind::ALL`] order: the beam list first, since the control-point
//! and leaf-pair filters are scoped by the beams already selected.
//!
//! Out-of-range indices named explicitly are never fatal here; they are
//! logged and skipped so the rest of the command still applies.

use tracing::{debug, warn};

use crate::parser::ast::{Command, FilterKind, IndexExpr, IndexTerm};
use crate::plan::Plan;

/// Addressing mode for position setters, decided by which filter keys the
/// command named explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    Leaf,
    Jaw,
}

/// The concrete entities and index sets one command operates on.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    /// Positions into the plan's beam sequence
    pub beams: Vec<usize>,
    /// (beam position, control point position) pairs
    pub control_points: Vec<(usize, usize)>,
    /// Jaw device selectors: 0 = ASYMX, 1 = ASYMY
    pub jaws: Vec<usize>,
    /// Jaw bank indices within the selected jaw devices
    pub jaw_banks: Vec<usize>,
    /// Leaf pair indices within the selected leaf banks
    pub leaf_pairs: Vec<usize>,
    /// Leaf bank indices: 0 = bank A, 1 = bank B
    pub leaf_banks: Vec<usize>,
    /// Bank boundary: the largest MLC pair count of the first selected beam
    pub max_pairs: usize,
    /// Position addressing mode, when the command named one
    pub mode: Option<AddressMode>,
}

/// Resolve a command's filters against the plan.
pub fn resolve(command: &Command, plan: &Plan) -> Selection {
    let mut selection = Selection {
        mode: address_mode(command),
        ..Selection::default()
    };

    for kind in FilterKind::ALL {
        let expr = match command.filter(kind) {
            Some(filter) => {
                debug!("found {} filter: {:?}", kind.name(), filter.indices);
                filter.indices.clone()
            }
            None => IndexExpr::Wildcard,
        };

        match kind {
            FilterKind::Beam => selection.beams = resolve_beams(&expr, plan),
            FilterKind::ControlPoint => {
                selection.control_points = resolve_control_points(&expr, &selection.beams, plan)
            }
            FilterKind::Jaw => selection.jaws = resolve_bank(&expr, kind),
            FilterKind::JawBank => selection.jaw_banks = resolve_bank(&expr, kind),
            FilterKind::LeafPair => {
                selection.max_pairs = selection
                    .beams
                    .first()
                    .map(|&b| plan.beams[b].max_leaf_pairs())
                    .unwrap_or(0);
                selection.leaf_pairs = resolve_leaf_pairs(&expr, selection.max_pairs);
            }
            FilterKind::LeafBank => selection.leaf_banks = resolve_bank(&expr, kind),
        }
    }

    debug!(
        "selected {} beam(s), {} control point(s)",
        selection.beams.len(),
        selection.control_points.len()
    );
    selection
}

fn address_mode(command: &Command) -> Option<AddressMode> {
    if command.filters().any(|(f, _)| f.kind.is_leaf_addressing()) {
        Some(AddressMode::Leaf)
    } else if command.filters().any(|(f, _)| f.kind.is_jaw_addressing()) {
        Some(AddressMode::Jaw)
    } else {
        None
    }
}

/// Expand comma terms into a flat ordered index list; ranges are inclusive
/// and expand in place among the other terms.
pub fn expand_terms(terms: &[IndexTerm]) -> Vec<usize> {
    let mut out = Vec::new();
    for term in terms {
        match *term {
            IndexTerm::Single(index) => out.push(index),
            IndexTerm::Range(lo, hi) => out.extend(lo..=hi),
        }
    }
    out
}

fn resolve_beams(expr: &IndexExpr, plan: &Plan) -> Vec<usize> {
    match expr {
        IndexExpr::Wildcard => (0..plan.beams.len()).collect(),
        IndexExpr::List(terms) => expand_terms(terms)
            .into_iter()
            .filter(|&index| {
                if index < plan.beams.len() {
                    true
                } else {
                    warn!("beam index {} out of plan range, ignoring beam", index);
                    false
                }
            })
            .collect(),
    }
}

fn resolve_control_points(expr: &IndexExpr, beams: &[usize], plan: &Plan) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for &beam in beams {
        let count = plan.beams[beam].control_points.len();
        match expr {
            IndexExpr::Wildcard => out.extend((0..count).map(|cp| (beam, cp))),
            IndexExpr::List(terms) => {
                for index in expand_terms(terms) {
                    if index < count {
                        out.push((beam, index));
                    } else {
                        warn!(
                            "control point index {} out of range for beam {}, ignoring",
                            index, beam
                        );
                    }
                }
            }
        }
    }
    out
}

/// Jaw, jaw-bank, and leaf-bank filters all select within the two banks.
fn resolve_bank(expr: &IndexExpr, kind: FilterKind) -> Vec<usize> {
    match expr {
        IndexExpr::Wildcard => vec![0, 1],
        IndexExpr::List(terms) => expand_terms(terms)
            .into_iter()
            .filter(|&index| {
                if index <= 1 {
                    true
                } else {
                    warn!("{} index {} out of range, ignoring", kind.name(), index);
                    false
                }
            })
            .collect(),
    }
}

fn resolve_leaf_pairs(expr: &IndexExpr, max_pairs: usize) -> Vec<usize> {
    match expr {
        IndexExpr::Wildcard => (0..max_pairs).collect(),
        IndexExpr::List(terms) => expand_terms(terms)
            .into_iter()
            .filter(|&index| {
                if index < max_pairs {
                    true
                } else {
                    warn!("leaf pair index {} out of range, ignoring", index);
                    false
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::plan::{Beam, ControlPoint, DeviceGeometry, DeviceType};
    use pretty_assertions::assert_eq;

    fn plan_with(beams: usize, cps: usize, pairs: usize) -> Plan {
        Plan {
            uid: "2.25.1".to_string(),
            beams: (0..beams)
                .map(|i| Beam {
                    beam_number: i as u32 + 1,
                    machine_name: "TB1".to_string(),
                    device_geometries: vec![DeviceGeometry {
                        device_type: DeviceType::MlcX,
                        leaf_jaw_pairs: pairs,
                    }],
                    control_points: vec![ControlPoint::default(); cps],
                })
                .collect(),
            fraction_groups: vec![],
        }
    }

    fn resolve_str(input: &str, plan: &Plan) -> Selection {
        resolve(&parse(input).expect("should parse"), plan)
    }

    #[test]
    fn test_range_expansion_order_and_position() {
        // A range expands in place among the other comma terms, ascending,
        // each index exactly once.
        assert_eq!(
            expand_terms(&[
                IndexTerm::Single(7),
                IndexTerm::Range(2, 5),
                IndexTerm::Single(0),
            ]),
            vec![7, 2, 3, 4, 5, 0]
        );
    }

    #[test]
    fn test_single_index_range() {
        assert_eq!(expand_terms(&[IndexTerm::Range(3, 3)]), vec![3]);
    }

    #[test]
    fn test_missing_beam_filter_selects_every_beam() {
        let plan = plan_with(3, 2, 5);
        let selection = resolve_str("g=+10", &plan);
        assert_eq!(selection.beams, vec![0, 1, 2]);
        assert_eq!(
            selection.control_points,
            vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1)]
        );
    }

    #[test]
    fn test_explicit_beam_filter_scopes_control_points() {
        let plan = plan_with(2, 3, 5);
        let selection = resolve_str("b0 g=+10", &plan);
        assert_eq!(selection.beams, vec![0]);
        assert_eq!(selection.control_points, vec![(0, 0), (0, 1), (0, 2)]);
    }

    #[test]
    fn test_out_of_range_beam_skipped() {
        let plan = plan_with(2, 1, 5);
        let selection = resolve_str("b0,5 g=+10", &plan);
        assert_eq!(selection.beams, vec![0]);
    }

    #[test]
    fn test_out_of_range_control_point_skipped_per_beam() {
        let plan = plan_with(2, 2, 5);
        let selection = resolve_str("cp1,3 g=+10", &plan);
        assert_eq!(selection.control_points, vec![(0, 1), (1, 1)]);
    }

    #[test]
    fn test_bank_wildcards_expand_to_both_banks() {
        let plan = plan_with(1, 1, 5);
        let selection = resolve_str("lp0 pa=1", &plan);
        assert_eq!(selection.leaf_banks, vec![0, 1]);
        assert_eq!(selection.jaws, vec![0, 1]);
        assert_eq!(selection.jaw_banks, vec![0, 1]);
    }

    #[test]
    fn test_leaf_pair_wildcard_uses_first_beam_geometry() {
        let plan = plan_with(2, 1, 5);
        let selection = resolve_str("lb0 pa=1", &plan);
        assert_eq!(selection.max_pairs, 5);
        assert_eq!(selection.leaf_pairs, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_leaf_pair_beyond_geometry_skipped() {
        let plan = plan_with(1, 1, 3);
        let selection = resolve_str("lp1,9 pa=1", &plan);
        assert_eq!(selection.leaf_pairs, vec![1]);
    }

    #[test]
    fn test_bank_index_above_one_skipped() {
        let plan = plan_with(1, 1, 5);
        let selection = resolve_str("lb0,2 pa=1", &plan);
        assert_eq!(selection.leaf_banks, vec![0]);
    }

    #[test]
    fn test_address_mode_from_filters() {
        let plan = plan_with(1, 1, 5);
        assert_eq!(
            resolve_str("lp0 pa=1", &plan).mode,
            Some(AddressMode::Leaf)
        );
        assert_eq!(resolve_str("j0 pr=+1", &plan).mode, Some(AddressMode::Jaw));
        assert_eq!(resolve_str("g=+10", &plan).mode, None);
    }
}
