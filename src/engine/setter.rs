//! Setter application
//!
//! Applies each setter directive of a validated command to the entities in
//! the resolved selection. Dispatch is an exhaustive match on
//! [`SetterKind`]; every field touched here is a statically known accessor.

use tracing::{debug, warn};

use crate::algebra::EditOp;
use crate::parser::ast::{Command, SetterKind};
use crate::plan::{DeviceType, Plan};

use super::selection::{AddressMode, Selection};

/// The two optional angle fields a setter can address on a control point.
#[derive(Debug, Clone, Copy)]
enum AngleField {
    Gantry,
    Collimator,
}

/// Apply every setter in the command to the selected entities.
pub fn apply(command: &Command, selection: &Selection, plan: &mut Plan) {
    for (setter, _) in command.setters() {
        debug!("found {} setter: {:?}", setter.name(), setter);
        match setter {
            SetterKind::Meterset(op) => apply_meterset(*op, selection, plan),
            SetterKind::Machine(name) => apply_machine(name, selection, plan),
            SetterKind::Gantry(op) => apply_angle(*op, selection, plan, AngleField::Gantry),
            SetterKind::Collimator(op) => apply_angle(*op, selection, plan, AngleField::Collimator),
            SetterKind::PositionAbsolute(value) => {
                apply_position(EditOp::Set(*value), selection, plan)
            }
            SetterKind::PositionRelative(op) => apply_position(*op, selection, plan),
        }
    }
}

/// Edit the meterset of each selected beam's dose entry.
fn apply_meterset(op: EditOp, selection: &Selection, plan: &mut Plan) {
    for &beam in &selection.beams {
        let beam_number = plan.beams[beam].beam_number;
        match plan.meterset_mut(beam_number) {
            Some(meterset) => *meterset = op.apply(*meterset),
            None => warn!("no dose entry for beam number {}, skipping", beam_number),
        }
    }
}

/// Replace the machine name of each selected beam.
fn apply_machine(name: &str, selection: &Selection, plan: &mut Plan) {
    for &beam in &selection.beams {
        plan.beams[beam].machine_name = name.to_string();
    }
}

/// Edit an optional angle field on each selected control point. Control
/// points that do not carry the field are skipped.
fn apply_angle(op: EditOp, selection: &Selection, plan: &mut Plan, field: AngleField) {
    for &(beam, cp) in &selection.control_points {
        let control_point = &mut plan.beams[beam].control_points[cp];
        let slot = match field {
            AngleField::Gantry => &mut control_point.gantry_angle,
            AngleField::Collimator => &mut control_point.collimator_angle,
        };
        if let Some(value) = slot.as_mut() {
            *value = op.apply(*value);
        }
    }
}

/// Edit device positions in the mode the command's filters addressed.
fn apply_position(op: EditOp, selection: &Selection, plan: &mut Plan) {
    match selection.mode {
        Some(AddressMode::Leaf) => apply_leaf_position(op, selection, plan),
        Some(AddressMode::Jaw) => apply_jaw_position(op, selection, plan),
        // Validation requires an addressing filter before a position setter.
        None => {}
    }
}

/// MLC positions store bank 0 then bank 1 in one list; split at the plan's
/// pair bound and edit the addressed pair entries of each selected bank.
fn apply_leaf_position(op: EditOp, selection: &Selection, plan: &mut Plan) {
    for &(beam, cp) in &selection.control_points {
        for device in &mut plan.beams[beam].control_points[cp].device_positions {
            if !device.device_type.is_mlc() {
                continue;
            }
            if device.positions.len() != 2 * selection.max_pairs {
                warn!(
                    "device has {} positions but the plan's bank boundary is {}, skipping device",
                    device.positions.len(),
                    selection.max_pairs
                );
                continue;
            }
            let (bank0, bank1) = device.positions.split_at_mut(selection.max_pairs);
            for &bank in &selection.leaf_banks {
                let positions: &mut [f64] = match bank {
                    0 => &mut *bank0,
                    1 => &mut *bank1,
                    _ => continue,
                };
                for &pair in &selection.leaf_pairs {
                    match positions.get_mut(pair) {
                        Some(position) => *position = op.apply(*position),
                        None => warn!("leaf pair {} beyond bank size, skipping", pair),
                    }
                }
            }
        }
    }
}

/// Jaw filter value 0 addresses the ASYMX device, 1 the ASYMY device; the
/// jaw-bank filter picks which of the device's two values to edit.
fn apply_jaw_position(op: EditOp, selection: &Selection, plan: &mut Plan) {
    for &(beam, cp) in &selection.control_points {
        for &jaw in &selection.jaws {
            let target = match jaw {
                0 => DeviceType::AsymX,
                1 => DeviceType::AsymY,
                _ => continue,
            };
            for device in &mut plan.beams[beam].control_points[cp].device_positions {
                if device.device_type != target {
                    continue;
                }
                for &bank in &selection.jaw_banks {
                    match device.positions.get_mut(bank) {
                        Some(position) => *position = op.apply(*position),
                        None => warn!("jaw bank {} has no stored position, skipping", bank),
                    }
                }
            }
        }
    }
}
