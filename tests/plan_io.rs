//! Read-edit-write pipeline against plan files on disk

use rt_mangle::mangle;
use rt_mangle::plan::codec;
use rt_mangle::plan::{Beam, BeamDose, ControlPoint, FractionGroup, Plan};

fn small_plan() -> Plan {
    Plan {
        uid: "2.25.42".to_string(),
        beams: vec![Beam {
            beam_number: 1,
            machine_name: "TB1".to_string(),
            device_geometries: vec![],
            control_points: vec![ControlPoint {
                gantry_angle: Some(90.0),
                ..ControlPoint::default()
            }],
        }],
        fraction_groups: vec![FractionGroup {
            referenced_beams: vec![BeamDose {
                beam_number: 1,
                meterset: 120.0,
            }],
        }],
    }
}

#[test]
fn test_read_edit_write_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("plan.json");
    let output = dir.path().join("out.json");

    codec::write(&small_plan(), &input).unwrap();

    let mut plan = codec::read(&input).unwrap();
    plan.uid = codec::generate_uid();
    mangle(&mut plan, &["mu=-10%", "b0 g=+10"]).unwrap();
    codec::write(&plan, &output).unwrap();

    let written = codec::read(&output).unwrap();
    assert_eq!(written.meterset(1), Some(108.0));
    assert_eq!(
        written.beams[0].control_points[0].gantry_angle,
        Some(100.0)
    );
    assert_ne!(written.uid, "2.25.42");

    // The source file is untouched.
    let original = codec::read(&input).unwrap();
    assert_eq!(original.meterset(1), Some(120.0));
}

#[test]
fn test_rejected_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("plan.json");
    let output = dir.path().join("out.json");

    codec::write(&small_plan(), &input).unwrap();

    let mut plan = codec::read(&input).unwrap();
    let result = mangle(&mut plan, &["lb0 jb1 pa=1"]);
    assert!(result.is_err());

    // The caller aborts before serializing on error, so no output exists.
    assert!(!output.exists());
}
