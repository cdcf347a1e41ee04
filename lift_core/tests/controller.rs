use std::time::Duration;

use lift_core::mocks::{DriverEvent, RecordingDriver};
use lift_core::{
    CalibrationConstant, Channel, ChannelMap, ControllerCfg, ElevationController, ElevationError,
    ErrorClass, Percent, PresetMode, resolve,
};
use rstest::rstest;

const K: f64 = 1.0 / 15.0;

fn rig_map() -> ChannelMap {
    ChannelMap::from_names([
        ("preset1", 17),
        ("preset2", 6),
        ("preset3", 13),
        ("preset4", 5),
        ("up", 26),
        ("down", 27),
    ])
    .expect("valid rig map")
}

fn controller_with(
    drv: RecordingDriver,
    channels: ChannelMap,
) -> ElevationController<RecordingDriver> {
    ElevationController::builder()
        .with_driver(drv)
        .with_channels(channels)
        .with_config(ControllerCfg {
            calibration: CalibrationConstant::new(K).unwrap(),
            preset_press: Duration::from_millis(125),
            max_pulse: None,
        })
        .build()
        .expect("build controller")
}

fn pct(v: u8) -> Percent {
    Percent::new(v).unwrap()
}

#[rstest]
#[case(0, "preset1")]
#[case(33, "preset2")]
#[case(66, "preset3")]
#[case(100, "preset4")]
fn on_anchor_target_fires_only_its_preset(#[case] target: u8, #[case] channel: &str) {
    let drv = RecordingDriver::new();
    let c = controller_with(drv.clone(), rig_map());

    assert_eq!(c.set_elevation(pct(target)), Ok(pct(target)));
    assert_eq!(
        drv.pulses(),
        vec![(channel.to_string(), Duration::from_millis(125))]
    );
}

#[test]
fn off_anchor_targets_fire_preset_then_directional() {
    for target in 0u8..=100 {
        if [0, 33, 66, 100].contains(&target) {
            continue;
        }
        let drv = RecordingDriver::new();
        let c = controller_with(drv.clone(), rig_map());
        assert_eq!(c.set_elevation(pct(target)), Ok(pct(target)));

        let anchor = resolve(pct(target));
        let residual = i16::from(target) - i16::from(anchor.percent.get());
        let pulses = drv.pulses();
        assert_eq!(pulses.len(), 2, "target {target}");

        assert_eq!(pulses[0].0, Channel::Preset(anchor.mode).name());
        let expected_dir = if residual > 0 { "up" } else { "down" };
        assert_eq!(pulses[1].0, expected_dir, "target {target}");

        let expected_s = f64::from(residual.unsigned_abs()) * K;
        assert!(
            (pulses[1].1.as_secs_f64() - expected_s).abs() < 1e-6,
            "target {target}: {:?} vs {expected_s}",
            pulses[1].1
        );
    }
}

#[rstest]
#[case(50, "preset3", "down", 16)]
#[case(40, "preset2", "up", 7)]
#[case(83, "preset3", "up", 17)]
#[case(84, "preset4", "down", 16)]
#[case(16, "preset1", "up", 16)]
fn worked_examples(
    #[case] target: u8,
    #[case] preset: &str,
    #[case] dir: &str,
    #[case] points: u32,
) {
    let drv = RecordingDriver::new();
    let c = controller_with(drv.clone(), rig_map());
    c.set_elevation(pct(target)).unwrap();
    let pulses = drv.pulses();
    assert_eq!(pulses[0].0, preset);
    assert_eq!(pulses[1].0, dir);
    assert!((pulses[1].1.as_secs_f64() - f64::from(points) * K).abs() < 1e-6);
}

#[test]
fn repeated_requests_issue_identical_pulses() {
    let drv = RecordingDriver::new();
    let c = controller_with(drv.clone(), rig_map());
    c.set_elevation(pct(72)).unwrap();
    c.set_elevation(pct(72)).unwrap();
    let p = drv.pulses();
    assert_eq!(p.len(), 4);
    assert_eq!(p[0], p[2]);
    assert_eq!(p[1], p[3]);
}

#[test]
fn select_preset_returns_canonical_percent() {
    let drv = RecordingDriver::new();
    let c = controller_with(drv.clone(), rig_map());
    assert_eq!(c.select_preset(2), Ok(pct(33)));
    assert_eq!(c.select_preset(4), Ok(pct(100)));
    assert_eq!(
        drv.pulses(),
        vec![
            ("preset2".to_string(), Duration::from_millis(125)),
            ("preset4".to_string(), Duration::from_millis(125)),
        ]
    );
}

#[rstest]
#[case(0)]
#[case(5)]
#[case(-3)]
fn select_preset_rejects_bad_mode_without_pulsing(#[case] mode: i64) {
    let drv = RecordingDriver::new();
    let c = controller_with(drv.clone(), rig_map());
    let err = c.select_preset(mode).unwrap_err();
    assert_eq!(err, ElevationError::InvalidMode(mode));
    assert_eq!(err.class(), ErrorClass::Client);
    assert!(drv.events().is_empty());
}

#[test]
fn missing_preset_channel_is_configuration_error_without_pulsing() {
    let mut map = rig_map();
    map.remove(Channel::Preset(PresetMode::new(3).unwrap()));
    let drv = RecordingDriver::new();
    let c = controller_with(drv.clone(), map);

    let err = c.select_preset(3).unwrap_err();
    assert_eq!(err, ElevationError::MissingChannel("preset3".into()));
    assert!(err.is_configuration());
    assert_eq!(err.class(), ErrorClass::Server);

    let err = c.set_elevation(pct(70)).unwrap_err();
    assert_eq!(err, ElevationError::MissingChannel("preset3".into()));
    assert!(drv.events().is_empty());

    // Other presets still work.
    assert_eq!(c.set_elevation(pct(33)), Ok(pct(33)));
}

#[test]
fn missing_direction_channel_fails_before_preset_fires() {
    let mut map = rig_map();
    map.remove(Channel::Down);
    let drv = RecordingDriver::new();
    let c = controller_with(drv.clone(), map);

    let err = c.set_elevation(pct(60)).unwrap_err();
    assert_eq!(err, ElevationError::MissingChannel("down".into()));
    assert!(drv.events().is_empty());

    // Upward residuals never need `down`.
    assert_eq!(c.set_elevation(pct(40)), Ok(pct(40)));
}

#[test]
fn driver_failure_mid_operation_is_not_retried() {
    let drv = RecordingDriver::new().fail_on("up");
    let c = controller_with(drv.clone(), rig_map());

    let err = c.set_elevation(pct(40)).unwrap_err();
    assert!(matches!(err, ElevationError::Driver(_)), "got {err:?}");
    assert_eq!(err.class(), ErrorClass::Server);
    // Preset went out, the failed directional pulse was attempted once.
    assert_eq!(
        drv.pulses(),
        vec![("preset2".to_string(), Duration::from_millis(125))]
    );
}

#[test]
fn unavailable_hardware_surfaces_as_driver_error() {
    let drv = RecordingDriver::new().unavailable("gpio chip not initialized");
    let c = controller_with(drv.clone(), rig_map());
    match c.select_preset(1) {
        Err(ElevationError::Driver(lift_core::DriverFault::Unavailable(msg))) => {
            assert!(msg.contains("not initialized"));
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(drv.events().is_empty());
}

#[test]
fn pulse_ceiling_rejects_plan_before_actuation() {
    let drv = RecordingDriver::new();
    let c = ElevationController::builder()
        .with_driver(drv.clone())
        .with_channels(rig_map())
        .with_config(ControllerCfg {
            calibration: CalibrationConstant::new(1.0 / 7.0).unwrap(),
            preset_press: Duration::from_millis(125),
            max_pulse: Some(Duration::from_secs(2)),
        })
        .build()
        .unwrap();

    // 50% snaps to 66%: 16 points down at 1/7 s = 2.29 s.
    match c.set_elevation(pct(50)).unwrap_err() {
        ElevationError::PulseCeiling {
            channel, ceiling, ..
        } => {
            assert_eq!(channel, "down");
            assert_eq!(ceiling, Duration::from_secs(2));
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(drv.events().is_empty());

    // 7 points = 1 s fits.
    assert_eq!(c.set_elevation(pct(40)), Ok(pct(40)));
}

#[test]
fn release_all_reaches_driver() {
    let drv = RecordingDriver::new();
    let c = controller_with(drv.clone(), rig_map());
    c.release_all().unwrap();
    assert_eq!(drv.events(), vec![DriverEvent::ReleaseAll]);
}

#[test]
fn absurd_calibration_without_ceiling_saturates_total() {
    let drv = RecordingDriver::new();
    let c = ElevationController::builder()
        .with_driver(drv.clone())
        .with_channels(rig_map())
        .with_config(ControllerCfg {
            calibration: CalibrationConstant::new(1e300).unwrap(),
            preset_press: Duration::from_millis(125),
            max_pulse: None,
        })
        .build()
        .unwrap();

    let plan = c.plan(pct(40)).unwrap();
    assert_eq!(plan.directional().unwrap().duration, Duration::MAX);
    assert_eq!(plan.total_duration(), Duration::MAX);

    // The mock does not sleep, so the request completes and the rig stays usable.
    assert_eq!(c.set_elevation(pct(40)), Ok(pct(40)));
    assert_eq!(c.select_preset(1), Ok(pct(0)));
    assert_eq!(drv.pulses().len(), 3);
}
