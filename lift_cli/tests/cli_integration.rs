use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

const CHANNELS: &str = r#"
[channels]
preset1 = 17
preset2 = 6
preset3 = 13
preset4 = 5
up = 26
down = 27
"#;

// Millisecond-scale timing so sim pulses finish instantly
const FAST_TIMING: &str = r#"
[timing]
seconds_per_percent = 0.001
preset_press_ms = 1
"#;

fn write_config(dir: &tempfile::TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("lift.toml");
    fs::write(&path, body).unwrap();
    path
}

fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    write_config(dir, &format!("{CHANNELS}{FAST_TIMING}"))
}

#[rstest]
#[case(&["--help"], 0, "Usage: lift_cli", "stdout")]
#[case(&["set-elevation", "--percent", "83"], 0, "elevation set: 83%", "stdout")]
#[case(&["set-elevation", "--percent", "66"], 0, "preset 3 at 66%)", "stdout")]
#[case(&["select-preset", "--mode", "2"], 0, "preset 2 selected: 33%", "stdout")]
#[case(&["plan", "--percent", "50"], 0, "preset 3 at 66%, down 0.016s", "stdout")]
#[case(&["self-check"], 0, "preset1  -> BCM 17", "stdout")]
#[case(&["set-elevation"], 2, "required", "stderr")]
#[case(&["set-elevation", "--percent", "101"], 2, "out of range", "stderr")]
#[case(&["set-elevation", "--percent", "-1"], 2, "out of range", "stderr")]
#[case(&["select-preset", "--mode", "5"], 2, "does not exist", "stderr")]
#[case(&["select-preset", "--mode", "0"], 2, "does not exist", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("lift_cli").unwrap();
    // Always include a valid config to avoid relying on default path
    cmd.arg("--config").arg(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        _ => {
            assert.stderr(predicate::str::contains(needle));
        }
    }
}

#[rstest]
fn missing_config_file_is_configuration_error() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("lift_cli")
        .unwrap()
        .arg("--config")
        .arg(dir.path().join("nope.toml"))
        .args(["plan", "--percent", "10"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Configuration is invalid or unreadable"));
}

#[rstest]
fn duplicate_pin_is_rejected_at_load() {
    let dir = tempdir().unwrap();
    let cfg = write_config(
        &dir,
        r#"
[channels]
preset1 = 17
up = 17
"#,
    );
    Command::cargo_bin("lift_cli")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["select-preset", "--mode", "1"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("share pin 17"));
}

#[rstest]
fn unknown_channel_name_is_rejected_at_load() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, &format!("{CHANNELS}preset5 = 4\n"));
    Command::cargo_bin("lift_cli")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["select-preset", "--mode", "1"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("preset5"));
}

#[rstest]
#[case(&["set-elevation", "--percent", "70"], 3, "preset3")]
#[case(&["select-preset", "--mode", "3"], 3, "preset3")]
#[case(&["set-elevation", "--percent", "10"], 0, "elevation set: 10%")]
fn unmapped_preset_fails_only_when_needed(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_config(
        &dir,
        &format!(
            r#"
[channels]
preset1 = 17
preset2 = 6
preset4 = 5
up = 26
down = 27
{FAST_TIMING}"#
        ),
    );
    let mut cmd = Command::cargo_bin("lift_cli").unwrap();
    cmd.arg("--config").arg(&cfg).args(args);
    let out = cmd.assert().code(exit_code).get_output().clone();
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    assert!(text.contains(needle), "missing {needle:?} in {text}");
}

#[rstest]
fn pulse_over_ceiling_is_configuration_error() {
    let dir = tempdir().unwrap();
    let cfg = write_config(
        &dir,
        &format!("{CHANNELS}{FAST_TIMING}max_pulse_ms = 10\n"),
    );
    Command::cargo_bin("lift_cli")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["set-elevation", "--percent", "50"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("ceiling"));
}

#[rstest]
fn travel_csv_with_wrong_headers_is_rejected() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let csv = dir.path().join("travel.csv");
    fs::write(&csv, "height,time\n10,0.5\n").unwrap();

    Command::cargo_bin("lift_cli")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("--calibration")
        .arg(&csv)
        .args(["plan", "--percent", "50"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Expected 'percent,seconds'"));
}

#[rstest]
fn calibration_table_in_config_resolves_relative_to_config_dir() {
    let dir = tempdir().unwrap();
    let cfg = write_config(
        &dir,
        &format!("{CHANNELS}{FAST_TIMING}\n[calibration]\ncsv = \"travel.csv\"\n"),
    );
    fs::write(dir.path().join("travel.csv"), "percent,seconds\n10,0.1\n20,0.2\n").unwrap();

    // 0.01 s per point: 50% is 16 points below preset 3
    Command::cargo_bin("lift_cli")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["plan", "--percent", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("down 0.160s"));
}

#[rstest]
fn unavailable_driver_is_driver_error() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    Command::cargo_bin("lift_cli")
        .unwrap()
        .env("LIFT_TEST_SIM_FAIL", "1")
        .arg("--config")
        .arg(&cfg)
        .args(["set-elevation", "--percent", "40"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("hardware is unavailable"));
}

#[rstest]
fn plan_never_touches_the_driver() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    // A failing driver does not matter when nothing is actuated
    Command::cargo_bin("lift_cli")
        .unwrap()
        .env("LIFT_TEST_SIM_FAIL", "1")
        .arg("--config")
        .arg(&cfg)
        .args(["plan", "--percent", "83"])
        .assert()
        .success()
        .stdout(predicate::str::contains("preset 3 at 66%, up 0.017s"));
}

#[rstest]
fn self_check_walk_pulses_every_channel() {
    let dir = tempdir().unwrap();
    let cfg = write_config(
        &dir,
        &format!("{CHANNELS}{FAST_TIMING}\n[hardware]\nwalk_hold_ms = 1\nwalk_gap_ms = 1\n"),
    );
    Command::cargo_bin("lift_cli")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["self-check", "--walk"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "walked: preset1, preset2, preset3, preset4, up, down",
        ));
}
