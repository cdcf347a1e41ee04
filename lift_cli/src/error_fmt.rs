//! Human-readable error descriptions, exit codes and structured JSON errors.

use lift_core::{BuildError, ChannelMapError, DriverFault, ElevationError, ErrorClass};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingDriver => {
                "What happened: No output driver was provided to the controller.\nLikely causes: GPIO initialization failed or the driver was not wired into the builder.\nHow to fix: Check the [channels] pins and GPIO permissions, then rerun.".to_string()
            }
            BuildError::MissingChannels => {
                "What happened: No channels are mapped to outputs.\nLikely causes: The [channels] table is empty.\nHow to fix: Map preset1..preset4, up and down to BCM pins in the config.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/lift.toml for a sample."
            ),
        };
    }

    if let Some(ce) = err.downcast_ref::<ChannelMapError>() {
        return format!(
            "What happened: Channel mapping is invalid ({ce}).\nLikely causes: A typo in a [channels] key or two channels on one pin.\nHow to fix: Use the names preset1..preset4, up, down, each with its own pin."
        );
    }

    if let Some(ee) = err.downcast_ref::<ElevationError>() {
        return match ee {
            ElevationError::InvalidTarget(p) => format!(
                "What happened: Target {p}% is out of range.\nLikely causes: A typo or a value given in another unit.\nHow to fix: Pass a whole percentage between 0 and 100."
            ),
            ElevationError::InvalidMode(m) => format!(
                "What happened: Preset {m} does not exist.\nLikely causes: The lift only memorizes presets 1 to 4.\nHow to fix: Pass --mode 1, 2, 3 or 4."
            ),
            ElevationError::MissingChannel(ch) => format!(
                "What happened: Channel {ch} is not mapped to an output; nothing was moved.\nLikely causes: [channels].{ch} is missing from the config.\nHow to fix: Add `{ch} = <BCM pin>` under [channels] and rerun."
            ),
            ElevationError::PulseCeiling {
                channel,
                requested,
                ceiling,
            } => format!(
                "What happened: The {channel} pulse would last {requested:?}, over the {ceiling:?} ceiling; nothing was moved.\nLikely causes: timing.seconds_per_percent or the travel calibration is too large.\nHow to fix: Recalibrate, or raise timing.max_pulse_ms (0 disables the ceiling)."
            ),
            ElevationError::Driver(DriverFault::Unavailable(why)) => format!(
                "What happened: The output hardware is unavailable ({why}).\nLikely causes: GPIO chip missing, insufficient permissions, or a previous run crashed mid-pulse.\nHow to fix: Check wiring and permissions; the request was not retried."
            ),
            ElevationError::Driver(fault) => format!(
                "What happened: The output driver failed ({fault}).\nLikely causes: Wiring fault or a channel the driver does not know.\nHow to fix: Run `lift_cli self-check` and compare pins with the config; the request was not retried."
            ),
            ElevationError::Cancelled { completed, total } => format!(
                "What happened: Interrupted after {completed} of {total} pulses.\nLikely causes: Ctrl-C was pressed.\nHow to fix: The lift may sit between heights; rerun the request."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = chain_text(err);
    let lower = msg.to_ascii_lowercase();

    if lower.contains("travel csv must have headers") {
        return "Invalid headers in travel CSV. Expected 'percent,seconds'.".to_string();
    }

    if lower.contains("invalid configuration") || lower.contains("read config") {
        return format!(
            "What happened: Configuration is invalid or unreadable ({msg}).\nLikely causes: Wrong --config path, TOML syntax, or out-of-range values.\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// `outer: cause: root` in one line.
fn chain_text(err: &eyre::Report) -> String {
    err.chain()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

/// Stable exit codes: 2 bad input, 3 configuration, 4 driver, 5 cancelled, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(ee) = err.downcast_ref::<ElevationError>() {
        return match ee {
            e if e.class() == ErrorClass::Client => 2,
            e if e.is_configuration() => 3,
            ElevationError::Driver(_) => 4,
            ElevationError::Cancelled { .. } => 5,
            _ => 1,
        };
    }
    if err.downcast_ref::<BuildError>().is_some() || err.downcast_ref::<ChannelMapError>().is_some()
    {
        return 3;
    }
    let lower = chain_text(err).to_ascii_lowercase();
    if lower.contains("invalid configuration")
        || lower.contains("read config")
        || lower.contains("travel csv")
    {
        return 3;
    }
    1
}

/// Short machine-readable name for the error family.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    match exit_code_for_error(err) {
        2 => "InputError",
        3 => "ConfigurationError",
        4 => "DriverError",
        5 => "Cancelled",
        _ => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "error": err.to_string(),
        "message": humanize(err),
    })
    .to_string()
}
