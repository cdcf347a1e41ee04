#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `lift_cli`: the caller layer in front of `lift_core`.
//!
//! Parses arguments, loads and validates the TOML config, installs logging,
//! builds one controller over the simulated or GPIO driver and runs a single
//! command. Results go to stdout, diagnostics to stderr.

mod cli;
mod error_fmt;
mod logging;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use eyre::WrapErr;
use serde_json::json;
use tracing::{info, warn};

use lift_core::{ChannelMap, ControllerCfg, ElevationController, ElevationPlan, Percent};
use lift_traits::OutputDriver;

use crate::cli::{Cli, Commands};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

type Driver = Box<dyn OutputDriver + Send>;

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let json = cli.json;

    let mut guard = None;
    let code = match run(cli, &mut guard) {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "command failed");
            if json {
                eprintln!("{}", format_error_json(&e));
            } else {
                eprintln!("{}", humanize(&e));
            }
            exit_code_for_error(&e)
        }
    };
    // flush the file appender before exiting
    drop(guard);
    std::process::exit(code);
}

fn run(
    cli: Cli,
    guard: &mut Option<tracing_appender::non_blocking::WorkerGuard>,
) -> eyre::Result<()> {
    let cfg = load_config(&cli.config)?;

    let level = cli
        .log_level
        .as_deref()
        .or(cfg.logging.level.as_deref())
        .unwrap_or("info");
    *guard = logging::init(cli.json, level, &cfg.logging)?;

    let mut ctl_cfg = ControllerCfg::try_from(&cfg)?;
    let base = cli.config.parent().unwrap_or_else(|| Path::new("."));
    if let Some(path) = cli
        .calibration
        .clone()
        .or_else(|| cfg.calibration_path(base))
    {
        let travel = lift_config::load_travel_csv(&path)
            .wrap_err_with(|| format!("invalid travel CSV {}", path.display()))?;
        info!(
            path = %path.display(),
            seconds_per_percent = travel.seconds_per_percent,
            inliers = travel.inliers,
            rms_s = travel.rms_s,
            "travel calibration loaded"
        );
        ctl_cfg = ctl_cfg.with_travel(&travel)?;
    }

    let channels = ChannelMap::try_from(&cfg)?;
    for missing in channels.missing() {
        warn!(channel = missing.name(), "channel not mapped; operations needing it will fail");
    }

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&cancel);
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
            .wrap_err("install Ctrl-C handler")?;
    }

    let driver = make_driver(&channels)?;
    let controller = ElevationController::builder()
        .with_driver(driver)
        .with_channels(channels)
        .with_config(ctl_cfg)
        .with_cancel_flag(cancel)
        .build()?;

    let walk = (
        Duration::from_millis(cfg.hardware.walk_hold_ms),
        Duration::from_millis(cfg.hardware.walk_gap_ms),
    );
    let result = dispatch(&controller, &cli.cmd, &ctl_cfg, walk, cli.json);
    if result.is_err()
        && let Err(e) = controller.release_all()
    {
        warn!(error = %e, "release after failure did not complete");
    }
    result
}

fn load_config(path: &Path) -> eyre::Result<lift_config::Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = lift_config::load_toml(&text).wrap_err("invalid configuration")?;
    cfg.validate().wrap_err("invalid configuration")?;
    Ok(cfg)
}

#[cfg(not(feature = "hardware"))]
fn make_driver(channels: &ChannelMap) -> eyre::Result<Driver> {
    let sim = lift_hardware::SimulatedDriver::new(
        channels.named_pins().into_iter().map(|(name, _)| name),
    );
    // Test hook: force the simulated outputs offline.
    if std::env::var("LIFT_TEST_SIM_FAIL").is_ok_and(|v| v == "1") {
        return Ok(Box::new(sim.fail_with("LIFT_TEST_SIM_FAIL is set")));
    }
    Ok(Box::new(sim))
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn make_driver(channels: &ChannelMap) -> eyre::Result<Driver> {
    let gpio = lift_hardware::GpioDriver::open(channels.named_pins()).map_err(|e| {
        lift_core::ElevationError::from(Box::<dyn std::error::Error + Send + Sync>::from(e))
    })?;
    Ok(Box::new(gpio))
}

#[cfg(all(feature = "hardware", not(target_os = "linux")))]
fn make_driver(_channels: &ChannelMap) -> eyre::Result<Driver> {
    eyre::bail!("the hardware backend is only available on Linux")
}

fn dispatch(
    controller: &ElevationController<Driver>,
    cmd: &Commands,
    cfg: &ControllerCfg,
    (hold, gap): (Duration, Duration),
    json: bool,
) -> eyre::Result<()> {
    match *cmd {
        Commands::SetElevation { percent } => {
            let target = Percent::try_from(percent)?;
            let plan = controller.plan(target)?;
            let achieved = controller.set_elevation(target)?;
            if json {
                let mut out = plan_json(cmd.name(), &plan);
                out["achieved_percent"] = json!(achieved.get());
                println!("{out}");
            } else {
                println!("elevation set: {achieved} ({})", describe(&plan));
            }
        }
        Commands::SelectPreset { mode } => {
            let achieved = controller.select_preset(mode)?;
            if json {
                println!(
                    "{}",
                    json!({ "command": cmd.name(), "mode": mode, "achieved_percent": achieved.get() })
                );
            } else {
                println!("preset {mode} selected: {achieved}");
            }
        }
        Commands::Plan { percent } => {
            let plan = controller.plan(Percent::try_from(percent)?)?;
            if json {
                println!("{}", plan_json(cmd.name(), &plan));
            } else {
                println!("plan for {}: {}", plan.target, describe(&plan));
            }
        }
        Commands::SelfCheck { walk } => {
            let walked: Vec<&str> = if walk {
                controller
                    .channel_walk(hold, gap)?
                    .into_iter()
                    .map(|c| c.name())
                    .collect()
            } else {
                Vec::new()
            };
            let channels = controller.channels();
            let missing: Vec<&str> = channels.missing().into_iter().map(|c| c.name()).collect();
            let spp = cfg.calibration.seconds_per_percent();
            if json {
                let pins: serde_json::Map<String, serde_json::Value> = channels
                    .named_pins()
                    .into_iter()
                    .map(|(name, pin)| (name, json!(pin)))
                    .collect();
                println!(
                    "{}",
                    json!({
                        "command": cmd.name(),
                        "channels": pins,
                        "missing": missing,
                        "seconds_per_percent": spp,
                        "max_pulse_ms": cfg.max_pulse.map(|d| d.as_millis() as u64),
                        "walked": walked,
                    })
                );
            } else {
                for (channel, pin) in channels.iter() {
                    println!("{:<8} -> BCM {pin}", channel.name());
                }
                if !missing.is_empty() {
                    println!("unmapped: {}", missing.join(", "));
                }
                println!("calibration: {spp:.4} s per point");
                if walk {
                    println!("walked: {}", walked.join(", "));
                }
            }
        }
    }
    Ok(())
}

fn plan_json(command: &str, plan: &ElevationPlan) -> serde_json::Value {
    let pulses: Vec<serde_json::Value> = plan
        .commands
        .iter()
        .map(|c| json!({ "channel": c.channel().name(), "ms": c.duration().as_millis() as u64 }))
        .collect();
    json!({
        "command": command,
        "target_percent": plan.target.get(),
        "mode": plan.anchor.mode.get(),
        "anchor_percent": plan.anchor.percent.get(),
        "residual": plan.residual,
        "pulses": pulses,
        "total_ms": plan.total_duration().as_millis() as u64,
    })
}

fn describe(plan: &ElevationPlan) -> String {
    let mut s = format!(
        "preset {} at {}",
        plan.anchor.mode,
        plan.anchor.percent
    );
    if let Some(p) = plan.directional() {
        s.push_str(&format!(
            ", {} {:.3}s",
            p.direction.channel().name(),
            p.duration.as_secs_f64()
        ));
    }
    s
}
