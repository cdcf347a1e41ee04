#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Open-loop elevation control (hardware-agnostic).
//!
//! The lift has no position sensor. A target height is reached by pressing
//! the nearest of four memory presets, then holding `up` or `down` for a
//! time proportional to the remaining distance. All output goes through
//! `lift_traits::OutputDriver`.
//!
//! ## Architecture
//!
//! - **Anchors**: fixed preset heights and nearest-anchor resolution (`anchor`)
//! - **Channels**: logical outputs and their pin bindings (`channel`)
//! - **Estimation**: residual points to pulse length (`estimate`)
//! - **Actuation**: preset and directional actuators (`actuator`)
//! - **Control**: per-rig serialized orchestration (`controller`)
//!
//! Heights are whole percentage points (`Percent`); pulse lengths are
//! `std::time::Duration`.

pub mod actuator;
pub mod anchor;
pub mod builder;
pub mod channel;
pub mod command;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod error;
pub mod estimate;
pub mod hw_error;
pub mod mocks;

pub use actuator::{DirectionalActuator, PresetActuator};
pub use anchor::{ANCHORS, Anchor, Percent, PresetMode, resolve};
pub use builder::ControllerBuilder;
pub use channel::{Channel, ChannelMap, ChannelMapError, Direction};
pub use command::{ActuationCommand, ElevationPlan};
pub use config::ControllerCfg;
pub use controller::{ElevationController, ElevationPhase};
pub use error::{BuildError, DriverFault, ElevationError, ErrorClass, Result};
pub use estimate::{CalibrationConstant, DirectionalPulse, DurationEstimator};
