//! Actuation commands and the per-request plan built from them.

use std::time::Duration;

use crate::anchor::{Anchor, Percent, PresetMode};
use crate::channel::{Channel, Direction};
use crate::estimate::DirectionalPulse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuationCommand {
    PresetPulse {
        mode: PresetMode,
        duration: Duration,
    },
    DirectionalPulse {
        direction: Direction,
        duration: Duration,
    },
}

impl ActuationCommand {
    pub fn channel(&self) -> Channel {
        match *self {
            Self::PresetPulse { mode, .. } => Channel::Preset(mode),
            Self::DirectionalPulse { direction, .. } => direction.channel(),
        }
    }

    pub fn duration(&self) -> Duration {
        match *self {
            Self::PresetPulse { duration, .. } | Self::DirectionalPulse { duration, .. } => {
                duration
            }
        }
    }
}

impl From<DirectionalPulse> for ActuationCommand {
    fn from(p: DirectionalPulse) -> Self {
        Self::DirectionalPulse {
            direction: p.direction,
            duration: p.duration,
        }
    }
}

/// Everything one elevation request will do, computed before any output
/// moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElevationPlan {
    pub target: Percent,
    pub anchor: Anchor,
    /// `target - anchor.percent`.
    pub residual: i16,
    pub commands: Vec<ActuationCommand>,
}

impl ElevationPlan {
    /// The trailing directional pulse, if the target is off-anchor.
    pub fn directional(&self) -> Option<DirectionalPulse> {
        self.commands.iter().find_map(|c| match *c {
            ActuationCommand::DirectionalPulse {
                direction,
                duration,
            } => Some(DirectionalPulse {
                direction,
                duration,
            }),
            ActuationCommand::PresetPulse { .. } => None,
        })
    }

    /// Sum of all pulse durations, saturating at `Duration::MAX`.
    pub fn total_duration(&self) -> Duration {
        self.commands
            .iter()
            .map(ActuationCommand::duration)
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}
