//! Elevation controller: plans one request, then fires it under the rig lock.
//!
//! A request walks `Start -> Snapped -> Adjusted -> Done`; on-anchor targets
//! skip `Adjusted`. The whole walk happens while holding the rig mutex, so
//! callers sharing one controller never interleave pulses.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use lift_traits::OutputDriver;
use lift_traits::clock::Clock;
use tracing::{debug, error, info, warn};

use crate::actuator::{DirectionalActuator, PresetActuator};
use crate::anchor::{Anchor, Percent, PresetMode, resolve};
use crate::builder::ControllerBuilder;
use crate::channel::{Channel, ChannelMap};
use crate::command::{ActuationCommand, ElevationPlan};
use crate::error::{DriverFault, ElevationError, Result};
use crate::estimate::DurationEstimator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElevationPhase {
    Start,
    Snapped,
    Adjusted,
    Done,
}

/// Drives one physical rig. Share it across threads with `Arc`.
pub struct ElevationController<D> {
    pub(crate) rig: Mutex<D>,
    pub(crate) channels: ChannelMap,
    pub(crate) preset: PresetActuator,
    pub(crate) estimator: DurationEstimator,
    pub(crate) directional: DirectionalActuator,
    pub(crate) max_pulse: Option<Duration>,
    pub(crate) cancel: Option<Arc<AtomicBool>>,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
}

impl<D> core::fmt::Debug for ElevationController<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ElevationController")
            .field("channels", &self.channels)
            .field("preset_press", &self.preset.press())
            .field(
                "seconds_per_percent",
                &self.estimator.calibration().seconds_per_percent(),
            )
            .field("max_pulse", &self.max_pulse)
            .finish()
    }
}

fn enter(phase: &mut ElevationPhase, next: ElevationPhase, target: Percent) {
    debug!(from = ?*phase, to = ?next, target = target.get(), "phase");
    *phase = next;
}

impl<D: OutputDriver> ElevationController<D> {
    pub fn builder() -> ControllerBuilder<D> {
        ControllerBuilder::default()
    }

    pub fn channels(&self) -> &ChannelMap {
        &self.channels
    }

    /// Compute and validate what `set_elevation(target)` would do, without
    /// touching any output.
    pub fn plan(&self, target: Percent) -> Result<ElevationPlan> {
        let (anchor, residual) = match Anchor::exact(target) {
            Some(anchor) => (anchor, 0),
            None => {
                let anchor = resolve(target);
                (anchor, anchor.residual_to(target))
            }
        };
        let mut commands = vec![self.preset.command(anchor)];
        commands.extend(
            self.estimator
                .estimate(residual)
                .map(ActuationCommand::from),
        );
        self.preflight(&commands)?;
        Ok(ElevationPlan {
            target,
            anchor,
            residual,
            commands,
        })
    }

    /// Every channel mapped and every directional pulse under the ceiling,
    /// or nothing fires.
    fn preflight(&self, commands: &[ActuationCommand]) -> Result<()> {
        for cmd in commands {
            let channel = cmd.channel();
            self.channels.require(channel)?;
            if let (ActuationCommand::DirectionalPulse { duration, .. }, Some(ceiling)) =
                (cmd, self.max_pulse)
                && *duration > ceiling
            {
                return Err(ElevationError::PulseCeiling {
                    channel: channel.name().to_string(),
                    requested: *duration,
                    ceiling,
                });
            }
        }
        Ok(())
    }

    /// Move to `target` via its nearest preset plus a timed nudge. Returns
    /// the commanded height; nothing measures the real one.
    pub fn set_elevation(&self, target: Percent) -> Result<Percent> {
        let mut phase = ElevationPhase::Start;
        debug!(?phase, target = target.get(), "elevation request");

        let plan = self.plan(target)?;
        let total = plan.commands.len();
        let mut rig = self.lock_rig()?;

        self.check_cancel(0, total)?;
        self.preset.fire(&mut *rig, &self.channels, plan.anchor)?;
        enter(&mut phase, ElevationPhase::Snapped, target);
        debug!(
            mode = plan.anchor.mode.get(),
            anchor_percent = plan.anchor.percent.get(),
            residual = plan.residual,
            "snapped"
        );

        if let Some(pulse) = plan.directional() {
            self.check_cancel(1, total)?;
            if let Err(e) = self.directional.fire(&mut *rig, &self.channels, Some(pulse)) {
                error!(
                    error = %e,
                    mode = plan.anchor.mode.get(),
                    "directional pulse failed after preset fired"
                );
                return Err(e);
            }
            enter(&mut phase, ElevationPhase::Adjusted, target);
        }
        enter(&mut phase, ElevationPhase::Done, target);

        info!(
            target = target.get(),
            mode = plan.anchor.mode.get(),
            residual = plan.residual,
            total_ms = plan.total_duration().as_millis() as u64,
            "elevation set"
        );
        Ok(target)
    }

    /// Press memory button `mode` (1..=4). Returns that preset's height.
    pub fn select_preset(&self, mode: i64) -> Result<Percent> {
        let mode = PresetMode::try_from(mode)?;
        let anchor = Anchor::for_mode(mode);
        self.preflight(&[self.preset.command(anchor)])?;

        let mut rig = self.lock_rig()?;
        self.check_cancel(0, 1)?;
        self.preset.fire(&mut *rig, &self.channels, anchor)?;
        info!(
            mode = mode.get(),
            percent = anchor.percent.get(),
            "preset selected"
        );
        Ok(anchor.percent)
    }

    /// Wiring self-test: pulse every mapped channel for `hold`, pausing `gap`
    /// between them. Returns the channels exercised, in order.
    pub fn channel_walk(&self, hold: Duration, gap: Duration) -> Result<Vec<Channel>> {
        let mapped: Vec<Channel> = Channel::ALL
            .into_iter()
            .filter(|c| self.channels.contains(*c))
            .collect();
        let mut rig = self.lock_rig()?;
        for (i, channel) in mapped.iter().enumerate() {
            self.check_cancel(i, mapped.len())?;
            info!(
                channel = channel.name(),
                pin = self.channels.pin(*channel),
                "walk"
            );
            rig.pulse(channel.name(), hold)?;
            if i + 1 < mapped.len() {
                self.clock.sleep(gap);
            }
        }
        Ok(mapped)
    }

    /// De-assert every output, e.g. on shutdown.
    pub fn release_all(&self) -> Result<()> {
        let mut rig = self.lock_rig()?;
        rig.release_all()?;
        Ok(())
    }

    fn check_cancel(&self, completed: usize, total: usize) -> Result<()> {
        if self
            .cancel
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
        {
            warn!(completed, total, "operation cancelled");
            return Err(ElevationError::Cancelled { completed, total });
        }
        Ok(())
    }

    fn lock_rig(&self) -> Result<MutexGuard<'_, D>> {
        match self.rig.lock() {
            Ok(guard) => Ok(guard),
            Err(poisoned) => {
                // A panic mid-pulse may have left an output asserted.
                let mut guard = poisoned.into_inner();
                let released = guard.release_all();
                drop(guard);
                match released {
                    Ok(()) => {
                        self.rig.clear_poison();
                        error!("previous operation panicked; outputs released");
                    }
                    Err(e) => error!(error = %e, "previous operation panicked; release failed"),
                }
                Err(ElevationError::Driver(DriverFault::Unavailable(
                    "previous operation panicked mid-pulse".into(),
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControllerCfg;
    use crate::estimate::CalibrationConstant;
    use crate::mocks::RecordingDriver;

    fn controller(drv: RecordingDriver) -> ElevationController<RecordingDriver> {
        ElevationController::builder()
            .with_driver(drv)
            .with_channels(
                ChannelMap::new(Channel::ALL.into_iter().zip([17, 6, 13, 5, 26, 27])).unwrap(),
            )
            .with_config(ControllerCfg {
                calibration: CalibrationConstant::new(0.1).unwrap(),
                ..ControllerCfg::default()
            })
            .build()
            .unwrap()
    }

    #[test]
    fn plan_for_on_anchor_target_has_single_command() {
        let c = controller(RecordingDriver::new());
        let plan = c.plan(Percent::new(66).unwrap()).unwrap();
        assert_eq!(plan.anchor.mode.get(), 3);
        assert_eq!(plan.residual, 0);
        assert_eq!(plan.commands.len(), 1);
        assert_eq!(plan.directional(), None);
    }

    #[test]
    fn plan_does_not_actuate() {
        let drv = RecordingDriver::new();
        let c = controller(drv.clone());
        let plan = c.plan(Percent::new(40).unwrap()).unwrap();
        assert_eq!(plan.residual, 7);
        let total_ms = plan.total_duration().as_secs_f64() * 1000.0;
        assert!((total_ms - 825.0).abs() < 1e-3, "total {total_ms}ms");
        assert!(drv.events().is_empty());
    }

    #[test]
    fn poisoned_rig_releases_outputs_then_recovers() {
        let drv = RecordingDriver::new();
        let c = Arc::new(controller(drv.clone()));
        let c2 = Arc::clone(&c);
        let _ = std::thread::spawn(move || {
            let _guard = c2.rig.lock().unwrap();
            panic!("simulated crash mid-pulse");
        })
        .join();

        let err = c.set_elevation(Percent::new(33).unwrap()).unwrap_err();
        assert!(matches!(err, ElevationError::Driver(DriverFault::Unavailable(_))));
        assert_eq!(drv.events(), vec![crate::mocks::DriverEvent::ReleaseAll]);

        assert_eq!(c.set_elevation(Percent::new(33).unwrap()).unwrap().get(), 33);
    }
}
