//! Maps `Box<dyn Error>` from the driver boundary to a typed `DriverFault`.
//!
//! `OutputDriver` returns `Box<dyn Error + Send + Sync>` so any backend can
//! plug in; this module recovers the typed fault, downcasting
//! `lift_hardware::HwError` when that feature is enabled.

use crate::error::{DriverFault, ElevationError};

/// Map a driver-boundary error to a typed `DriverFault`.
///
/// Known hardware error types are downcast first, then the message is
/// inspected.
pub fn map_driver_error(e: &(dyn std::error::Error + 'static)) -> DriverFault {
    #[cfg(feature = "hardware-errors")]
    {
        use lift_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::UnknownChannel(c) => DriverFault::UnknownChannel(c.clone()),
                HwError::Unavailable(why) => DriverFault::Unavailable(why.clone()),
                other => DriverFault::Other(other.to_string()),
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    let lower = s.to_lowercase();
    if let Some(rest) = lower.strip_prefix("unknown channel") {
        DriverFault::UnknownChannel(rest.trim_start_matches([':', ' ']).to_string())
    } else if lower.contains("unavailable") || lower.contains("not initialized") {
        DriverFault::Unavailable(s)
    } else {
        DriverFault::Other(s)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for ElevationError {
    fn from(e: Box<dyn std::error::Error + Send + Sync>) -> Self {
        ElevationError::Driver(map_driver_error(&*e))
    }
}
