//! Fixed preset anchors and nearest-anchor resolution.

use std::fmt;

use crate::error::ElevationError;

/// Lift height in whole percentage points, always within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percent(u8);

impl Percent {
    pub const MIN: Percent = Percent(0);
    pub const MAX: Percent = Percent(100);

    pub const fn new(value: u8) -> Option<Self> {
        if value <= 100 { Some(Self(value)) } else { None }
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Percent {
    type Error = ElevationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(Percent::new)
            .ok_or(ElevationError::InvalidTarget(value))
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Memory button number, always within 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PresetMode(u8);

impl PresetMode {
    pub const ALL: [PresetMode; 4] = [PresetMode(1), PresetMode(2), PresetMode(3), PresetMode(4)];

    pub const fn new(value: u8) -> Option<Self> {
        if matches!(value, 1..=4) { Some(Self(value)) } else { None }
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Zero-based position in [`ANCHORS`].
    #[inline]
    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl TryFrom<i64> for PresetMode {
    type Error = ElevationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(PresetMode::new)
            .ok_or(ElevationError::InvalidMode(value))
    }
}

impl fmt::Display for PresetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A preset button paired with the height the lift recalls for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub mode: PresetMode,
    pub percent: Percent,
}

/// The four memorized heights, ascending by percent.
pub const ANCHORS: [Anchor; 4] = [
    Anchor {
        mode: PresetMode(1),
        percent: Percent(0),
    },
    Anchor {
        mode: PresetMode(2),
        percent: Percent(33),
    },
    Anchor {
        mode: PresetMode(3),
        percent: Percent(66),
    },
    Anchor {
        mode: PresetMode(4),
        percent: Percent(100),
    },
];

impl Anchor {
    /// The anchor sitting exactly at `target`, if any.
    pub fn exact(target: Percent) -> Option<Anchor> {
        ANCHORS.iter().copied().find(|a| a.percent == target)
    }

    pub fn for_mode(mode: PresetMode) -> Anchor {
        ANCHORS[mode.index()]
    }

    /// Signed distance from this anchor's height to `target`, in points.
    /// Measured against the anchor's percent, never its mode number.
    #[inline]
    pub fn residual_to(self, target: Percent) -> i16 {
        i16::from(target.get()) - i16::from(self.percent.get())
    }
}

/// Nearest anchor to `target`. Exact ties go to the lower anchor
/// (16 -> 0 %, 83 -> 66 %).
pub fn resolve(target: Percent) -> Anchor {
    let mut best = ANCHORS[0];
    let mut best_dist = best.percent.get().abs_diff(target.get());
    for anchor in &ANCHORS[1..] {
        let dist = anchor.percent.get().abs_diff(target.get());
        if dist < best_dist {
            best = *anchor;
            best_dist = dist;
        }
    }
    best
}
