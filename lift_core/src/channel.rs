//! Logical output channels and their pin bindings.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::anchor::PresetMode;
use crate::error::ElevationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn channel(self) -> Channel {
        match self {
            Direction::Up => Channel::Up,
            Direction::Down => Channel::Down,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    Preset(PresetMode),
    Up,
    Down,
}

const PRESET_NAMES: [&str; 4] = ["preset1", "preset2", "preset3", "preset4"];

impl Channel {
    /// Every channel, presets first.
    pub const ALL: [Channel; 6] = [
        Channel::Preset(PresetMode::ALL[0]),
        Channel::Preset(PresetMode::ALL[1]),
        Channel::Preset(PresetMode::ALL[2]),
        Channel::Preset(PresetMode::ALL[3]),
        Channel::Up,
        Channel::Down,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Channel::Preset(mode) => PRESET_NAMES[mode.index()],
            Channel::Up => "up",
            Channel::Down => "down",
        }
    }

    pub fn parse(name: &str) -> Option<Channel> {
        Channel::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelMapError {
    #[error("unknown channel name {0:?}")]
    UnknownName(String),
    #[error("channels {first} and {second} share pin {pin}")]
    DuplicatePin {
        pin: u8,
        first: Channel,
        second: Channel,
    },
}

/// One-to-one binding of channels to physical output pins. Channels may be
/// absent; using an absent channel is a configuration error at call time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelMap {
    pins: BTreeMap<Channel, u8>,
}

impl ChannelMap {
    pub fn new(entries: impl IntoIterator<Item = (Channel, u8)>) -> Result<Self, ChannelMapError> {
        let mut map = Self::default();
        for (channel, pin) in entries {
            map.insert(channel, pin)?;
        }
        Ok(map)
    }

    /// Build from `name = pin` pairs as they appear in config.
    pub fn from_names<'a>(
        entries: impl IntoIterator<Item = (&'a str, u8)>,
    ) -> Result<Self, ChannelMapError> {
        let mut map = Self::default();
        for (name, pin) in entries {
            let channel =
                Channel::parse(name).ok_or_else(|| ChannelMapError::UnknownName(name.to_string()))?;
            map.insert(channel, pin)?;
        }
        Ok(map)
    }

    fn insert(&mut self, channel: Channel, pin: u8) -> Result<(), ChannelMapError> {
        if let Some((&first, _)) = self
            .pins
            .iter()
            .find(|&(&c, &p)| p == pin && c != channel)
        {
            return Err(ChannelMapError::DuplicatePin {
                pin,
                first,
                second: channel,
            });
        }
        self.pins.insert(channel, pin);
        Ok(())
    }

    /// Drop a binding, returning its pin.
    pub fn remove(&mut self, channel: Channel) -> Option<u8> {
        self.pins.remove(&channel)
    }

    pub fn pin(&self, channel: Channel) -> Option<u8> {
        self.pins.get(&channel).copied()
    }

    pub fn require(&self, channel: Channel) -> Result<u8, ElevationError> {
        self.pin(channel)
            .ok_or_else(|| ElevationError::MissingChannel(channel.name().to_string()))
    }

    pub fn contains(&self, channel: Channel) -> bool {
        self.pins.contains_key(&channel)
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, u8)> + '_ {
        self.pins.iter().map(|(&c, &p)| (c, p))
    }

    /// Known channels with no binding.
    pub fn missing(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|c| !self.contains(*c))
            .collect()
    }

    /// `(name, pin)` pairs for driver construction.
    pub fn named_pins(&self) -> Vec<(String, u8)> {
        self.iter().map(|(c, p)| (c.name().to_string(), p)).collect()
    }
}
