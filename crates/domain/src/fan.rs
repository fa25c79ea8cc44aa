//! Fan state: the binary state of the cooling actuator.

/// Whether the fan is energized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanState {
    On,
    #[default]
    Off,
}

impl FanState {
    #[must_use]
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    /// The opposite state.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }

    /// Payload published on the fan status topic.
    #[must_use]
    pub fn status_payload(self) -> &'static str {
        match self {
            Self::On => "ACTIVE",
            Self::Off => "IDLE",
        }
    }
}

impl From<bool> for FanState {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

impl std::fmt::Display for FanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
        }
    }
}
