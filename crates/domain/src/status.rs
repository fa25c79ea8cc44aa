//! Status: outbound facets mirrored to the broker.

use crate::fan::FanState;
use crate::temperature::{Celsius, DEFAULT_DECIMALS, round_to};
use crate::threshold::{PercentPair, ThresholdPair};

/// Logical status topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusTopic {
    /// `ACTIVE | IDLE`, retained.
    Fan,
    PercentOn,
    PercentOff,
    TempOn,
    TempOff,
    /// Smoothed temperature, published by the sampling task.
    Temperature,
    /// `ONLINE | OFFLINE`, retained, also the broker last-will.
    Lwt,
}

impl StatusTopic {
    pub const ALL: [Self; 7] = [
        Self::Fan,
        Self::PercentOn,
        Self::PercentOff,
        Self::TempOn,
        Self::TempOff,
        Self::Temperature,
        Self::Lwt,
    ];

    /// Topic suffix below the status prefix.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Fan => "fan",
            Self::PercentOn => "percent-on",
            Self::PercentOff => "percent-off",
            Self::TempOn => "temp-on",
            Self::TempOff => "temp-off",
            Self::Temperature => "temperature",
            Self::Lwt => "lwt",
        }
    }

    /// Whether messages on this topic are retained by the broker.
    #[must_use]
    pub fn retained(self) -> bool {
        matches!(self, Self::Fan | Self::Lwt)
    }
}

/// Payloads of the last-will topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Online,
    Offline,
}

impl Availability {
    #[must_use]
    pub fn payload(self) -> &'static str {
        match self {
            Self::Online => "ONLINE",
            Self::Offline => "OFFLINE",
        }
    }
}

/// A single message to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub topic: StatusTopic,
    pub payload: String,
}

impl StatusUpdate {
    #[must_use]
    pub fn fan(state: FanState) -> Self {
        Self {
            topic: StatusTopic::Fan,
            payload: state.status_payload().to_string(),
        }
    }

    #[must_use]
    pub fn temperature(value: Celsius) -> Self {
        Self {
            topic: StatusTopic::Temperature,
            payload: format_value(value),
        }
    }

    #[must_use]
    pub fn availability(availability: Availability) -> Self {
        Self {
            topic: StatusTopic::Lwt,
            payload: availability.payload().to_string(),
        }
    }
}

/// Consistent view of the fan state and all four threshold facets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusSnapshot {
    pub fan: FanState,
    pub thresholds: ThresholdPair,
    pub percentages: PercentPair,
}

impl StatusSnapshot {
    /// The four threshold facets.
    #[must_use]
    pub fn threshold_updates(&self) -> Vec<StatusUpdate> {
        vec![
            StatusUpdate {
                topic: StatusTopic::PercentOn,
                payload: format_value(self.percentages.on),
            },
            StatusUpdate {
                topic: StatusTopic::PercentOff,
                payload: format_value(self.percentages.off),
            },
            StatusUpdate {
                topic: StatusTopic::TempOn,
                payload: format_value(self.thresholds.on),
            },
            StatusUpdate {
                topic: StatusTopic::TempOff,
                payload: format_value(self.thresholds.off),
            },
        ]
    }

    /// Fan status followed by the four threshold facets.
    #[must_use]
    pub fn updates(&self) -> Vec<StatusUpdate> {
        let mut updates = Vec::with_capacity(5);
        updates.push(StatusUpdate::fan(self.fan));
        updates.extend(self.threshold_updates());
        updates
    }
}

/// Format a numeric payload with the fixed published precision.
#[must_use]
pub fn format_value(value: f64) -> String {
    round_to(value, DEFAULT_DECIMALS).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> StatusSnapshot {
        StatusSnapshot {
            fan: FanState::On,
            thresholds: ThresholdPair { on: 63.75, off: 56.25 },
            percentages: PercentPair { on: 85.0, off: 75.0 },
        }
    }

    #[test]
    fn should_cover_five_state_topics() {
        let topics: Vec<_> = snapshot().updates().iter().map(|u| u.topic).collect();
        assert_eq!(
            topics,
            vec![
                StatusTopic::Fan,
                StatusTopic::PercentOn,
                StatusTopic::PercentOff,
                StatusTopic::TempOn,
                StatusTopic::TempOff,
            ]
        );
    }

    #[test]
    fn should_format_payloads() {
        let updates = snapshot().updates();
        let payloads: Vec<_> = updates.iter().map(|u| u.payload.as_str()).collect();
        assert_eq!(payloads, vec!["ACTIVE", "85", "75", "63.75", "56.25"]);
    }

    #[test]
    fn should_trim_float_noise() {
        assert_eq!(format_value(94.999_999_999_9), "95");
        assert_eq!(format_value(52.123_456), "52.123");
    }

    #[test]
    fn should_retain_fan_and_lwt_only() {
        let retained: Vec<_> = StatusTopic::ALL.into_iter().filter(|t| t.retained()).collect();
        assert_eq!(retained, vec![StatusTopic::Fan, StatusTopic::Lwt]);
    }

    #[test]
    fn should_build_availability_updates() {
        assert_eq!(StatusUpdate::availability(Availability::Online).payload, "ONLINE");
        assert_eq!(StatusUpdate::availability(Availability::Offline).payload, "OFFLINE");
    }
}
