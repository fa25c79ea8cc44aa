//! Hysteresis decision: maps a smoothed temperature to the desired fan state.

use crate::fan::FanState;
use crate::temperature::Celsius;
use crate::threshold::ThresholdPair;

/// Decide the desired fan state.
///
/// The fan is switched on once `temperature` reaches `thresholds.on` and
/// switched off once it falls to `thresholds.off`. Between the two the
/// current state is kept (dead-band).
#[must_use]
pub fn decide(temperature: Celsius, thresholds: ThresholdPair, current: FanState) -> FanState {
    match current {
        FanState::Off if temperature >= thresholds.on => FanState::On,
        FanState::On if temperature <= thresholds.off => FanState::Off,
        unchanged => unchanged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIR: ThresholdPair = ThresholdPair { on: 80.0, off: 60.0 };

    #[test]
    fn should_follow_expected_sequence() {
        let temperatures = [50.0, 75.0, 81.0, 70.0, 59.0, 61.0];
        let expected = [
            FanState::Off,
            FanState::Off,
            FanState::On,
            FanState::On,
            FanState::Off,
            FanState::Off,
        ];
        let mut state = FanState::Off;
        for (temperature, want) in temperatures.into_iter().zip(expected) {
            state = decide(temperature, PAIR, state);
            assert_eq!(state, want, "at {temperature}");
        }
    }

    #[test]
    fn should_switch_on_at_threshold() {
        assert_eq!(decide(80.0, PAIR, FanState::Off), FanState::On);
    }

    #[test]
    fn should_switch_off_at_threshold() {
        assert_eq!(decide(60.0, PAIR, FanState::On), FanState::Off);
    }

    #[test]
    fn should_hold_state_inside_dead_band() {
        assert_eq!(decide(70.0, PAIR, FanState::On), FanState::On);
        assert_eq!(decide(70.0, PAIR, FanState::Off), FanState::Off);
    }

    #[test]
    fn should_be_stable_at_fixed_temperature() {
        for temperature in [40.0, 60.0, 70.0, 80.0, 95.0] {
            for start in [FanState::On, FanState::Off] {
                let first = decide(temperature, PAIR, start);
                let second = decide(temperature, PAIR, first);
                assert_eq!(first, second, "flipped twice at {temperature}");
            }
        }
    }
}
