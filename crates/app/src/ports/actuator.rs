//! Actuator port: the binary fan output.

use fancontrol_domain::error::FanControlError;
use fancontrol_domain::fan::FanState;

/// Binary digital output driving the fan.
///
/// Calls are synchronous: they are made while the control state is locked
/// so that writes are serialized with every other state change.
pub trait Actuator: Send {
    /// Drive the output. Writing the current state again must be harmless.
    ///
    /// # Errors
    ///
    /// Returns [`FanControlError::Hardware`] when the output cannot be driven.
    fn write(&mut self, state: FanState) -> Result<(), FanControlError>;

    /// Read back the current output state.
    ///
    /// # Errors
    ///
    /// Returns [`FanControlError::Hardware`] when the output cannot be read.
    fn read(&self) -> Result<FanState, FanControlError>;
}
