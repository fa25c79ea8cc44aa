//! Sysfs adapter error types.

use std::path::PathBuf;

use fancontrol_domain::error::FanControlError;

/// Errors specific to the sysfs adapters.
#[derive(Debug, thiserror::Error)]
pub enum SysfsError {
    /// Reading or writing a sysfs attribute failed.
    #[error("sysfs access to {} failed", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An attribute held something other than the expected value.
    #[error("unexpected value {value:?} in {}", path.display())]
    Parse { path: PathBuf, value: String },
}

impl SysfsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Convert into a [`FanControlError::Hardware`] for propagation across
    /// port boundaries.
    #[must_use]
    pub fn into_domain(self) -> FanControlError {
        FanControlError::Hardware(Box::new(self))
    }
}

impl From<SysfsError> for FanControlError {
    fn from(err: SysfsError) -> Self {
        err.into_domain()
    }
}
