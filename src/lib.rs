#[cfg(test)]
#[macro_use]
extern crate assert_matches;
#[macro_use]
extern crate log;

pub mod core;

#[cfg(target_os = "linux")]
pub mod linux;

use crate::core::dev::Error as DevError;

#[derive(Debug)]
pub enum Error {
    /// Indicates an error where a buffer, pool, ring, etc. is full or empty.
    Exhausted,
    /// Indicates an error where a packet or frame is malformed.
    Malformed,
    /// Indicates an unrecoverable device error.
    Device(DevError),
}

impl From<DevError> for Error {
    fn from(err: DevError) -> Self {
        Error::Device(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
