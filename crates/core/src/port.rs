use std::fmt::{Display, Formatter};

use crate::error::{Error, Result};

/// A TCP port in `1..=65535`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Port(u16);

impl Port {
    #[must_use]
    pub fn get(self) -> u16 {
        self.0
    }
}

impl Display for Port {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl TryFrom<i64> for Port {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        match u16::try_from(value) {
            Ok(port) if port >= 1 => Ok(Self(port)),
            _ => Err(Error::PortOutOfRange(value)),
        }
    }
}

/// Validates user input as a port number.
///
/// # Errors
///
/// [`Error::InvalidPort`] for anything that is not an integer (including blank
/// input), [`Error::PortOutOfRange`] for integers outside `1..=65535`.
///
/// # Examples
///
/// ```
/// use gcp_vm_manager_core::port::parse_port;
///
/// assert_eq!(parse_port(" 8080 ").unwrap().get(), 8080);
/// assert!(parse_port("0").is_err());
/// assert!(parse_port("abc").is_err());
/// ```
pub fn parse_port(input: &str) -> Result<Port> {
    let trimmed = input.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| Error::InvalidPort(trimmed.to_string()))?;

    Port::try_from(value)
}
