//! Configuration-time errors.
//!
//! Everything here is raised before the first transfer is armed. Once the
//! bus is running nothing in this crate fails: a stalled FIFO just stops
//! completion interrupts from arriving, and a swap without pending data is a
//! no-op.

use core::fmt;

/// Problems with a [`TdmConfig`](crate::config::TdmConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// GPIO number outside `0..GPIO_COUNT`.
    PinOutOfRange(u8),
    /// The same GPIO is assigned to two signals.
    PinConflict(u8),
    /// FS must sit directly above BCLK, both are driven by side-set.
    SideSetNotAdjacent,
    /// A clock divisor of zero.
    ZeroClockDivisor,
    /// Slots per frame outside `1..=32`.
    SlotCount(u8),
    /// DMA block length does not match one frame.
    BlockLength { expected: usize, actual: usize },
}

/// Errors raised while bringing up the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Every DMA channel is already claimed.
    NoFreeChannel,
    /// The requested DMA channel is already claimed.
    ChannelInUse(u8),
    /// No such DMA channel.
    InvalidChannel(u8),
    /// PIO instruction memory could not hold the program.
    ProgramInstall,
    /// The TX FIFO refused the frame counter word.
    FifoFull,
    /// Crystal oscillator, PLL or clock mux did not come up.
    ClockInit,
    /// Invalid static configuration.
    Config(ConfigError),
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::PinOutOfRange(pin) => write!(f, "GPIO{pin} does not exist"),
            ConfigError::PinConflict(pin) => write!(f, "GPIO{pin} assigned twice"),
            ConfigError::SideSetNotAdjacent => f.write_str("FS pin must be BCLK + 1"),
            ConfigError::ZeroClockDivisor => f.write_str("clock divisor is zero"),
            ConfigError::SlotCount(n) => write!(f, "{n} slots per frame, expected 1..=32"),
            ConfigError::BlockLength { expected, actual } => {
                write!(f, "block length {actual}, frame needs {expected} words")
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoFreeChannel => f.write_str("no unclaimed DMA channel"),
            Error::ChannelInUse(id) => write!(f, "DMA channel {id} already claimed"),
            Error::InvalidChannel(id) => write!(f, "DMA channel {id} does not exist"),
            Error::ProgramInstall => f.write_str("PIO program does not fit"),
            Error::FifoFull => f.write_str("TX FIFO full"),
            Error::ClockInit => f.write_str("clock setup failed"),
            Error::Config(err) => write!(f, "invalid configuration: {err}"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl core::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts() {
        let err: Error = ConfigError::ZeroClockDivisor.into();
        assert_eq!(err, Error::Config(ConfigError::ZeroClockDivisor));
    }

    #[test]
    fn display_names_the_resource() {
        assert_eq!(Error::ChannelInUse(3).to_string(), "DMA channel 3 already claimed");
        assert_eq!(
            Error::Config(ConfigError::BlockLength { expected: 8, actual: 4 }).to_string(),
            "invalid configuration: block length 4, frame needs 8 words"
        );
    }
}
