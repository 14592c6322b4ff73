//! Static bus configuration and clock arithmetic.
//!
//! The bus is configured once at startup and never changed while running.
//! [`TdmConfig::DEFAULT`] reproduces the reference board wiring:
//!
//! | Signal | GPIO | Driven by |
//! |--------|------|-----------|
//! | BCLK | 11 | `tdm` side-set bit 0 |
//! | FS | 12 | `tdm` side-set bit 1 |
//! | DATA_OUT | 13 | `tdm` OUT pin |
//! | DATA_IN | 14 | `tdm` IN pin |
//! | MCLK | 15 | `tdm_mclk` side-set |
//!
//! With a 128 MHz system clock and a divisor of 16 both state machines run at
//! 8 MHz. Four PIO cycles per bit give a 2 MHz bit clock, and an 8-slot frame
//! of 32-bit words gives 7812.5 frames per second.

use crate::constants::{
    DEFAULT_SYS_CLOCK_HZ, GPIO_COUNT, PIO_CYCLES_PER_BIT, PIO_CYCLES_PER_MCLK, SAMPLE_BUF_SIZE,
    WORD_BITS,
};
use crate::error::ConfigError;

/// What happens to the pending-swap guard after each re-arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwapPolicy {
    /// Re-raise the guard after every re-arm: every completion swaps once.
    #[default]
    EveryCompletion,
    /// Raise the guard only at construction: only the first completion swaps
    /// and later blocks overwrite the same slot.
    StartupOnly,
}

/// GPIO assignment of the five bus signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinMap {
    pub bclk: u8,
    /// Must be `bclk + 1`.
    pub fs: u8,
    pub data_out: u8,
    pub data_in: u8,
    pub mclk: u8,
}

impl PinMap {
    /// Reference board wiring, GPIO 11 to 15.
    pub const DEFAULT: PinMap = PinMap {
        bclk: 11,
        fs: 12,
        data_out: 13,
        data_in: 14,
        mclk: 15,
    };

    fn as_array(&self) -> [u8; 5] {
        [self.bclk, self.fs, self.data_out, self.data_in, self.mclk]
    }
}

/// Complete static configuration of the TDM bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TdmConfig {
    pub pins: PinMap,
    /// System clock feeding both PIO state machines.
    pub sys_clock_hz: u32,
    /// Integer part of the PIO clock divisor.
    pub clock_divisor: u16,
    /// Fractional part of the PIO clock divisor, in 1/256ths.
    pub clock_divisor_frac: u8,
    /// TDM slots per frame. Each slot is one 32-bit word.
    pub slots_per_frame: u8,
    pub swap_policy: SwapPolicy,
}

impl TdmConfig {
    /// Reference board: 128 MHz, divisor 16, 8 slots.
    pub const DEFAULT: TdmConfig = TdmConfig {
        pins: PinMap::DEFAULT,
        sys_clock_hz: DEFAULT_SYS_CLOCK_HZ,
        clock_divisor: 16,
        clock_divisor_frac: 0,
        slots_per_frame: SAMPLE_BUF_SIZE as u8,
        swap_policy: SwapPolicy::EveryCompletion,
    };

    /// Check pins, divisor and slot count.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pins = self.pins.as_array();
        for (i, &pin) in pins.iter().enumerate() {
            if pin >= GPIO_COUNT {
                return Err(ConfigError::PinOutOfRange(pin));
            }
            if pins[..i].contains(&pin) {
                return Err(ConfigError::PinConflict(pin));
            }
        }
        if self.pins.fs != self.pins.bclk + 1 {
            return Err(ConfigError::SideSetNotAdjacent);
        }
        if self.clock_divisor == 0 {
            return Err(ConfigError::ZeroClockDivisor);
        }
        if self.slots_per_frame == 0 || self.slots_per_frame > 32 {
            return Err(ConfigError::SlotCount(self.slots_per_frame));
        }
        Ok(())
    }

    /// [`validate`](Self::validate), plus a check that a block of `N` words
    /// holds exactly one frame.
    pub fn validate_for<const N: usize>(&self) -> Result<(), ConfigError> {
        self.validate()?;
        let expected = self.slots_per_frame as usize;
        if N != expected {
            return Err(ConfigError::BlockLength { expected, actual: N });
        }
        Ok(())
    }

    /// PIO state machine clock after the fractional divider.
    pub fn pio_clock_hz(&self) -> u32 {
        let divisor = u64::from(self.clock_divisor) * 256 + u64::from(self.clock_divisor_frac);
        (u64::from(self.sys_clock_hz) * 256 / divisor.max(1)) as u32
    }

    /// BCLK frequency.
    pub fn bit_clock_hz(&self) -> u32 {
        self.pio_clock_hz() / PIO_CYCLES_PER_BIT
    }

    /// MCLK frequency.
    pub fn mclk_hz(&self) -> u32 {
        self.pio_clock_hz() / PIO_CYCLES_PER_MCLK
    }

    /// Bits per frame on the serial line.
    pub fn frame_bits(&self) -> u32 {
        u32::from(self.slots_per_frame) * WORD_BITS
    }

    /// Loop count the `tdm` program pulls before its first frame.
    ///
    /// The program sends one bit before entering its loop, and `jmp x--`
    /// runs `x + 1` iterations, hence `frame_bits - 2`. Zero for a config
    /// with no slots, which [`validate`](Self::validate) rejects.
    pub fn frame_counter(&self) -> u32 {
        self.frame_bits().saturating_sub(2)
    }

    /// Frame (sample) rate in millihertz, exact for the default clocks.
    /// Zero if there are no slots.
    pub fn frame_rate_millihertz(&self) -> u64 {
        (u64::from(self.bit_clock_hz()) * 1000)
            .checked_div(u64::from(self.frame_bits()))
            .unwrap_or(0)
    }

    /// Time one DMA block takes on the wire, in microseconds. The
    /// application must finish with a slot within this window. Zero if
    /// the bit clock is stopped.
    pub fn block_period_us(&self) -> u32 {
        (u64::from(self.frame_bits()) * 1_000_000)
            .checked_div(u64::from(self.bit_clock_hz()))
            .unwrap_or(0) as u32
    }
}

impl Default for TdmConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(TdmConfig::DEFAULT.validate(), Ok(()));
        assert_eq!(TdmConfig::DEFAULT.validate_for::<SAMPLE_BUF_SIZE>(), Ok(()));
    }

    #[test]
    fn default_clock_tree() {
        let cfg = TdmConfig::DEFAULT;
        assert_eq!(cfg.pio_clock_hz(), 8_000_000);
        assert_eq!(cfg.bit_clock_hz(), 2_000_000);
        assert_eq!(cfg.mclk_hz(), 2_000_000);
        assert_eq!(cfg.frame_bits(), 256);
        assert_eq!(cfg.frame_counter(), 254);
        assert_eq!(cfg.frame_rate_millihertz(), 7_812_500);
        assert_eq!(cfg.block_period_us(), 128);
    }

    #[test]
    fn fractional_divisor() {
        let cfg = TdmConfig {
            clock_divisor: 2,
            clock_divisor_frac: 128, // 2.5
            sys_clock_hz: 125_000_000,
            ..TdmConfig::DEFAULT
        };
        assert_eq!(cfg.pio_clock_hz(), 50_000_000);
    }

    #[test]
    fn rejects_missing_gpio() {
        let mut cfg = TdmConfig::DEFAULT;
        cfg.pins.mclk = 30;
        assert_eq!(cfg.validate(), Err(ConfigError::PinOutOfRange(30)));
    }

    #[test]
    fn rejects_shared_pin() {
        let mut cfg = TdmConfig::DEFAULT;
        cfg.pins.mclk = cfg.pins.data_in;
        assert_eq!(cfg.validate(), Err(ConfigError::PinConflict(14)));
    }

    #[test]
    fn rejects_split_side_set() {
        let mut cfg = TdmConfig::DEFAULT;
        cfg.pins.fs = 20;
        assert_eq!(cfg.validate(), Err(ConfigError::SideSetNotAdjacent));
    }

    #[test]
    fn rejects_zero_divisor_and_bad_slots() {
        let cfg = TdmConfig {
            clock_divisor: 0,
            ..TdmConfig::DEFAULT
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroClockDivisor));

        let cfg = TdmConfig {
            slots_per_frame: 33,
            ..TdmConfig::DEFAULT
        };
        assert_eq!(cfg.validate(), Err(ConfigError::SlotCount(33)));
    }

    #[test]
    fn block_must_hold_one_frame() {
        assert_eq!(
            TdmConfig::DEFAULT.validate_for::<4>(),
            Err(ConfigError::BlockLength { expected: 8, actual: 4 })
        );
    }

    #[test]
    fn unvalidated_zero_slots_does_not_panic() {
        let cfg = TdmConfig {
            slots_per_frame: 0,
            ..TdmConfig::DEFAULT
        };
        assert_eq!(cfg.validate(), Err(ConfigError::SlotCount(0)));
        assert_eq!(cfg.frame_bits(), 0);
        assert_eq!(cfg.frame_counter(), 0);
        assert_eq!(cfg.frame_rate_millihertz(), 0);
        assert_eq!(cfg.block_period_us(), 0);
    }

    #[test]
    fn slowest_clock_keeps_block_period_finite() {
        // 1 Hz system clock, largest divisor: the bit clock rounds to zero.
        let cfg = TdmConfig {
            sys_clock_hz: 1,
            clock_divisor: u16::MAX,
            ..TdmConfig::DEFAULT
        };
        assert_eq!(cfg.bit_clock_hz(), 0);
        assert_eq!(cfg.block_period_us(), 0);
        assert_eq!(cfg.frame_rate_millihertz(), 0);
        assert_eq!(cfg.frame_counter(), 254);
    }
}
