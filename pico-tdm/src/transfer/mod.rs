//! DMA transfer engine.
//!
//! A [`TransferChannel`] moves one block of `N` words per trigger between a
//! [`DoubleBuffer`](crate::buffer::DoubleBuffer) slot and a PIO FIFO. It is
//! one-shot: the completion handler swaps the buffer and triggers the next
//! block.
//!
//! ```text
//!            configure()          start()
//!   (none) ──────────────► Idle ──────────► Armed ◄──┐
//!                                             │      │ on_completion():
//!                                             └──────┘ swap + re-arm
//! ```
//!
//! The hardware sits behind the [`DmaChannel`] trait. The RP2040
//! implementation lives in `hw::dma`; tests use [`mock::MockChannel`].

mod channel;
mod pool;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use channel::{ChannelState, TransferChannel};
pub use pool::ChannelPool;

/// Which way a channel moves data relative to the Bitstream Generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// RX FIFO → memory (input).
    FromDevice,
    /// Memory → TX FIFO (output).
    ToDevice,
}

/// DMA interrupt line a channel signals completion on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IrqLine {
    Irq0,
    Irq1,
}

/// One FIFO of the Bitstream Generator as seen by the DMA engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Endpoint {
    /// Bus address of the FIFO register.
    pub fifo_addr: u32,
    /// DREQ number pacing transfers to or from this FIFO.
    pub dreq: u8,
}

/// Static setup applied once by [`DmaChannel::configure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    pub direction: Direction,
    pub endpoint: Endpoint,
    /// Words per block.
    pub length: u32,
    pub irq: IrqLine,
}

// RP2040 CH_CTRL field positions.
const CTRL_EN: u32 = 1 << 0;
const CTRL_DATA_SIZE_WORD: u32 = 2 << 2;
const CTRL_INCR_READ: u32 = 1 << 4;
const CTRL_INCR_WRITE: u32 = 1 << 5;
const CTRL_CHAIN_TO_SHIFT: u32 = 11;
const CTRL_TREQ_SEL_SHIFT: u32 = 15;

impl ChannelConfig {
    /// `CTRL` register value for channel `channel_id`.
    ///
    /// Word-sized transfers, the memory side increments and the FIFO side
    /// stays fixed. `CHAIN_TO` points at the channel itself, which disables
    /// chaining.
    pub fn ctrl_word(&self, channel_id: u8) -> u32 {
        let incr = match self.direction {
            Direction::FromDevice => CTRL_INCR_WRITE,
            Direction::ToDevice => CTRL_INCR_READ,
        };
        CTRL_EN
            | CTRL_DATA_SIZE_WORD
            | incr
            | (u32::from(channel_id & 0x0f) << CTRL_CHAIN_TO_SHIFT)
            | (u32::from(self.endpoint.dreq & 0x3f) << CTRL_TREQ_SEL_SHIFT)
    }
}

/// A single hardware block-transfer channel.
///
/// Implementations must not block or allocate: the address setters and
/// [`check_irq`](Self::check_irq) run in interrupt context.
pub trait DmaChannel {
    /// Hardware channel number, also its bit in the interrupt status mask.
    fn id(&self) -> u8;

    /// Apply the static setup and enable the completion interrupt.
    ///
    /// Must leave the channel idle. The FIFO side address comes from
    /// `config.endpoint`; the memory side is set by the address setters.
    fn configure(&mut self, config: &ChannelConfig);

    /// Set the memory source. Starts a block when `trigger` is true.
    fn set_read_addr(&mut self, addr: *const u32, trigger: bool);

    /// Set the memory destination. Starts a block when `trigger` is true.
    fn set_write_addr(&mut self, addr: *mut u32, trigger: bool);

    /// Clear this channel's latched completion on `line`. Returns whether
    /// one was latched. Other channels' bits are left alone.
    fn check_irq(&mut self, line: IrqLine) -> bool;
}
