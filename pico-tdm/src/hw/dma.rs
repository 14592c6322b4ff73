//! RP2040 DMA channels from the HAL's [`dma`](rp2040_hal::dma) module.
//!
//! The HAL's transfer types own their buffers for the length of one
//! transfer. Here the buffer stays with the [`DoubleBuffer`] and only its
//! slot addresses are handed to the hardware, so [`HalChannel`] programs the
//! channel registers that [`SingleChannel::ch`] exposes:
//!
//! | Operation | Register / HAL call |
//! |-----------|---------------------|
//! | configure | `READ_ADDR`, `WRITE_ADDR`, `TRANS_COUNT`, `AL1_CTRL`, `enable_irq0`/`enable_irq1` |
//! | re-arm input | `AL2_WRITE_ADDR_TRIG` |
//! | re-arm output | `AL3_READ_ADDR_TRIG` |
//! | acknowledge | `check_irq0`/`check_irq1` |
//!
//! ```ignore
//! let (dma, ch) = DmaController::split(pac.DMA, &mut pac.RESETS);
//! let input = dma.claim(ch.ch0)?;
//! let output = dma.claim(ch.ch1)?;
//! ```
//!
//! [`DoubleBuffer`]: crate::buffer::DoubleBuffer

use core::sync::atomic::{compiler_fence, Ordering};

use rp2040_hal::dma::{Channel, ChannelIndex, Channels, DMAExt, SingleChannel};
use rp2040_hal::pac;

use crate::error::Error;
use crate::transfer::{ChannelConfig, ChannelPool, Direction, DmaChannel, IrqLine};

/// Book-keeping for the channels handed to TDM transfers.
pub struct DmaController {
    pool: ChannelPool,
}

impl DmaController {
    /// Reset the DMA block and split it into its twelve channels.
    pub fn split(dma: pac::DMA, resets: &mut pac::RESETS) -> (Self, Channels) {
        let channels = dma.split(resets);
        let controller = DmaController {
            pool: ChannelPool::new(),
        };
        (controller, channels)
    }

    /// Wrap a split channel for use by a transfer and record its number.
    pub fn claim<CH: ChannelIndex>(&self, channel: Channel<CH>) -> Result<HalChannel<CH>, Error> {
        self.pool.claim(channel.id())?;
        Ok(HalChannel { channel })
    }

    /// Channels claimed so far.
    pub fn pool(&self) -> &ChannelPool {
        &self.pool
    }
}

/// One HAL DMA channel driven as a one-shot [`DmaChannel`].
pub struct HalChannel<CH: ChannelIndex> {
    channel: Channel<CH>,
}

impl<CH: ChannelIndex> DmaChannel for HalChannel<CH> {
    fn id(&self) -> u8 {
        self.channel.id()
    }

    fn configure(&mut self, config: &ChannelConfig) {
        let id = self.channel.id();
        let ch = self.channel.ch();
        let fifo = config.endpoint.fifo_addr;
        match config.direction {
            Direction::FromDevice => {
                ch.ch_read_addr().write(|w| unsafe { w.bits(fifo) });
            }
            Direction::ToDevice => {
                ch.ch_write_addr().write(|w| unsafe { w.bits(fifo) });
            }
        }
        ch.ch_trans_count()
            .write(|w| unsafe { w.bits(config.length) });
        ch.ch_al1_ctrl()
            .write(|w| unsafe { w.bits(config.ctrl_word(id)) });

        match config.irq {
            IrqLine::Irq0 => self.channel.enable_irq0(),
            IrqLine::Irq1 => self.channel.enable_irq1(),
        }
    }

    fn set_read_addr(&mut self, addr: *const u32, trigger: bool) {
        // Slot contents must be visible before the engine starts reading.
        compiler_fence(Ordering::SeqCst);
        let ch = self.channel.ch();
        if trigger {
            ch.ch_al3_read_addr_trig()
                .write(|w| unsafe { w.bits(addr as u32) });
        } else {
            ch.ch_read_addr().write(|w| unsafe { w.bits(addr as u32) });
        }
    }

    fn set_write_addr(&mut self, addr: *mut u32, trigger: bool) {
        compiler_fence(Ordering::SeqCst);
        let ch = self.channel.ch();
        if trigger {
            ch.ch_al2_write_addr_trig()
                .write(|w| unsafe { w.bits(addr as u32) });
        } else {
            ch.ch_write_addr().write(|w| unsafe { w.bits(addr as u32) });
        }
    }

    fn check_irq(&mut self, line: IrqLine) -> bool {
        match line {
            IrqLine::Irq0 => self.channel.check_irq0(),
            IrqLine::Irq1 => self.channel.check_irq1(),
        }
    }
}
