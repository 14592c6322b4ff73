use crate::buffer::DoubleBuffer;
use crate::config::SwapPolicy;

use super::{ChannelConfig, Direction, DmaChannel, Endpoint, IrqLine};

/// Run state of a [`TransferChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelState {
    /// Configured, not triggered.
    Idle,
    /// Triggered, a block is in flight.
    Armed,
}

/// One-shot DMA channel bound to a [`DoubleBuffer`].
///
/// The channel owns its hardware handle and borrows the buffer. The memory
/// address it uses is always the slot the hardware owns: the writing slot
/// for [`Direction::FromDevice`], the reading slot for
/// [`Direction::ToDevice`].
pub struct TransferChannel<'a, C, const N: usize> {
    channel: C,
    direction: Direction,
    irq: IrqLine,
    buffer: &'a mut DoubleBuffer<N>,
    state: ChannelState,
    policy: SwapPolicy,
    completions: u32,
}

impl<'a, C: DmaChannel, const N: usize> TransferChannel<'a, C, N> {
    /// One-time setup. Binds the FIFO and the initial slot, sets the block
    /// length to `N` words and enables the completion interrupt on `irq`.
    /// Does not start a transfer.
    pub fn configure(
        mut channel: C,
        direction: Direction,
        buffer: &'a mut DoubleBuffer<N>,
        endpoint: Endpoint,
        irq: IrqLine,
        policy: SwapPolicy,
    ) -> Self {
        let config = ChannelConfig {
            direction,
            endpoint,
            length: N as u32,
            irq,
        };
        channel.configure(&config);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "dma ch{=u8}: {} x{=usize} words, fifo {=u32:#x}, dreq {=u8}, {}",
            channel.id(),
            direction,
            N,
            endpoint.fifo_addr,
            endpoint.dreq,
            irq
        );

        let mut this = TransferChannel {
            channel,
            direction,
            irq,
            buffer,
            state: ChannelState::Idle,
            policy,
            completions: 0,
        };
        this.point_at_hardware_slot(false);
        this
    }

    /// Trigger the first block. Does nothing if already armed.
    pub fn start(&mut self) -> bool {
        if self.state == ChannelState::Armed {
            return false;
        }
        self.point_at_hardware_slot(true);
        self.state = ChannelState::Armed;

        #[cfg(feature = "defmt")]
        defmt::debug!("dma ch{=u8}: armed", self.channel.id());
        true
    }

    /// Completion interrupt for this channel.
    ///
    /// Swaps the buffer, then re-triggers on the slot the hardware now owns.
    /// Under [`SwapPolicy::EveryCompletion`] the swap guard is raised again
    /// right after the re-arm, so the next completion swaps as well.
    ///
    /// Returns whether the roles were exchanged. A completion seen while
    /// [`Idle`](ChannelState::Idle) is ignored and returns `false`.
    pub fn on_completion(&mut self) -> bool {
        if self.state == ChannelState::Idle {
            return false;
        }
        let swapped = self.buffer.swap();
        self.point_at_hardware_slot(true);
        if self.policy == SwapPolicy::EveryCompletion {
            self.buffer.request_swap();
        }
        self.completions = self.completions.wrapping_add(1);

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "dma ch{=u8}: block {=u32} done, reading {}",
            self.channel.id(),
            self.completions,
            self.buffer.reading_slot()
        );
        swapped
    }

    /// Check and clear this channel's completion bit on its configured line.
    pub fn take_completion(&mut self) -> bool {
        self.channel.check_irq(self.irq)
    }

    fn point_at_hardware_slot(&mut self, trigger: bool) {
        match self.direction {
            Direction::FromDevice => {
                let addr = self.buffer.writing_ptr();
                self.channel.set_write_addr(addr, trigger);
            }
            Direction::ToDevice => {
                let addr = self.buffer.reading_ptr();
                self.channel.set_read_addr(addr, trigger);
            }
        }
    }

    /// Hardware channel number.
    pub fn id(&self) -> u8 {
        self.channel.id()
    }

    /// Which FIFO this channel serves.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Line the completion interrupt was enabled on.
    pub fn irq(&self) -> IrqLine {
        self.irq
    }

    /// Whether a block is in flight.
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// When the swap guard is raised again.
    pub fn policy(&self) -> SwapPolicy {
        self.policy
    }

    /// Block length in words.
    pub const fn length(&self) -> usize {
        N
    }

    /// Completion interrupts serviced (wrapping).
    pub fn completions(&self) -> u32 {
        self.completions
    }

    /// The hardware handle.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// The bound buffer. Only the slot not [`in_flight`](Self::in_flight)
    /// is safe to read while armed.
    pub fn buffer(&self) -> &DoubleBuffer<N> {
        &*self.buffer
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut DoubleBuffer<N> {
        &mut *self.buffer
    }

    /// The slot the hardware is currently moving data to or from.
    pub fn in_flight(&self) -> &[u32; N] {
        match self.direction {
            Direction::FromDevice => self.buffer.writing(),
            Direction::ToDevice => self.buffer.reading(),
        }
    }

    #[cfg(test)]
    pub(crate) fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Mutable access to the in-flight slot, for simulating the DMA engine.
    #[cfg(test)]
    pub(crate) fn in_flight_mut(&mut self) -> &mut [u32; N] {
        let slot = match self.direction {
            Direction::FromDevice => self.buffer.writing_slot(),
            Direction::ToDevice => self.buffer.reading_slot(),
        };
        self.buffer.slot_mut(slot)
    }
}
