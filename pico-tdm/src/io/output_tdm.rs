//! DMA-driven TDM output.
//!
//! [`TdmOutput`] feeds the Bitstream Generator's TX FIFO from the reading
//! slot of its [`DoubleBuffer`]. The application fills the writing slot;
//! the next completion swaps it in for transmission.
//!
//! ## Architecture
//!
//! ```text
//! Application             DoubleBuffer                   PIO TX FIFO
//! ┌─────────────┐      ┌──────────────┐                ┌─────────┐
//! │ producer    │─────►│ writing [N]  │                │         │
//! │             │      ├──────────────┤                │         │
//! │             │      │ reading [N]  │──────DMA──────►│ TXF[sm] │
//! └─────────────┘      └──────────────┘                └─────────┘
//! ```
//!
//! If the application misses a block, the completion still swaps and the
//! older, fully written slot is sent again. The application must finish
//! writing before the next completion, or a partly written frame goes out.

use crate::buffer::DoubleBuffer;
use crate::config::SwapPolicy;
use crate::handler::CompletionHandler;
use crate::transfer::{ChannelState, Direction, DmaChannel, Endpoint, IrqLine, TransferChannel};

/// Output direction: writing slot → TX FIFO.
pub struct TdmOutput<'a, C, const N: usize> {
    transfer: TransferChannel<'a, C, N>,
}

impl<'a, C: DmaChannel, const N: usize> TdmOutput<'a, C, N> {
    /// Bind `channel` to the TX FIFO `endpoint` and to `buffer`. The channel
    /// is left idle until [`start()`](Self::start).
    pub fn configure(
        channel: C,
        endpoint: Endpoint,
        buffer: &'a mut DoubleBuffer<N>,
        irq: IrqLine,
        policy: SwapPolicy,
    ) -> Self {
        TdmOutput {
            transfer: TransferChannel::configure(
                channel,
                Direction::ToDevice,
                buffer,
                endpoint,
                irq,
                policy,
            ),
        }
    }

    /// Trigger the first block. Returns `false` if already armed.
    pub fn start(&mut self) -> bool {
        self.transfer.start()
    }

    /// The frame that goes out after the next completion. Finish writing it
    /// before that completion.
    pub fn writing_mut(&mut self) -> &mut [u32; N] {
        self.transfer.buffer_mut().writing_mut()
    }

    /// Read back the frame queued for the next completion.
    pub fn writing(&self) -> &[u32; N] {
        self.transfer.buffer().writing()
    }

    /// Slot the DMA engine is transmitting right now.
    pub fn in_flight(&self) -> &[u32; N] {
        self.transfer.in_flight()
    }

    /// Incremented on every swap. A change means the writing slot is fresh.
    pub fn swap_count(&self) -> u32 {
        self.transfer.buffer().swap_count()
    }

    /// Whether the channel has been started.
    pub fn state(&self) -> ChannelState {
        self.transfer.state()
    }

    /// The underlying channel, for diagnostics.
    pub fn transfer(&self) -> &TransferChannel<'a, C, N> {
        &self.transfer
    }

    #[cfg(test)]
    pub(crate) fn transfer_mut(&mut self) -> &mut TransferChannel<'a, C, N> {
        &mut self.transfer
    }
}

impl<C: DmaChannel, const N: usize> CompletionHandler for TdmOutput<'_, C, N> {
    fn channel_id(&self) -> u8 {
        self.transfer.id()
    }

    fn take_completion(&mut self) -> bool {
        self.transfer.take_completion()
    }

    fn on_completion(&mut self) -> bool {
        self.transfer.on_completion()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::mock::MockChannel;

    const TX: Endpoint = Endpoint {
        fifo_addr: 0x5020_0010,
        dreq: 0,
    };

    #[test]
    fn written_frame_is_sent_next() {
        let mut buf = DoubleBuffer::<4>::new();
        let mut output = TdmOutput::configure(
            MockChannel::new(1),
            TX,
            &mut buf,
            IrqLine::Irq1,
            SwapPolicy::EveryCompletion,
        );
        output.start();
        assert_eq!(output.in_flight(), &[0; 4]);

        *output.writing_mut() = [1, 2, 3, 4];
        output.on_completion();

        assert_eq!(output.in_flight(), &[1, 2, 3, 4]);
        let sent = output.in_flight().as_ptr();
        assert_eq!(output.transfer().channel().read_addr, Some(sent));
    }

    #[test]
    fn missed_block_resends_stale_slot() {
        let mut buf = DoubleBuffer::<4>::new();
        let mut output = TdmOutput::configure(
            MockChannel::new(1),
            TX,
            &mut buf,
            IrqLine::Irq1,
            SwapPolicy::EveryCompletion,
        );
        output.start();

        *output.writing_mut() = [5, 5, 5, 5];
        output.on_completion(); // sending [5; 4]
        *output.writing_mut() = [6, 6, 6, 6];
        output.on_completion(); // sending [6; 4]

        // Application misses the next block entirely.
        let stale = output.writing().as_ptr();
        output.on_completion();

        // The older whole frame goes out again.
        assert_eq!(output.in_flight(), &[5, 5, 5, 5]);
        assert_eq!(output.transfer().channel().read_addr, Some(stale));
        assert_ne!(output.in_flight().as_ptr(), output.writing().as_ptr());
        assert_eq!(output.writing(), &[6, 6, 6, 6]);
    }

    #[test]
    fn dma_never_reads_the_writing_slot() {
        let mut buf = DoubleBuffer::<4>::new();
        let mut output = TdmOutput::configure(
            MockChannel::new(1),
            TX,
            &mut buf,
            IrqLine::Irq1,
            SwapPolicy::EveryCompletion,
        );
        output.start();
        for _ in 0..16 {
            let writing = output.writing().as_ptr();
            assert_ne!(output.transfer().channel().read_addr, Some(writing));
            output.on_completion();
        }
    }

    #[test]
    fn latched_completion_is_taken_once() {
        let mut buf = DoubleBuffer::<4>::new();
        let mut output = TdmOutput::configure(
            MockChannel::new(1),
            TX,
            &mut buf,
            IrqLine::Irq1,
            SwapPolicy::EveryCompletion,
        );
        output.start();
        output.transfer_mut().channel_mut().raise();

        assert!(output.take_completion());
        assert!(!output.take_completion());
        assert_eq!(output.transfer().irq(), IrqLine::Irq1);
        assert_eq!(output.transfer().channel().acknowledged, 1);
    }
}
