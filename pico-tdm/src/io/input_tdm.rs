//! DMA-driven TDM input.
//!
//! [`TdmInput`] captures one frame per block from the Bitstream Generator's
//! RX FIFO into the writing slot of its [`DoubleBuffer`]. Each completion
//! publishes that slot as the reading slot and re-arms into the other one.
//!
//! ## Architecture
//!
//! ```text
//! PIO RX FIFO             DoubleBuffer                      Application
//! ┌─────────┐          ┌──────────────┐                  ┌─────────────┐
//! │  RXF[sm] │──DMA───►│ writing [N]  │                  │             │
//! │          │          ├──────────────┤     reading()    │             │
//! │          │          │ reading [N]  │─────────────────►│ consumer    │
//! └─────────┘          └──────────────┘                  └─────────────┘
//! ```
//!
//! ## Usage with RTIC
//!
//! ```ignore
//! // In init: configure against the bus RX endpoint.
//! let input = TdmInput::configure(ch, bus.rx_endpoint(), INPUT_BUF, IrqLine::Irq0, policy);
//!
//! // In the DMA_IRQ_0 task:
//! dispatch::service(&mut [input]);
//!
//! // In a lower-priority task, before the next completion:
//! let frame = *input.reading();
//! ```

use crate::buffer::DoubleBuffer;
use crate::config::SwapPolicy;
use crate::handler::CompletionHandler;
use crate::transfer::{ChannelState, Direction, DmaChannel, Endpoint, IrqLine, TransferChannel};

/// Input direction: RX FIFO → reading slot.
pub struct TdmInput<'a, C, const N: usize> {
    transfer: TransferChannel<'a, C, N>,
}

impl<'a, C: DmaChannel, const N: usize> TdmInput<'a, C, N> {
    /// Bind `channel` to the RX FIFO `endpoint` and to `buffer`. The channel
    /// is left idle until [`start()`](Self::start).
    pub fn configure(
        channel: C,
        endpoint: Endpoint,
        buffer: &'a mut DoubleBuffer<N>,
        irq: IrqLine,
        policy: SwapPolicy,
    ) -> Self {
        TdmInput {
            transfer: TransferChannel::configure(
                channel,
                Direction::FromDevice,
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

    /// The most recently completed frame. Valid until the next completion.
    pub fn reading(&self) -> &[u32; N] {
        self.transfer.buffer().reading()
    }

    /// Slot the DMA engine is filling right now.
    pub fn in_flight(&self) -> &[u32; N] {
        self.transfer.in_flight()
    }

    /// Incremented on every swap. Poll this to detect a new frame.
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

impl<C: DmaChannel, const N: usize> CompletionHandler for TdmInput<'_, C, N> {
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
    use crate::buffer::Slot;
    use crate::transfer::mock::MockChannel;

    const RX: Endpoint = Endpoint {
        fifo_addr: 0x5020_0020,
        dreq: 4,
    };

    /// Fill the in-flight slot the way the DMA engine would.
    fn capture<const N: usize>(input: &mut TdmInput<'_, MockChannel, N>, base: u32) {
        for (i, word) in input.transfer_mut().in_flight_mut().iter_mut().enumerate() {
            *word = base + i as u32;
        }
    }

    #[test]
    fn three_completions_publish_each_filled_slot() {
        let mut buf = DoubleBuffer::<8>::new();
        let mut input = TdmInput::configure(
            MockChannel::new(0),
            RX,
            &mut buf,
            IrqLine::Irq0,
            SwapPolicy::EveryCompletion,
        );
        input.start();

        let mut previous = input.transfer().buffer().reading_slot();
        let mut changes = 0;
        for block in 1..=3u32 {
            let filling = input.transfer().buffer().writing_slot();
            capture(&mut input, block * 100);

            assert!(input.on_completion());

            let now = input.transfer().buffer().reading_slot();
            if now != previous {
                changes += 1;
            }
            assert_eq!(now, filling, "reading is the slot just filled");
            assert_eq!(input.reading()[0], block * 100);
            assert_eq!(input.reading()[7], block * 100 + 7);
            previous = now;
        }
        assert_eq!(changes, 3);
        assert_eq!(input.swap_count(), 3);
    }

    #[test]
    fn rearm_targets_the_other_slot() {
        let mut buf = DoubleBuffer::<8>::new();
        let mut input = TdmInput::configure(
            MockChannel::new(2),
            RX,
            &mut buf,
            IrqLine::Irq0,
            SwapPolicy::EveryCompletion,
        );
        input.start();
        input.on_completion();

        let a = input.transfer().buffer().slot(Slot::A).as_ptr() as *mut u32;
        assert_eq!(input.transfer().channel().write_addr, Some(a));
        assert_ne!(input.reading().as_ptr(), input.in_flight().as_ptr());
    }

    #[test]
    fn handler_reports_channel() {
        let mut buf = DoubleBuffer::<8>::new();
        let input = TdmInput::configure(
            MockChannel::new(9),
            RX,
            &mut buf,
            IrqLine::Irq0,
            SwapPolicy::EveryCompletion,
        );
        assert_eq!(input.channel_id(), 9);
        assert_eq!(input.state(), ChannelState::Idle);
    }

    #[test]
    fn startup_only_loses_later_frames() {
        let mut buf = DoubleBuffer::<8>::new();
        let mut input = TdmInput::configure(
            MockChannel::new(0),
            RX,
            &mut buf,
            IrqLine::Irq0,
            SwapPolicy::StartupOnly,
        );
        input.start();

        capture(&mut input, 10);
        input.on_completion();
        capture(&mut input, 20);
        input.on_completion();

        // The second frame went into the hardware slot and was never published.
        assert_eq!(input.reading()[0], 10);
        assert_eq!(input.in_flight()[0], 20);
    }

    #[test]
    fn serviced_only_when_its_channel_latched() {
        let mut buf = DoubleBuffer::<8>::new();
        let mut input = TdmInput::configure(
            MockChannel::new(0),
            RX,
            &mut buf,
            IrqLine::Irq0,
            SwapPolicy::EveryCompletion,
        );
        input.start();

        assert_eq!(crate::dispatch::service(&mut [&mut input]), 0);
        assert_eq!(input.swap_count(), 0);

        input.transfer_mut().channel_mut().raise();
        assert_eq!(crate::dispatch::service(&mut [&mut input]), 1 << 0);
        assert_eq!(input.swap_count(), 1);
        assert!(!input.transfer().channel().latched);
    }
}
