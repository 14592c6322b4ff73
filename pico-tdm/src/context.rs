//! Both transfer directions, built once at startup.
//!
//! [`TdmContext`] replaces mutable globals: setup code builds it from the
//! claimed channels, the bus endpoints and two `'static` buffers, then
//! either keeps it whole or [`split`](TdmContext::split)s it into one
//! resource per direction for the interrupt handlers.
//!
//! Input completes on [`IrqLine::Irq0`], output on [`IrqLine::Irq1`]. The
//! two channels may be different types, as HAL channels are typed by number.

use crate::buffer::DoubleBuffer;
use crate::config::TdmConfig;
use crate::error::Error;
use crate::io::{TdmInput, TdmOutput};
use crate::transfer::{DmaChannel, Endpoint, IrqLine};

/// Input and output of one TDM bus.
pub struct TdmContext<'a, CI, CO, const N: usize> {
    pub input: TdmInput<'a, CI, N>,
    pub output: TdmOutput<'a, CO, N>,
}

impl<'a, CI: DmaChannel, CO: DmaChannel, const N: usize> TdmContext<'a, CI, CO, N> {
    /// Validate `config` for `N`-word blocks and configure both channels.
    /// Neither channel is started.
    pub fn configure(
        input_channel: CI,
        output_channel: CO,
        rx: Endpoint,
        tx: Endpoint,
        input_buffer: &'a mut DoubleBuffer<N>,
        output_buffer: &'a mut DoubleBuffer<N>,
        config: &TdmConfig,
    ) -> Result<Self, Error> {
        config.validate_for::<N>()?;
        if input_channel.id() == output_channel.id() {
            return Err(Error::ChannelInUse(output_channel.id()));
        }

        let input = TdmInput::configure(
            input_channel,
            rx,
            input_buffer,
            IrqLine::Irq0,
            config.swap_policy,
        );
        let output = TdmOutput::configure(
            output_channel,
            tx,
            output_buffer,
            IrqLine::Irq1,
            config.swap_policy,
        );
        Ok(TdmContext { input, output })
    }

    /// Arm output first so the TX FIFO starts filling before input does.
    pub fn start(&mut self) {
        self.output.start();
        self.input.start();
    }

    /// One resource per interrupt handler.
    pub fn split(self) -> (TdmInput<'a, CI, N>, TdmOutput<'a, CO, N>) {
        (self.input, self.output)
    }
}
