//! Bitstream Generator and Master Clock Generator.
//!
//! Two state machines of the same PIO block run from the same divided
//! clock. `tdm` shifts one bit every 4 cycles and drives BCLK and FS through
//! side-set; `tdm_mclk` toggles MCLK every 2 cycles.
//!
//! ```text
//!          ┌─┐ ┌─┐ ┌─┐ ┌─┐       ┌─┐ ┌─┐
//! BCLK   ──┘ └─┘ └─┘ └─┘ └─ ... ─┘ └─┘ └─
//!        ┌───┐
//! FS     ┘   └───────────── ... ─────────
//! DATA    b31 b30 b29 b28        b1  b0
//!         └─ slot 0 ──────── ... ─ slot N-1
//! ```
//!
//! Data changes on the falling edge of BCLK and is sampled on the rising
//! edge. Before its first frame `tdm` pulls one word from the TX FIFO: the
//! loop count from [`TdmConfig::frame_counter`]. The programs themselves
//! live in [`program`](crate::program).

use rp2040_hal::pio::{
    InstalledProgram, PIOBuilder, PIOExt, PinDir, Running, Rx, ShiftDirection, StateMachine,
    StateMachineGroup2, StateMachineIndex, Stopped, Tx, UninitStateMachine, PIO,
};

use crate::config::TdmConfig;
use crate::error::Error;
use crate::program;
use crate::transfer::Endpoint;

/// A configured, stopped TDM bus.
pub struct TdmBus<P: PIOExt, SM: StateMachineIndex, MC: StateMachineIndex> {
    tdm: StateMachine<(P, SM), Stopped>,
    mclk: StateMachine<(P, MC), Stopped>,
    rx: Rx<(P, SM)>,
    tx: Tx<(P, SM)>,
    frame_counter: u32,
}

/// Both state machines running.
pub struct RunningTdmBus<P: PIOExt, SM: StateMachineIndex, MC: StateMachineIndex> {
    _group: StateMachineGroup2<P, SM, MC, Running>,
    _rx: Rx<(P, SM)>,
    _tx: Tx<(P, SM)>,
}

impl<P: PIOExt, SM: StateMachineIndex, MC: StateMachineIndex> TdmBus<P, SM, MC> {
    /// Install both programs and build both state machines. Nothing runs
    /// until [`start`](Self::start).
    pub fn new(
        pio: &mut PIO<P>,
        sm_tdm: UninitStateMachine<(P, SM)>,
        sm_mclk: UninitStateMachine<(P, MC)>,
        config: &TdmConfig,
    ) -> Result<Self, Error> {
        config.validate()?;
        let pins = config.pins;

        let tdm_program = install_tdm(pio)?;
        let mclk_program = install_mclk(pio)?;

        let (mut tdm, rx, tx) = PIOBuilder::from_installed_program(tdm_program)
            .side_set_pin_base(pins.bclk)
            .out_pins(pins.data_out, 1)
            .in_pin_base(pins.data_in)
            .out_shift_direction(ShiftDirection::Left)
            .in_shift_direction(ShiftDirection::Left)
            // Thresholds stay at their 32-bit default.
            .autopull(true)
            .autopush(true)
            .clock_divisor_fixed_point(config.clock_divisor, config.clock_divisor_frac)
            .build(sm_tdm);
        tdm.set_pindirs([
            (pins.bclk, PinDir::Output),
            (pins.fs, PinDir::Output),
            (pins.data_out, PinDir::Output),
            (pins.data_in, PinDir::Input),
        ]);

        let (mut mclk, _, _) = PIOBuilder::from_installed_program(mclk_program)
            .side_set_pin_base(pins.mclk)
            .clock_divisor_fixed_point(config.clock_divisor, config.clock_divisor_frac)
            .build(sm_mclk);
        mclk.set_pindirs([(pins.mclk, PinDir::Output)]);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "tdm: {=u32} Hz bclk, {=u32} Hz mclk, {=u32} bits/frame",
            config.bit_clock_hz(),
            config.mclk_hz(),
            config.frame_bits()
        );

        Ok(TdmBus {
            tdm,
            mclk,
            rx,
            tx,
            frame_counter: config.frame_counter(),
        })
    }

    /// RX FIFO of the `tdm` state machine, for the input DMA channel.
    pub fn rx_endpoint(&self) -> Endpoint {
        Endpoint {
            fifo_addr: self.rx.fifo_address() as u32,
            dreq: self.rx.dreq_value(),
        }
    }

    /// TX FIFO of the `tdm` state machine, for the output DMA channel.
    pub fn tx_endpoint(&self) -> Endpoint {
        Endpoint {
            fifo_addr: self.tx.fifo_address() as u32,
            dreq: self.tx.dreq_value(),
        }
    }

    /// Push the frame counter and start both state machines in one CTRL
    /// write, so MCLK and BCLK share their first edge.
    ///
    /// Call this before arming the output channel: the counter must be the
    /// first word in the TX FIFO.
    pub fn start(mut self) -> Result<RunningTdmBus<P, SM, MC>, Error> {
        if !self.tx.write(self.frame_counter) {
            return Err(Error::FifoFull);
        }
        let group = self.tdm.with(self.mclk).sync().start();

        #[cfg(feature = "defmt")]
        defmt::info!("tdm: running");

        Ok(RunningTdmBus {
            _group: group,
            _rx: self.rx,
            _tx: self.tx,
        })
    }
}

fn install_tdm<P: PIOExt>(pio: &mut PIO<P>) -> Result<InstalledProgram<P>, Error> {
    pio.install(&program::tdm()).map_err(|_| Error::ProgramInstall)
}

fn install_mclk<P: PIOExt>(pio: &mut PIO<P>) -> Result<InstalledProgram<P>, Error> {
    pio.install(&program::mclk()).map_err(|_| Error::ProgramInstall)
}
