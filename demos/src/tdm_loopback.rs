//! TDM loopback: every received frame is transmitted again.
//!
//! Captures one 8-slot frame per input block and copies it into the
//! output's writing slot, so it goes out one block later. Jumper DATA_OUT to
//! DATA_IN to see the bus talk to itself.
//!
//! Hardware: Raspberry Pi Pico (RP2040), TDM codec or jumper wire
//!
//! Data path:
//! ```text
//!   RX FIFO ──DMA──► TdmInput ──copy task──► TdmOutput ──DMA──► TX FIFO
//! ```
//!
//! Pins:
//!   GP11: BCLK   GP12: FS   GP13: DATA_OUT   GP14: DATA_IN   GP15: MCLK
//!
//! Both DMA ISRs share the same priority so they cannot preempt each other.
//! `DMA_IRQ_0` serves input and kicks the copy task, `DMA_IRQ_1` serves
//! output and blinks the LED at about 1 Hz.

#![no_std]
#![no_main]

use defmt_rtt as _;
use panic_probe as _;

/// Second-stage bootloader for the Pico's W25Q080 flash.
#[link_section = ".boot2"]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_W25Q080;

#[rtic::app(device = rp2040_hal::pac, peripherals = true, dispatchers = [TIMER_IRQ_1])]
mod app {
    use embedded_hal::digital::StatefulOutputPin;
    use rp2040_hal as hal;

    use hal::gpio::bank0::Gpio25;
    use hal::gpio::{FunctionPio0, FunctionSioOutput, Pin, PullDown};
    use hal::pio::{PIOExt, PIO, SM0, SM1};

    use pico_tdm::buffer::DoubleBuffer;
    use pico_tdm::config::TdmConfig;
    use pico_tdm::constants::SAMPLE_BUF_SIZE;
    use pico_tdm::context::TdmContext;
    use pico_tdm::dispatch;
    use pico_tdm::hw::clocks::init_clocks_128mhz;
    use hal::dma::{CH0, CH1};
    use pico_tdm::hw::dma::{DmaController, HalChannel};
    use pico_tdm::hw::pio::{RunningTdmBus, TdmBus};
    use pico_tdm::io::{TdmInput, TdmOutput};

    const N: usize = SAMPLE_BUF_SIZE;
    /// Output blocks per LED toggle.
    const BLINK_FRAMES: u32 = 7812;

    type Input = TdmInput<'static, HalChannel<CH0>, N>;
    type Output = TdmOutput<'static, HalChannel<CH1>, N>;
    type Led = Pin<Gpio25, FunctionSioOutput, PullDown>;

    // ── RTIC resources ───────────────────────────────────────────────

    #[shared]
    struct Shared {
        input: Input,
        output: Output,
    }

    #[local]
    struct Local {
        led: Led,
        _bus: RunningTdmBus<hal::pac::PIO0, SM0, SM1>,
        _pio: PIO<hal::pac::PIO0>,
        _dma: DmaController,
    }

    // ── Init ─────────────────────────────────────────────────────────

    #[init(local = [
        rx_buf: DoubleBuffer<N> = DoubleBuffer::new(),
        tx_buf: DoubleBuffer<N> = DoubleBuffer::new()
    ])]
    fn init(cx: init::Context) -> (Shared, Local) {
        let mut pac = cx.device;
        let mut watchdog = hal::Watchdog::new(pac.WATCHDOG);
        let _clocks = init_clocks_128mhz(
            pac.XOSC,
            pac.CLOCKS,
            pac.PLL_SYS,
            pac.PLL_USB,
            &mut pac.RESETS,
            &mut watchdog,
        )
        .expect("clocks");

        let sio = hal::sio::Sio::new(pac.SIO);
        let pins = hal::gpio::Pins::new(
            pac.IO_BANK0,
            pac.PADS_BANK0,
            sio.gpio_bank0,
            &mut pac.RESETS,
        );
        let led = pins.gpio25.into_push_pull_output();

        // Must match `TdmConfig::DEFAULT.pins`.
        let _bclk = pins.gpio11.into_function::<FunctionPio0>();
        let _fs = pins.gpio12.into_function::<FunctionPio0>();
        let _data_out = pins.gpio13.into_function::<FunctionPio0>();
        let _data_in = pins.gpio14.into_function::<FunctionPio0>();
        let _mclk = pins.gpio15.into_function::<FunctionPio0>();

        // ── PIO: bitstream + master clock ───────────────────────────
        let config = TdmConfig::DEFAULT;
        let (mut pio, sm0, sm1, _, _) = pac.PIO0.split(&mut pac.RESETS);
        let bus = TdmBus::new(&mut pio, sm0, sm1, &config).expect("tdm bus");

        // ── DMA: one channel per direction ──────────────────────────
        let (dma, channels) = DmaController::split(pac.DMA, &mut pac.RESETS);
        let mut ctx = TdmContext::configure(
            dma.claim(channels.ch0).expect("input channel"),
            dma.claim(channels.ch1).expect("output channel"),
            bus.rx_endpoint(),
            bus.tx_endpoint(),
            cx.local.rx_buf,
            cx.local.tx_buf,
            &config,
        )
        .expect("tdm context");

        // Frame counter first, then the output stream behind it.
        let bus = bus.start().expect("tdm start");
        ctx.start();
        let (input, output) = ctx.split();

        defmt::info!(
            "loopback: {=u32} Hz bclk, {=u64} mHz frame rate, {=u32} dma channels",
            config.bit_clock_hz(),
            config.frame_rate_millihertz(),
            dma.pool().claimed_count()
        );

        (
            Shared { input, output },
            Local {
                led,
                _bus: bus,
                _pio: pio,
                _dma: dma,
            },
        )
    }

    #[idle]
    fn idle(_: idle::Context) -> ! {
        loop {
            cortex_m::asm::wfi();
        }
    }

    // ── Input DMA ISR: publish the captured frame ────────────────────

    #[task(binds = DMA_IRQ_0, shared = [input], priority = 2)]
    fn dma_rx_isr(mut cx: dma_rx_isr::Context) {
        let handled = cx
            .shared
            .input
            .lock(|input| dispatch::service(&mut [input]));

        if handled != 0 && copy::spawn().is_err() {
            defmt::warn!("loopback: copy overrun");
        }
    }

    // ── Output DMA ISR: re-arm and blink ─────────────────────────────

    #[task(binds = DMA_IRQ_1, shared = [output], local = [led, frames: u32 = 0], priority = 2)]
    fn dma_tx_isr(mut cx: dma_tx_isr::Context) {
        let handled = cx
            .shared
            .output
            .lock(|output| dispatch::service(&mut [output]));
        if handled == 0 {
            return;
        }

        *cx.local.frames = cx.local.frames.wrapping_add(1);
        if *cx.local.frames % BLINK_FRAMES == 0 {
            cx.local.led.toggle().ok();
        }
    }

    // ── Copy input → output between swaps ────────────────────────────

    #[task(shared = [input, output], priority = 1)]
    async fn copy(mut cx: copy::Context) {
        let frame = cx.shared.input.lock(|input| *input.reading());
        cx.shared.output.lock(|output| *output.writing_mut() = frame);
    }
}
