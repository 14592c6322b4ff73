//! TDM test pattern: a counting word per slot out, received frames logged.
//!
//! Every output block carries an 8-slot frame where slot `i` holds the
//! 24-bit sample `(i << 20) | block`. Once per second the latest input
//! frame is logged over RTT, so a logic analyser on DATA_OUT and the log
//! from DATA_IN can be compared side by side.
//!
//! Hardware: Raspberry Pi Pico (RP2040)
//!
//! Pins:
//!   GP11: BCLK   GP12: FS   GP13: DATA_OUT   GP14: DATA_IN   GP15: MCLK

#![no_std]
#![no_main]

use defmt_rtt as _;
use panic_probe as _;

#[link_section = ".boot2"]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_W25Q080;

#[rtic::app(device = rp2040_hal::pac, peripherals = true, dispatchers = [TIMER_IRQ_1])]
mod app {
    use rp2040_hal as hal;

    use hal::gpio::FunctionPio0;
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
    use pico_tdm::io::frame::{pack_frame, unpack_frame};
    use pico_tdm::io::{TdmInput, TdmOutput};

    const N: usize = SAMPLE_BUF_SIZE;
    /// Input blocks between two log lines.
    const REPORT_FRAMES: u32 = 7812;

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        input: TdmInput<'static, HalChannel<CH0>, N>,
        output: TdmOutput<'static, HalChannel<CH1>, N>,
        _bus: RunningTdmBus<hal::pac::PIO0, SM0, SM1>,
        _pio: PIO<hal::pac::PIO0>,
        _dma: DmaController,
    }

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
        let _bclk = pins.gpio11.into_function::<FunctionPio0>();
        let _fs = pins.gpio12.into_function::<FunctionPio0>();
        let _data_out = pins.gpio13.into_function::<FunctionPio0>();
        let _data_in = pins.gpio14.into_function::<FunctionPio0>();
        let _mclk = pins.gpio15.into_function::<FunctionPio0>();

        let config = TdmConfig::DEFAULT;
        let (mut pio, sm0, sm1, _, _) = pac.PIO0.split(&mut pac.RESETS);
        let bus = TdmBus::new(&mut pio, sm0, sm1, &config).expect("tdm bus");

        // Channel 0 completes on DMA_IRQ_0, channel 1 on DMA_IRQ_1.
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
        pack_frame(ctx.output.writing_mut(), &pattern(0));

        let bus = bus.start().expect("tdm start");
        ctx.start();
        let (input, output) = ctx.split();

        defmt::info!("pattern: {=u32} slots per frame", u32::from(config.slots_per_frame));

        (
            Shared {},
            Local {
                input,
                output,
                _bus: bus,
                _pio: pio,
                _dma: dma,
            },
        )
    }

    fn pattern(block: u32) -> [i32; N] {
        let mut samples = [0i32; N];
        for (slot, sample) in samples.iter_mut().enumerate() {
            *sample = ((slot as i32) << 20) | (block & 0x000F_FFFF) as i32;
        }
        samples
    }

    #[task(binds = DMA_IRQ_0, local = [input, frames: u32 = 0], priority = 2)]
    fn dma_rx_isr(cx: dma_rx_isr::Context) {
        let input = cx.local.input;
        if dispatch::service(&mut [&mut *input]) == 0 {
            return;
        }

        *cx.local.frames = cx.local.frames.wrapping_add(1);
        if *cx.local.frames % REPORT_FRAMES == 0 {
            let mut samples = [0i32; N];
            unpack_frame(input.reading(), &mut samples);
            if report::spawn(*cx.local.frames, samples).is_err() {
                defmt::warn!("pattern: report still pending");
            }
        }
    }

    #[task(binds = DMA_IRQ_1, local = [output, block: u32 = 0], priority = 2)]
    fn dma_tx_isr(cx: dma_tx_isr::Context) {
        let output = cx.local.output;
        if dispatch::service(&mut [&mut *output]) == 0 {
            return;
        }

        *cx.local.block = cx.local.block.wrapping_add(1);
        pack_frame(output.writing_mut(), &pattern(*cx.local.block));
    }

    #[task(priority = 1)]
    async fn report(_: report::Context, frames: u32, samples: [i32; N]) {
        defmt::info!("rx frame {=u32}: {:x}", frames, samples);
    }
}
