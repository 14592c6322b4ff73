//! 128 MHz system clock.
//!
//! The HAL's default setup runs at 125 MHz, which does not divide down to a
//! 2 MHz bit clock. This is the same sequence with a different system PLL:
//!
//! ```text
//! XOSC 12 MHz ── ÷1 ── VCO 1536 MHz ── ÷6 ── ÷2 ──► clk_sys 128 MHz
//!             └─────── PLL_USB ──────────────────► clk_usb  48 MHz
//! ```

use fugit::HertzU32;
use rp2040_hal::clocks::ClocksManager;
use rp2040_hal::pac;
use rp2040_hal::pll::{common_configs::PLL_USB_48MHZ, setup_pll_blocking, PLLConfig};
use rp2040_hal::xosc::setup_xosc_blocking;
use rp2040_hal::Watchdog;
#[cfg(feature = "defmt")]
use rp2040_hal::Clock;

use crate::error::Error;

/// Crystal on the Pico and most RP2040 boards.
pub const XOSC_HZ: u32 = 12_000_000;

pub const PLL_SYS_128MHZ: PLLConfig = PLLConfig {
    vco_freq: HertzU32::MHz(1536),
    refdiv: 1,
    post_div1: 6,
    post_div2: 2,
};

/// Bring up XOSC, both PLLs and the clock tree with `clk_sys` at 128 MHz.
pub fn init_clocks_128mhz(
    xosc_dev: pac::XOSC,
    clocks_dev: pac::CLOCKS,
    pll_sys_dev: pac::PLL_SYS,
    pll_usb_dev: pac::PLL_USB,
    resets: &mut pac::RESETS,
    watchdog: &mut Watchdog,
) -> Result<ClocksManager, Error> {
    let xosc = setup_xosc_blocking(xosc_dev, HertzU32::from_raw(XOSC_HZ))
        .map_err(|_| Error::ClockInit)?;
    // One watchdog tick per microsecond.
    watchdog.enable_tick_generation((XOSC_HZ / 1_000_000) as u8);

    let mut clocks = ClocksManager::new(clocks_dev);
    let pll_sys = setup_pll_blocking(
        pll_sys_dev,
        xosc.operating_frequency(),
        PLL_SYS_128MHZ,
        &mut clocks,
        resets,
    )
    .map_err(|_| Error::ClockInit)?;
    let pll_usb = setup_pll_blocking(
        pll_usb_dev,
        xosc.operating_frequency(),
        PLL_USB_48MHZ,
        &mut clocks,
        resets,
    )
    .map_err(|_| Error::ClockInit)?;

    clocks
        .init_default(&xosc, &pll_sys, &pll_usb)
        .map_err(|_| Error::ClockInit)?;

    #[cfg(feature = "defmt")]
    defmt::debug!("clocks: sys {=u32} Hz", clocks.system_clock.freq().to_Hz());

    Ok(clocks)
}
