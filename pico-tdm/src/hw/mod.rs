//! RP2040 bindings.
//!
//! | Module | Hardware |
//! |--------|----------|
//! | [`pio`] | `tdm` and `tdm_mclk` state machines |
//! | [`dma`] | HAL DMA channels as one-shot block transfers |
//! | [`clocks`] | 128 MHz system clock |
//!
//! The GPIOs named in [`PinMap`](crate::config::PinMap) must be switched to
//! the PIO function by the caller before the bus is started.

pub mod clocks;
pub mod dma;
pub mod pio;
