//! # pico-tdm
//!
//! A `no_std`, zero-allocation TDM audio bus for the
//! [RP2040](https://www.raspberrypi.com/products/rp2040/) written in pure
//! Rust. One PIO state machine clocks 32-bit slot words in and out, a second
//! one generates the codec master clock, and two one-shot DMA channels move
//! whole frames between the PIO FIFOs and a pair of double buffers.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Memory | [`buffer`] | Two-slot buffer with reading/writing roles |
//! | Transfer | [`transfer`] | One-shot DMA channels re-armed on completion |
//! | Interrupts | [`handler`] / [`dispatch`] | Acknowledge completions, run handlers |
//! | I/O | [`io`] | TDM input and output endpoints, frame packing |
//! | Setup | [`config`] / [`context`] | Static bus configuration, both directions |
//! | Programs | `program` | `tdm` and `tdm_mclk` PIO assembly (feature-gated) |
//! | Hardware | `hw` | PIO state machines, HAL DMA channels, clocks (feature-gated) |
//!
//! ## Quick start
//!
//! ```ignore
//! use pico_tdm::buffer::DoubleBuffer;
//! use pico_tdm::config::TdmConfig;
//! use pico_tdm::context::TdmContext;
//! use pico_tdm::hw::{dma::DmaController, pio::TdmBus};
//!
//! let config = TdmConfig::DEFAULT;
//! let bus = TdmBus::new(&mut pio, sm0, sm1, &config)?;
//! let (dma, channels) = DmaController::split(pac.DMA, &mut pac.RESETS);
//!
//! let rx_buf = cortex_m::singleton!(: DoubleBuffer<8> = DoubleBuffer::new()).unwrap();
//! let tx_buf = cortex_m::singleton!(: DoubleBuffer<8> = DoubleBuffer::new()).unwrap();
//!
//! let mut ctx = TdmContext::configure(
//!     dma.claim(channels.ch0)?,
//!     dma.claim(channels.ch1)?,
//!     bus.rx_endpoint(),
//!     bus.tx_endpoint(),
//!     rx_buf,
//!     tx_buf,
//!     &config,
//! )?;
//! let bus = bus.start()?;
//! ctx.start();
//!
//! // DMA_IRQ_0 / DMA_IRQ_1:
//! dispatch::service(&mut [&mut ctx.input]);
//! dispatch::service(&mut [&mut ctx.output]);
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `rp2040` | no | `program` and `hw` modules via `rp2040-hal`, `pio` and `pio-proc` |
//! | `defmt` | no | `defmt::Format` derives and debug/trace logging |
//! | `mock` | no | `transfer::mock` test doubles outside this crate |
//!
//! ## Bus parameters
//!
//! - **Slots per frame:** 8 ([`constants::SAMPLE_BUF_SIZE`])
//! - **Slot width:** 32 bits, MSB first ([`constants::WORD_BITS`])
//! - **Bit clock:** 2 MHz from a 128 MHz system clock
//! - **Frame rate:** 7812.5 Hz, one DMA block per frame

#![cfg_attr(not(test), no_std)]

pub mod constants;
pub mod error;
pub mod config;
pub mod buffer;
pub mod transfer;
pub mod handler;
pub mod dispatch;
pub mod io;
pub mod context;

#[cfg(any(test, feature = "rp2040"))]
pub mod program;
#[cfg(feature = "rp2040")]
pub mod hw;

pub use error::{ConfigError, Error};
