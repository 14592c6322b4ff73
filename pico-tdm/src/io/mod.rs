//! DMA-driven TDM input and output.
//!
//! ## Components
//!
//! | Type | FIFO | Interrupt | Application side |
//! |------|------|-----------|------------------|
//! | [`TdmInput`] | RX | `DMA_IRQ_0` | [`reading()`](TdmInput::reading) |
//! | [`TdmOutput`] | TX | `DMA_IRQ_1` | [`writing_mut()`](TdmOutput::writing_mut) |
//!
//! ## Utilities
//!
//! - [`frame`]: 24-bit sample packing for slot words
//!
//! ## Block layout
//!
//! Each direction uses a [`DoubleBuffer`](crate::buffer::DoubleBuffer) of
//! two `[u32; N]` slots:
//! - Each `u32` is one TDM slot, MSB first on the wire
//! - One block of `N` words is exactly one frame
//! - The DMA engine works on one slot while the application uses the other
//! - Every block completion swaps the two

pub mod frame;
pub mod input_tdm;
pub mod output_tdm;

pub use input_tdm::TdmInput;
pub use output_tdm::TdmOutput;
