//! Double buffering for the DMA blocks.
//!
//! One [`DoubleBuffer`] per direction. The DMA engine works on one slot
//! while the application works on the other; completion handlers exchange
//! the roles.

mod double_buffer;

pub use double_buffer::{DoubleBuffer, Slot};
