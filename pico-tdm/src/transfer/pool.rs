use core::cell::Cell;

use critical_section::Mutex;

use crate::constants::DMA_CHANNEL_COUNT;
use crate::error::Error;

const ALL_CHANNELS: u16 = (1 << DMA_CHANNEL_COUNT) - 1;

/// Claim bitmap over the DMA channels.
///
/// Bit N set means channel N is claimed. Claims are made once at startup and
/// never released; the pool only guarantees that no channel is handed out
/// twice, even when claimed from an interrupt. The Cortex-M0+ has no atomic
/// read-modify-write, so the bitmap is guarded by a critical section.
pub struct ChannelPool {
    claimed: Mutex<Cell<u16>>,
}

impl ChannelPool {
    /// All channels free.
    pub const fn new() -> Self {
        ChannelPool {
            claimed: Mutex::new(Cell::new(0)),
        }
    }

    /// Claim the lowest free channel.
    pub fn claim_unused(&self) -> Result<u8, Error> {
        critical_section::with(|cs| {
            let claimed = self.claimed.borrow(cs);
            let free = !claimed.get() & ALL_CHANNELS;
            if free == 0 {
                return Err(Error::NoFreeChannel);
            }
            let id = free.trailing_zeros() as u8;
            claimed.set(claimed.get() | (1 << id));
            Ok(id)
        })
    }

    /// Claim a specific channel.
    pub fn claim(&self, id: u8) -> Result<(), Error> {
        if id >= DMA_CHANNEL_COUNT {
            return Err(Error::InvalidChannel(id));
        }
        let bit = 1u16 << id;
        critical_section::with(|cs| {
            let claimed = self.claimed.borrow(cs);
            if claimed.get() & bit != 0 {
                return Err(Error::ChannelInUse(id));
            }
            claimed.set(claimed.get() | bit);
            Ok(())
        })
    }

    /// Whether channel `id` has been handed out.
    pub fn is_claimed(&self, id: u8) -> bool {
        id < DMA_CHANNEL_COUNT && self.bits() & (1 << id) != 0
    }

    /// Number of channels handed out.
    pub fn claimed_count(&self) -> u32 {
        self.bits().count_ones()
    }

    fn bits(&self) -> u16 {
        critical_section::with(|cs| self.claimed.borrow(cs).get())
    }
}

impl Default for ChannelPool {
    fn default() -> Self {
        Self::new()
    }
}
