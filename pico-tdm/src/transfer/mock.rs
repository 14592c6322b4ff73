//! Software stand-in for a DMA channel.
//!
//! [`MockChannel`] records every register write a real channel would see and
//! latches completions the way `INTS0`/`INTS1` do, so the completion path
//! runs on the host.

use super::{ChannelConfig, DmaChannel, IrqLine};

/// Records configuration, addresses, triggers and latched completions.
#[derive(Debug, Default)]
pub struct MockChannel {
    id: u8,
    pub config: Option<ChannelConfig>,
    pub read_addr: Option<*const u32>,
    pub write_addr: Option<*mut u32>,
    /// Number of address writes with `trigger = true`.
    pub triggers: u32,
    /// Number of address writes with `trigger = false`.
    pub silent_writes: u32,
    /// Completion latched and not yet checked.
    pub latched: bool,
    /// Number of latched completions cleared by `check_irq`.
    pub acknowledged: u32,
}

impl MockChannel {
    /// An unconfigured channel with hardware number `id`.
    pub fn new(id: u8) -> Self {
        MockChannel {
            id,
            ..Default::default()
        }
    }

    /// Latch a block completion, as the engine does when `TRANS_COUNT`
    /// reaches zero.
    pub fn raise(&mut self) {
        self.latched = true;
    }

    fn count(&mut self, trigger: bool) {
        if trigger {
            self.triggers += 1;
        } else {
            self.silent_writes += 1;
        }
    }
}

impl DmaChannel for MockChannel {
    fn id(&self) -> u8 {
        self.id
    }

    fn configure(&mut self, config: &ChannelConfig) {
        self.config = Some(*config);
    }

    fn set_read_addr(&mut self, addr: *const u32, trigger: bool) {
        self.read_addr = Some(addr);
        self.count(trigger);
    }

    fn set_write_addr(&mut self, addr: *mut u32, trigger: bool) {
        self.write_addr = Some(addr);
        self.count(trigger);
    }

    fn check_irq(&mut self, line: IrqLine) -> bool {
        // Only the configured line ever latches.
        let enabled = self.config.is_some_and(|config| config.irq == line);
        if !(enabled && self.latched) {
            return false;
        }
        self.latched = false;
        self.acknowledged += 1;
        true
    }
}
