//! Route DMA completions to their handlers.
//!
//! One interrupt line may carry completions of several channels. Each
//! handler checks and clears its own channel's latched bit, so bits of
//! channels owned by other code are never touched:
//!
//! ```ignore
//! #[task(binds = DMA_IRQ_0, shared = [input])]
//! fn dma_irq_0(mut cx: dma_irq_0::Context) {
//!     cx.shared.input.lock(|input| {
//!         dispatch::service(&mut [input]);
//!     });
//! }
//! ```

use crate::handler::CompletionHandler;

/// Acknowledge and handle every latched completion owned by `handlers`.
///
/// All bits are cleared before any handler runs, so a block that completes
/// after the re-arm latches a fresh bit instead of being lost. Returns the
/// mask of channels that were handled.
pub fn service(handlers: &mut [&mut dyn CompletionHandler]) -> u32 {
    let handled = handlers.iter_mut().fold(0u32, |mask, handler| {
        if handler.take_completion() {
            mask | channel_bit(handler.channel_id())
        } else {
            mask
        }
    });
    if handled != 0 {
        dispatch(handled, handlers);
    }
    handled
}

/// Call the handler of every channel set in `mask`, lowest channel first.
pub fn dispatch(mask: u32, handlers: &mut [&mut dyn CompletionHandler]) {
    let mut remaining = mask;
    while remaining != 0 {
        let id = remaining.trailing_zeros() as u8;
        remaining &= !channel_bit(id);
        if let Some(handler) = handlers.iter_mut().find(|h| h.channel_id() == id) {
            handler.on_completion();
        }
    }
}

fn channel_bit(id: u8) -> u32 {
    1u32 << (id & 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        id: u8,
        latched: bool,
        calls: u32,
        /// Value of `latched` seen by `on_completion`.
        latched_at_call: Option<bool>,
    }

    impl Counter {
        fn new(id: u8) -> Self {
            Counter {
                id,
                latched: false,
                calls: 0,
                latched_at_call: None,
            }
        }
    }

    impl CompletionHandler for Counter {
        fn channel_id(&self) -> u8 {
            self.id
        }

        fn take_completion(&mut self) -> bool {
            core::mem::replace(&mut self.latched, false)
        }

        fn on_completion(&mut self) -> bool {
            self.calls += 1;
            self.latched_at_call = Some(self.latched);
            true
        }
    }

    #[test]
    fn routes_latched_channels_only() {
        let mut a = Counter::new(0);
        let mut b = Counter::new(3);
        b.latched = true;

        let handled = service(&mut [&mut a, &mut b]);

        assert_eq!(handled, 1 << 3);
        assert_eq!(a.calls, 0);
        assert_eq!(b.calls, 1);
        assert!(!b.latched);
    }

    #[test]
    fn both_channels_on_one_line() {
        let mut a = Counter::new(0);
        let mut b = Counter::new(1);
        a.latched = true;
        b.latched = true;

        assert_eq!(service(&mut [&mut a, &mut b]), 0b11);
        assert_eq!((a.calls, b.calls), (1, 1));
    }

    #[test]
    fn acknowledged_before_handling() {
        let mut a = Counter::new(2);
        a.latched = true;
        service(&mut [&mut a]);
        assert_eq!(a.latched_at_call, Some(false));
    }

    #[test]
    fn spurious_interrupt_is_harmless() {
        let mut a = Counter::new(2);
        assert_eq!(service(&mut [&mut a]), 0);
        assert_eq!(a.calls, 0);
    }

    #[test]
    fn dispatch_goes_lowest_channel_first() {
        struct Order<'a> {
            id: u8,
            log: &'a core::cell::RefCell<[u8; 2]>,
            at: &'a core::cell::Cell<usize>,
        }
        impl CompletionHandler for Order<'_> {
            fn channel_id(&self) -> u8 {
                self.id
            }
            fn take_completion(&mut self) -> bool {
                true
            }
            fn on_completion(&mut self) -> bool {
                let i = self.at.get();
                self.log.borrow_mut()[i] = self.id;
                self.at.set(i + 1);
                true
            }
        }

        let log = core::cell::RefCell::new([0u8; 2]);
        let at = core::cell::Cell::new(0);
        let mut high = Order { id: 7, log: &log, at: &at };
        let mut low = Order { id: 2, log: &log, at: &at };

        assert_eq!(service(&mut [&mut high, &mut low]), (1 << 7) | (1 << 2));
        assert_eq!(*log.borrow(), [2, 7]);
    }
}
