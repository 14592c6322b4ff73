//! Two-slot buffer with exchangeable reading/writing roles.
//!
//! ```text
//!            reading ──► ┌────────────┐
//!                        │ slot A [N] │
//!                        └────────────┘
//!            writing ──► ┌────────────┐
//!                        │ slot B [N] │
//!                        └────────────┘
//! ```
//!
//! The roles are a single slot index. `writing` is always the other index,
//! so both roles can never name the same slot. [`swap()`](DoubleBuffer::swap)
//! flips that index and never copies sample data.
//!
//! ## Single-owner contract
//!
//! Each role has exactly one owner between two swaps. For the input
//! direction the DMA engine owns the writing slot and the application reads
//! the reading slot. For the output direction the DMA engine owns the reading
//! slot and the application fills the writing slot. Only the completion
//! handler of the bound transfer channel calls `swap()`.

/// Index of one of the two slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slot {
    A = 0,
    B = 1,
}

impl Slot {
    /// The slot not named by `self`.
    pub const fn other(self) -> Slot {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// A pair of `N`-word slots with a reading role, a writing role and a
/// pending-swap guard.
pub struct DoubleBuffer<const N: usize> {
    slots: [[u32; N]; 2],
    reading: Slot,
    pending_swap: bool,
    swaps: u32,
}

impl<const N: usize> DoubleBuffer<N> {
    /// Zeroed slots, `reading = A`, `writing = B`, swap pending.
    pub const fn new() -> Self {
        DoubleBuffer {
            slots: [[0; N]; 2],
            reading: Slot::A,
            pending_swap: true,
            swaps: 0,
        }
    }

    /// Exchange the reading and writing roles if a swap is pending.
    ///
    /// Returns `false` and changes nothing when no swap is pending.
    pub fn swap(&mut self) -> bool {
        if !self.pending_swap {
            return false;
        }
        self.reading = self.reading.other();
        self.pending_swap = false;
        self.swaps = self.swaps.wrapping_add(1);
        true
    }

    /// Mark the next [`swap()`](Self::swap) as due.
    pub fn request_swap(&mut self) {
        self.pending_swap = true;
    }

    /// Whether the next `swap()` will exchange the roles.
    pub fn is_swap_pending(&self) -> bool {
        self.pending_swap
    }

    /// Swaps performed so far (wrapping).
    pub fn swap_count(&self) -> u32 {
        self.swaps
    }

    /// Slot currently in the reading role.
    pub fn reading_slot(&self) -> Slot {
        self.reading
    }

    /// Slot currently in the writing role. Always the other one.
    pub fn writing_slot(&self) -> Slot {
        self.reading.other()
    }

    /// Contents of the reading slot.
    pub fn reading(&self) -> &[u32; N] {
        self.slot(self.reading_slot())
    }

    /// Contents of the writing slot.
    pub fn writing(&self) -> &[u32; N] {
        self.slot(self.writing_slot())
    }

    /// Fill the writing slot.
    pub fn writing_mut(&mut self) -> &mut [u32; N] {
        self.slot_mut(self.writing_slot())
    }

    /// Contents of `slot`, whatever its role.
    pub fn slot(&self, slot: Slot) -> &[u32; N] {
        &self.slots[slot.index()]
    }

    /// Mutable contents of `slot`, whatever its role.
    pub fn slot_mut(&mut self, slot: Slot) -> &mut [u32; N] {
        &mut self.slots[slot.index()]
    }

    /// Start address of the reading slot, for a DMA read pointer.
    pub fn reading_ptr(&self) -> *const u32 {
        self.slots[self.reading_slot().index()].as_ptr()
    }

    /// Start address of the writing slot, for a DMA write pointer.
    pub fn writing_ptr(&mut self) -> *mut u32 {
        self.slots[self.writing_slot().index()].as_mut_ptr()
    }
}

impl<const N: usize> Default for DoubleBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_reads_a_writes_b() {
        let buf = DoubleBuffer::<4>::new();
        assert_eq!(buf.reading_slot(), Slot::A);
        assert_eq!(buf.writing_slot(), Slot::B);
        assert!(buf.is_swap_pending());
        assert_eq!(buf.swap_count(), 0);
        assert_eq!(buf.reading(), &[0; 4]);
        assert_eq!(buf.writing(), &[0; 4]);
    }

    #[test]
    fn swap_publishes_written_slot() {
        let mut buf = DoubleBuffer::<4>::new();
        *buf.writing_mut() = [1, 2, 3, 4];

        assert!(buf.swap());

        assert_eq!(buf.reading(), &[1, 2, 3, 4]);
        assert_eq!(buf.writing(), &[0, 0, 0, 0]);
        assert_eq!(buf.reading_slot(), Slot::B);
        assert!(!buf.is_swap_pending());
    }

    #[test]
    fn second_swap_without_request_is_noop() {
        let mut buf = DoubleBuffer::<4>::new();
        assert!(buf.swap());
        let reading = buf.reading_slot();

        assert!(!buf.swap());
        assert_eq!(buf.reading_slot(), reading);
        assert_eq!(buf.swap_count(), 1);
    }

    #[test]
    fn request_swap_rearms_guard() {
        let mut buf = DoubleBuffer::<2>::new();
        assert!(buf.swap());
        buf.request_swap();
        assert!(buf.is_swap_pending());
        assert!(buf.swap());
        assert_eq!(buf.reading_slot(), Slot::A);
        assert_eq!(buf.swap_count(), 2);
    }

    #[test]
    fn pointers_follow_roles() {
        let mut buf = DoubleBuffer::<8>::new();
        let a = buf.slot(Slot::A).as_ptr();
        let b = buf.slot(Slot::B).as_ptr();
        assert_eq!(buf.reading_ptr(), a);
        assert_eq!(buf.writing_ptr() as *const u32, b);

        buf.swap();
        assert_eq!(buf.reading_ptr(), b);
        assert_eq!(buf.writing_ptr() as *const u32, a);
    }

    #[test]
    fn swap_does_not_touch_data() {
        let mut buf = DoubleBuffer::<3>::new();
        *buf.slot_mut(Slot::A) = [7, 8, 9];
        *buf.slot_mut(Slot::B) = [4, 5, 6];
        buf.swap();
        assert_eq!(buf.slot(Slot::A), &[7, 8, 9]);
        assert_eq!(buf.slot(Slot::B), &[4, 5, 6]);
    }

    proptest! {
        #[test]
        fn roles_stay_distinct(requests in proptest::collection::vec(any::<bool>(), 0..256)) {
            let mut buf = DoubleBuffer::<4>::new();
            for request in requests {
                if request {
                    buf.request_swap();
                }
                buf.swap();
                prop_assert_ne!(buf.reading_slot(), buf.writing_slot());
                prop_assert_ne!(buf.reading_ptr(), buf.writing_ptr() as *const u32);
            }
        }

        #[test]
        fn even_swaps_round_trip(pairs in 0usize..128) {
            let mut buf = DoubleBuffer::<4>::new();
            for _ in 0..pairs * 2 {
                buf.request_swap();
                prop_assert!(buf.swap());
            }
            prop_assert_eq!(buf.reading_slot(), Slot::A);
            prop_assert_eq!(buf.writing_slot(), Slot::B);
        }
    }
}
