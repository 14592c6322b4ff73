/// Completion interrupt capability of one transfer direction.
///
/// Implemented by [`TdmInput`](crate::io::TdmInput) and
/// [`TdmOutput`](crate::io::TdmOutput). The [`dispatch`](crate::dispatch)
/// module asks every handler to [`take_completion`](Self::take_completion)
/// and then calls [`on_completion`](Self::on_completion) for those that had
/// one latched.
pub trait CompletionHandler {
    /// DMA channel number this handler services.
    fn channel_id(&self) -> u8;

    /// Clear this channel's latched completion on its own interrupt line.
    /// Returns whether one was latched.
    fn take_completion(&mut self) -> bool;

    /// Handle one block completion. Must not block or allocate.
    ///
    /// Returns `true` if the bound buffer swapped.
    fn on_completion(&mut self) -> bool;
}
