//! RAII guard for the in-process single-flight upload slot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Holds the upload slot; releases it on drop, including on cancellation.
pub struct InFlightGuard {
    slot: Arc<AtomicBool>,
}

impl InFlightGuard {
    /// Claim the slot. Returns `None` if another upload holds it.
    pub fn try_acquire(slot: &Arc<AtomicBool>) -> Option<Self> {
        slot.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { slot: Arc::clone(slot) })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.slot.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_is_exclusive_until_dropped() {
        let slot = Arc::new(AtomicBool::new(false));

        let guard = InFlightGuard::try_acquire(&slot);
        assert!(guard.is_some());
        assert!(InFlightGuard::try_acquire(&slot).is_none());

        drop(guard);
        assert!(InFlightGuard::try_acquire(&slot).is_some());
    }
}
