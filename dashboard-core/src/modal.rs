use std::sync::atomic::{AtomicBool, Ordering};

/// Open/closed flags of the two dashboard modals.
///
/// Background polling is suspended whenever either one is open. The check is
/// advisory: readers sample it, nothing blocks on it.
#[derive(Debug, Default)]
pub struct ModalGuard {
    detail_open: AtomicBool,
    fix_open: AtomicBool,
}

impl ModalGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_detail_open(&self, open: bool) {
        self.detail_open.store(open, Ordering::SeqCst);
    }

    pub fn set_fix_open(&self, open: bool) {
        self.fix_open.store(open, Ordering::SeqCst);
    }

    pub fn detail_open(&self) -> bool {
        self.detail_open.load(Ordering::SeqCst)
    }

    pub fn fix_open(&self) -> bool {
        self.fix_open.load(Ordering::SeqCst)
    }

    pub fn polling_suspended(&self) -> bool {
        self.detail_open() || self.fix_open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suspended_while_any_modal_is_open() {
        let guard = ModalGuard::new();
        assert!(!guard.polling_suspended());

        guard.set_detail_open(true);
        assert!(guard.polling_suspended());
        guard.set_fix_open(true);
        guard.set_detail_open(false);
        assert!(guard.polling_suspended());

        guard.set_fix_open(false);
        assert!(!guard.polling_suspended());
    }
}
