use std::sync::Arc;
use tokio::sync::watch;

/// Readiness flag separating the first (placeholder) paint from the
/// interactive one. Client-restored state is only trusted once it is open.
#[derive(Clone)]
pub struct HydrationGate {
    tx: Arc<watch::Sender<bool>>,
}

impl HydrationGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn is_open(&self) -> bool {
        *self.tx.borrow()
    }

    /// Returns true only for the call that actually opened the gate.
    pub fn open(&self) -> bool {
        self.tx.send_if_modified(|open| {
            if *open {
                false
            } else {
                *open = true;
                true
            }
        })
    }

    pub async fn wait_open(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|open| *open).await;
    }
}

impl Default for HydrationGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn gate_opens_once() {
        let gate = HydrationGate::new();
        assert!(!gate.is_open());
        assert!(gate.open());
        assert!(gate.is_open());
        assert!(!gate.open());
    }

    #[tokio::test]
    async fn wait_open_resolves_after_open() {
        let gate = HydrationGate::new();
        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.wait_open().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());
        gate.open();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("gate waiter timed out")
            .expect("gate waiter panicked");
    }
}
