//! One-shot gate for unauthorized responses.
//!
//! Several requests usually fail with 401 at the same moment; only the first
//! one should log out and redirect. The gate re-arms once `reset_after_ms`
//! has passed since the last trip, so it needs no timer.

use std::sync::{Arc, Mutex};

#[derive(Clone, Debug)]
pub struct UnauthorizedGate {
    tripped_at: Arc<Mutex<Option<f64>>>,
    reset_after_ms: f64,
}

impl UnauthorizedGate {
    pub fn new(reset_after_ms: u32) -> Self {
        Self {
            tripped_at: Arc::new(Mutex::new(None)),
            reset_after_ms: f64::from(reset_after_ms),
        }
    }

    /// Returns `true` if this call tripped the gate and the caller should
    /// run the unauthorized handler.
    pub fn try_trip(&self, now_ms: f64) -> bool {
        let mut tripped_at = self
            .tripped_at
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(at) = *tripped_at
            && now_ms - at < self.reset_after_ms
        {
            return false;
        }

        *tripped_at = Some(now_ms);
        true
    }

    pub fn is_tripped(&self, now_ms: f64) -> bool {
        self.tripped_at
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some_and(|at| now_ms - at < self.reset_after_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_trip_wins() {
        let gate = UnauthorizedGate::new(1000);
        assert!(gate.try_trip(0.0));
        assert!(!gate.try_trip(10.0));
        assert!(!gate.try_trip(999.0));
        assert!(gate.is_tripped(500.0));
    }

    #[test]
    fn test_rearms_after_reset() {
        let gate = UnauthorizedGate::new(1000);
        assert!(gate.try_trip(0.0));
        assert!(!gate.is_tripped(1000.0));
        assert!(gate.try_trip(1000.0));
        assert!(!gate.try_trip(1500.0));
    }

    #[test]
    fn test_clones_share_state() {
        let gate = UnauthorizedGate::new(1000);
        let other = gate.clone();
        assert!(gate.try_trip(0.0));
        assert!(!other.try_trip(1.0));
    }
}
