use std::time::Duration;

use tokio::time::Instant;

use crate::error::DeadlineExceeded;

/// Absolute expiry for a single service operation.
///
/// Created once per call and passed by reference to every storage call that
/// operation makes, so sequential calls share one budget.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            expires_at: Instant::now() + budget,
            budget,
        }
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    pub fn check(&self) -> Result<(), DeadlineExceeded> {
        if self.is_expired() {
            Err(DeadlineExceeded {
                budget: self.budget,
            })
        } else {
            Ok(())
        }
    }
}
