use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;

/// The pause a worker takes after finishing a page, while it still holds its
/// pool permit. Load shedding toward the remote side rather than a
/// correctness requirement, which is why it is injectable: tests run with
/// `Pacing::none()`.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    success_min: Duration,
    success_max: Duration,
    failure: Duration,
}

impl Pacing {
    /// 1–2 s after a served page, a flat 3 s after a failed one.
    pub fn polite() -> Self {
        Self {
            success_min: Duration::from_secs(1),
            success_max: Duration::from_secs(2),
            failure: Duration::from_secs(3),
        }
    }

    /// Zero-delay policy.
    pub fn none() -> Self {
        Self {
            success_min: Duration::ZERO,
            success_max: Duration::ZERO,
            failure: Duration::ZERO,
        }
    }

    pub(crate) async fn after_success(&self) {
        let delay = if self.success_max > self.success_min {
            let span = self.success_min.as_millis() as u64..=self.success_max.as_millis() as u64;
            Duration::from_millis(rand::thread_rng().gen_range(span))
        } else {
            self.success_min
        };
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }

    pub(crate) async fn after_failure(&self) {
        if !self.failure.is_zero() {
            sleep(self.failure).await;
        }
    }
}
