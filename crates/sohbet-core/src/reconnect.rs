use serde::{Deserialize, Serialize};

/// Exponential backoff for the status hub connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    pub initial_delay_ms: u32,
    pub max_delay_ms: u32,
    /// `None` retries forever
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1_000,
            max_delay_ms: 30_000,
            max_attempts: Some(10),
        }
    }
}

impl ReconnectPolicy {
    /// Delay before retry number `attempt` (zero based), or `None` once the
    /// attempts are used up
    pub fn delay_for(&self, attempt: u32) -> Option<u32> {
        if let Some(max) = self.max_attempts {
            if attempt >= max {
                return None;
            }
        }
        let factor = 2_u32.checked_pow(attempt).unwrap_or(u32::MAX);
        Some(
            self.initial_delay_ms
                .saturating_mul(factor)
                .min(self.max_delay_ms),
        )
    }
}

/// Attempt counter driven by a [`ReconnectPolicy`]
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: ReconnectPolicy,
    attempt: u32,
}

impl Backoff {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    pub fn next_delay(&mut self) -> Option<u32> {
        let delay = self.policy.delay_for(self.attempt)?;
        self.attempt += 1;
        Some(delay)
    }

    /// Called after every successful handshake
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}
