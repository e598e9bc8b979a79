//! Tool execution with per-call timeout and retry
//!
//! Tools never retry on their own. The executor wraps registry dispatch with
//! a timeout and retries retryable failures with exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::tools::{ToolCall, ToolRegistry, ToolResult};

/// Timeout and retry settings applied to every tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolPolicy {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for ToolPolicy {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 2,
            initial_backoff_ms: 500,
            max_backoff_ms: 10_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl ToolPolicy {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let base = self.initial_backoff_ms as f64 * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis((base as u64).min(self.max_backoff_ms))
    }
}

/// Runs tool calls against a registry under a [`ToolPolicy`]
#[derive(Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    policy: ToolPolicy,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>, policy: ToolPolicy) -> Self {
        let timeout = policy.timeout();
        Self {
            registry,
            policy,
            timeout,
        }
    }

    /// Override the per-call timeout (sub-second precision)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn policy(&self) -> &ToolPolicy {
        &self.policy
    }

    /// Execute one call, retrying retryable errors up to `max_retries` times
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult, ToolError> {
        let mut attempt = 0u32;

        loop {
            let outcome = match tokio::time::timeout(
                self.timeout,
                self.registry.dispatch(&call.name, call.params.clone()),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(ToolError::Timeout(self.timeout)),
            };

            match outcome {
                Ok(result) => {
                    debug!(
                        tool = %call.name,
                        call_id = %call.call_id,
                        records = result.len(),
                        "Tool call completed"
                    );
                    return Ok(result);
                }
                Err(e) if e.is_retryable() && attempt < self.policy.max_retries => {
                    let delay = match &e {
                        ToolError::RateLimited {
                            retry_after: Some(after),
                        } => *after,
                        _ => self.policy.backoff(attempt),
                    };
                    warn!(
                        tool = %call.name,
                        attempt = attempt + 1,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying tool call"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
