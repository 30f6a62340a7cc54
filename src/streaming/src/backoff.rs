// Copyright 2026 The firestore-mobile-core Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Exponential backoff coupled to the worker queue (§4.1).
//!
//! Unlike a generic retry-policy object, [`BackoffController`] owns the
//! scheduling itself: `run_after_delay` both schedules the caller's task and
//! advances `current_delay` for next time, so callers never have to remember
//! to call a separate "record failure" step.

use std::time::Duration;

use firestore_mobile_gax::{Error, Result};
use firestore_mobile_transport::{DelayedTask, WorkerQueue};

const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_FACTOR: f64 = 1.5;
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Validated, immutable backoff parameters.
///
/// Constructed through [`BackoffConfig::builder`]; out-of-range values are
/// rejected rather than silently clamped, mirroring the corpus's own
/// backoff/polling configuration validation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffConfig {
    initial_delay: Duration,
    factor: f64,
    max_delay: Duration,
}

impl BackoffConfig {
    pub fn builder() -> BackoffConfigBuilder {
        BackoffConfigBuilder::new()
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            factor: DEFAULT_FACTOR,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

/// Builds a [`BackoffConfig`], validating at `build()` time.
#[derive(Clone, Copy, Debug)]
pub struct BackoffConfigBuilder {
    initial_delay: Duration,
    factor: f64,
    max_delay: Duration,
}

impl BackoffConfigBuilder {
    pub fn new() -> Self {
        let defaults = BackoffConfig::default();
        Self {
            initial_delay: defaults.initial_delay,
            factor: defaults.factor,
            max_delay: defaults.max_delay,
        }
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn build(self) -> Result<BackoffConfig> {
        if self.initial_delay.is_zero() {
            return Err(Error::other(format!(
                "initial delay must be greater than zero, got {:?}",
                self.initial_delay
            )));
        }
        if self.factor < 1.0 {
            return Err(Error::other(format!("factor ({}) must be >= 1.0", self.factor)));
        }
        if self.max_delay < self.initial_delay {
            return Err(Error::other(format!(
                "max delay ({:?}) must be >= initial delay ({:?})",
                self.max_delay, self.initial_delay
            )));
        }
        Ok(BackoffConfig {
            initial_delay: self.initial_delay,
            factor: self.factor,
            max_delay: self.max_delay,
        })
    }
}

impl Default for BackoffConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Exponentially growing delay generator, bound to one [`WorkerQueue`].
///
/// `current_delay` starts at zero so the first `run_after_delay` fires
/// immediately; every call after that grows it by `factor`, clamped to
/// `max_delay`. `reset`/`reset_to_max` are the only ways `current_delay`
/// moves outside that growth sequence (§4.5 close protocol, §7 resource
/// exhaustion).
pub struct BackoffController {
    queue: WorkerQueue,
    config: BackoffConfig,
    current_delay: Duration,
    pending: Option<DelayedTask>,
}

impl BackoffController {
    pub fn new(queue: WorkerQueue) -> Self {
        Self::with_config(queue, BackoffConfig::default())
    }

    pub fn with_config(queue: WorkerQueue, config: BackoffConfig) -> Self {
        Self {
            queue,
            config,
            current_delay: Duration::ZERO,
            pending: None,
        }
    }

    /// The delay the *next* `run_after_delay` call will use, before it grows.
    pub fn current_delay(&self) -> Duration {
        self.current_delay
    }

    /// Schedules `task` to run on the worker queue after `current_delay`,
    /// then grows `current_delay` for the following call. Optional jitter
    /// (±20%, per §4.1) is applied to the delay actually scheduled; the
    /// stored `current_delay` itself is not jittered, so growth stays
    /// deterministic and observable in tests.
    pub fn run_after_delay(&mut self, task: impl FnOnce() + Send + 'static) {
        self.cancel();
        let delay = jittered(self.current_delay);
        self.pending = Some(self.queue.dispatch_after(delay, task));
        self.current_delay = self.grown();
    }

    fn grown(&self) -> Duration {
        let scaled = self.current_delay.mul_f64(self.config.factor);
        scaled.clamp(self.config.initial_delay, self.config.max_delay)
    }

    /// Cancels any pending task and resets `current_delay` to zero, so the
    /// next `run_after_delay` fires immediately. Called on clean close.
    pub fn reset(&mut self) {
        self.cancel();
        self.current_delay = Duration::ZERO;
    }

    /// Saturates `current_delay` to `max_delay`, used to throttle
    /// aggressively after a `ResourceExhausted` signal (§7).
    pub fn reset_to_max(&mut self) {
        self.current_delay = self.config.max_delay;
    }

    /// Cancels any pending task without touching `current_delay`.
    pub fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.cancel();
        }
    }
}

/// Applies up to ±20% jitter to `delay`, per §4.1 ("jitter is not required
/// but is permissible").
fn jittered(delay: Duration) -> Duration {
    if delay.is_zero() {
        return delay;
    }
    let factor = rand::random_range(0.8..=1.2);
    delay.mul_f64(factor)
}
