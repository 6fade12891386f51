// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::PlateauError;
use crate::constraints::Constraints;
use crate::control::CancelToken;
use crate::repro::ReproMode;
use std::time::{Duration, Instant};

/// Unified execution context passed through detector calls.
#[derive(Clone, Copy, Debug)]
pub struct ExecutionContext<'a> {
    pub constraints: &'a Constraints,
    pub cancel: Option<&'a CancelToken>,
    pub repro_mode: ReproMode,
}

impl<'a> ExecutionContext<'a> {
    /// Creates a context with safe defaults and no cancellation hook.
    pub fn new(constraints: &'a Constraints) -> Self {
        Self {
            constraints,
            cancel: None,
            repro_mode: ReproMode::Balanced,
        }
    }

    /// Sets the optional cancellation token.
    pub fn with_cancel(mut self, cancel: &'a CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Sets the reproducibility mode.
    pub fn with_repro_mode(mut self, repro_mode: ReproMode) -> Self {
        self.repro_mode = repro_mode;
        self
    }

    /// Returns true when cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(CancelToken::is_cancelled)
    }

    /// Returns a cancelled error when cancellation has been requested.
    pub fn check_cancelled(&self) -> Result<(), PlateauError> {
        if self.is_cancelled() {
            return Err(PlateauError::cancelled());
        }
        Ok(())
    }

    /// Checks cancellation and the time budget every `every` iterations.
    ///
    /// When `every` is zero, it is treated as one (always poll).
    pub fn check_interrupted_every(
        &self,
        iteration: usize,
        every: usize,
        started_at: Instant,
    ) -> Result<(), PlateauError> {
        let every = every.max(1);
        if iteration % every != 0 {
            return Ok(());
        }
        self.check_cancelled()?;
        self.check_time_budget(started_at)
    }

    /// Fails with `DetectionTimeout` once more than `time_budget_ms` has
    /// elapsed since `started_at`.
    pub fn check_time_budget(&self, started_at: Instant) -> Result<(), PlateauError> {
        let Some(limit_ms) = self.constraints.time_budget_ms else {
            return Ok(());
        };

        let elapsed = started_at.elapsed();
        if elapsed <= Duration::from_millis(limit_ms) {
            return Ok(());
        }

        Err(PlateauError::DetectionTimeout {
            elapsed_ms: elapsed.as_millis(),
            limit_ms,
        })
    }
}
