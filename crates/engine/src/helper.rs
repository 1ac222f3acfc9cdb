// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time-bounded adapter calls and structured failure diagnostics

use bj_adapters::{AdapterError, AdapterOperation, AdapterOutput};
use bj_core::{Clock, Diagnostic};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

/// Adapter output kept in a diagnostic, per stream
pub const OUTPUT_TAIL_BYTES: usize = 16 * 1024;

/// Last `max` bytes of `text`, cut forward to a char boundary
pub fn tail(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut start = text.len() - max;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

/// Runs adapter calls for transitions.
///
/// Every call is bounded by the adapter timeout. Anything other than exit 0
/// with parseable output comes back as a [`Diagnostic`].
pub struct JobTransitionHelper<'a, C> {
    clock: &'a C,
    timeout: Duration,
}

impl<'a, C: Clock> JobTransitionHelper<'a, C> {
    pub fn new(clock: &'a C, timeout: Duration) -> Self {
        Self { clock, timeout }
    }

    /// Await `call`, requiring exit 0.
    ///
    /// On timeout the call is dropped, which kills the adapter subprocess.
    pub async fn run<F>(&self, op: AdapterOperation, call: F) -> Result<AdapterOutput, Diagnostic>
    where
        F: Future<Output = Result<AdapterOutput, AdapterError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Err(_) => Err(self.diagnostic(
                op,
                None,
                true,
                format!(
                    "adapter {} timed out after {}",
                    op,
                    humantime::format_duration(self.timeout)
                ),
            )),
            Ok(Err(e)) => Err(self.diagnostic(op, None, false, e.to_string())),
            Ok(Ok(output)) if !output.is_success() => {
                let mut message = format!("adapter {} exited with status {}", op, output.exit_code);
                if let Some(line) = output.stderr.lines().rev().find(|l| !l.trim().is_empty()) {
                    message.push_str(": ");
                    message.push_str(line.trim());
                }
                Err(self.diagnostic(op, Some(&output), false, message))
            }
            Ok(Ok(output)) => Ok(output),
        }
    }

    /// Like [`run`](Self::run), then parse stdout as JSON
    pub async fn run_json<T, F>(
        &self,
        op: AdapterOperation,
        call: F,
    ) -> Result<(T, AdapterOutput), Diagnostic>
    where
        T: DeserializeOwned,
        F: Future<Output = Result<AdapterOutput, AdapterError>>,
    {
        let output = self.run(op, call).await?;
        match serde_json::from_str::<T>(output.stdout.trim()) {
            Ok(value) => Ok((value, output)),
            Err(e) => Err(self.diagnostic(
                op,
                Some(&output),
                false,
                format!("unparseable adapter {} output: {}", op, e),
            )),
        }
    }

    /// Build a diagnostic stamped with the current time
    pub fn diagnostic(
        &self,
        op: AdapterOperation,
        output: Option<&AdapterOutput>,
        timed_out: bool,
        message: String,
    ) -> Diagnostic {
        Diagnostic {
            operation: op.to_string(),
            exit_code: output.map(|o| o.exit_code),
            timed_out,
            stdout: output
                .map(|o| tail(&o.stdout, OUTPUT_TAIL_BYTES).to_string())
                .unwrap_or_default(),
            stderr: output
                .map(|o| tail(&o.stderr, OUTPUT_TAIL_BYTES).to_string())
                .unwrap_or_default(),
            message: Some(message),
            recorded_at: self.clock.now(),
        }
    }
}

#[cfg(test)]
#[path = "helper_tests.rs"]
mod tests;
