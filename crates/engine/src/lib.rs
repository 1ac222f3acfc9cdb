// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Batch job transition engine
//!
//! Drives jobs from BOOTSTRAPPING through submission and monitoring to a
//! terminal state. Every transition reads the job fresh from disk, may call
//! the scheduler adapter, and saves inside a save point.

mod bootstrap;
mod cancel;
mod engine;
mod error;
mod helper;
mod monitor;
mod poller;
mod submit;
mod transition;

#[cfg(test)]
mod test_support;

pub use bootstrap::BootstrapMonitor;
pub use cancel::CancelTransition;
pub use engine::Engine;
pub use error::TransitionError;
pub use helper::{tail, JobTransitionHelper, OUTPUT_TAIL_BYTES};
pub use monitor::{MonitorArrayTransition, MonitorSingletonTransition, MonitorTransition};
pub use poller::{PollFailure, PollReport};
pub use submit::{FailedSubmissionTransition, SubmitTransition};
pub use transition::{TransitionContext, TransitionOutcome};
