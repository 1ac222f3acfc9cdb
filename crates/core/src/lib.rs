// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bj-core: domain model for the batch job (bj) lifecycle engine
//!
//! This crate provides:
//! - The closed job state set and task states
//! - Versioned metadata documents with a typed migration chain
//! - Load/save schema validation
//! - Attribute filtering and submission host selection
//! - Clock, id generation and configuration

pub mod clock;
pub mod config;
pub mod host;
pub mod id;
pub mod job_type;
pub mod matcher;
pub mod metadata;
pub mod validation;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{AdapterConfig, Config, ConfigError};
pub use host::RemoteHostSelector;
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use job_type::{JobKind, JobType, TaskState};
pub use matcher::{Matcher, MatcherError};
pub use metadata::{
    Diagnostic, Document, JobMetadata, MigrationError, ScriptMetadata, Submission, TaskMetadata,
    TemplateMetadata,
};
pub use validation::{ValidationContext, ValidationError, ValidationErrors};
