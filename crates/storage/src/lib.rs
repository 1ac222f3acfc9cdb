// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bj-storage: durable, filesystem-only job state
//!
//! Every write is an atomic replace-by-rename, so independent processes can
//! read and write the same job tree without any lock.

pub mod active_index;
pub mod catalog;
pub mod controls;
pub mod fs;
pub mod job;
pub mod store;

pub use active_index::{active_job_ids, reconcile, ACTIVE_INDEX_FILE};
pub use catalog::{Catalog, Record};
pub use controls::{merge, ControlKey, Controls, ControlsDir, EffectiveView};
pub use job::{Job, JobDir, METADATA_FILE};
pub use store::{BrokenMetadata, BrokenReason, Loaded, MetadataStore, SavePoint, StoreError};
