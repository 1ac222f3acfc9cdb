// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod job;
pub mod poll;
pub mod script;
pub mod template;

use crate::error::BjError;
use bj_core::Matcher;

/// Compile repeated `--filter key=patterns` arguments
pub(crate) fn matcher(filters: &[String]) -> Result<Matcher, BjError> {
    Matcher::parse(filters).map_err(|e| {
        BjError::new(e.to_string())
            .with_suggestion("Filters look like --filter job_type=RUNNING,SUBMITTED")
    })
}
