// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Submission host selection

use rand::seq::IndexedRandom;
use rand::Rng;

/// Stateless uniform picker over the configured submission hosts
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoteHostSelector;

impl RemoteHostSelector {
    /// Pick one host at random; `None` means submit locally
    pub fn select(hosts: &[String]) -> Option<&str> {
        Self::select_with(hosts, &mut rand::rng())
    }

    pub fn select_with<'a, R: Rng + ?Sized>(hosts: &'a [String], rng: &mut R) -> Option<&'a str> {
        hosts.choose(rng).map(String::as_str)
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
