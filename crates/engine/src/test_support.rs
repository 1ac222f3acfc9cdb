// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixture for transition tests

use crate::transition::TransitionContext;
use bj_adapters::FakeSchedulerAdapter;
use bj_core::{Config, FakeClock, JobKind, JobType, ScriptMetadata, SequentialIdGen};
use bj_storage::{Catalog, ControlKey, Job};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;
use std::time::Duration;
use tempfile::TempDir;

pub(crate) fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

pub(crate) struct Fixture {
    _dir: TempDir,
    pub config: Config,
    pub catalog: Catalog,
    pub adapter: FakeSchedulerAdapter,
    pub clock: FakeClock,
    pub ids: SequentialIdGen,
    pub ctx: TransitionContext<FakeSchedulerAdapter, FakeClock>,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_data_dir(dir.path());
        config.adapter_timeout = Duration::from_millis(200);
        config.bootstrap_timeout = Duration::from_secs(600);
        let catalog = Catalog::new(&config);
        catalog
            .add_script(ScriptMetadata {
                version: 1,
                id: "script-1".to_string(),
                template_id: "template-1".to_string(),
                script_name: "train.sh".to_string(),
                created_at: start(),
                tags: vec![],
                extra: BTreeMap::new(),
            })
            .unwrap();
        let adapter = FakeSchedulerAdapter::new();
        let clock = FakeClock::at(start());
        let ctx = TransitionContext::new(&config, adapter.clone(), clock.clone());
        Self {
            _dir: dir,
            config,
            catalog,
            adapter,
            clock,
            ids: SequentialIdGen::new("job"),
            ctx,
        }
    }

    /// A fresh BOOTSTRAPPING job
    pub fn bootstrapping(&self) -> Job {
        self.catalog
            .create_job("script-1", BTreeMap::new(), &self.ids, &self.clock)
            .unwrap()
    }

    /// A job stored as `job_type` with scheduler id `100`
    pub fn submitted(&self, kind: JobKind, job_type: JobType) -> Job {
        let mut job = self.bootstrapping();
        let doc = job.metadata_mut().unwrap();
        doc.job_type = job_type;
        doc.job_kind = Some(kind);
        doc.scheduler_id = Some("100".to_string());
        job.save().unwrap();
        job
    }

    pub fn open(&self, id: &str) -> Job {
        self.catalog.job(id).unwrap()
    }

    pub fn write_control(&self, job: &mut Job, key: ControlKey, value: &str) {
        job.dir().controls().write(key, value).unwrap();
        job.reload();
    }
}
