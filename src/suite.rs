//! Suite orchestration
//!
//! A [`Suite`] owns its configuration and registry, is filled through the
//! registration methods and then consumed by [`Suite::run`], which executes
//! every test strictly one after another and ranks the counts.

use crate::body::{AsyncBody, TestBody};
use crate::config::Config;
use crate::error::{BoxError, Result, SimpleBenchError};
use crate::registry::{ExecutionPlan, TestRegistry};
use crate::runner::TimedLoop;
use crate::stats::{self, RankedResult, RawResult};
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info};

/// Pause between two test executions, ceded to the scheduler so work left
/// over from the previous test does not land in the next measurement
pub const SETTLE_PAUSE: Duration = Duration::from_millis(100);

/// Descriptive information about the machine that produced a result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostInfo {
    pub os: String,
    pub arch: String,
    pub family: String,
    pub logical_cpus: usize,
    pub harness_version: String,
}

impl HostInfo {
    pub fn current() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            family: std::env::consts::FAMILY.to_string(),
            logical_cpus: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            harness_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Ranked results of a suite, flat for a single group or keyed by group
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SuiteResults {
    /// A single executed group; `group` is `None` for an empty suite
    Flat {
        #[serde(skip)]
        group: Option<String>,
        #[serde(flatten)]
        ranked: RankedResult,
    },
    Grouped {
        #[serde(serialize_with = "serialize_groups")]
        groups: Vec<(String, RankedResult)>,
    },
}

fn serialize_groups<S>(
    groups: &[(String, RankedResult)],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(groups.len()))?;
    for (name, ranked) in groups {
        map.serialize_entry(name, ranked)?;
    }
    map.end()
}

impl SuiteResults {
    /// Result for the group called `name`
    pub fn group(&self, name: &str) -> Option<&RankedResult> {
        match self {
            SuiteResults::Flat { group, ranked } => {
                (group.as_deref() == Some(name)).then_some(ranked)
            }
            SuiteResults::Grouped { groups } => groups
                .iter()
                .find(|(group, _)| group == name)
                .map(|(_, ranked)| ranked),
        }
    }

    /// All ranked results with their group names (`None` for the flat shape)
    pub fn iter(&self) -> Vec<(Option<&str>, &RankedResult)> {
        match self {
            SuiteResults::Flat { ranked, .. } => vec![(None, ranked)],
            SuiteResults::Grouped { groups } => groups
                .iter()
                .map(|(name, ranked)| (Some(name.as_str()), ranked))
                .collect(),
        }
    }

    pub fn is_grouped(&self) -> bool {
        matches!(self, SuiteResults::Grouped { .. })
    }
}

/// Everything a run produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteResult {
    pub config: Config,
    pub timestamp: DateTime<Utc>,
    pub host: HostInfo,
    #[serde(flatten)]
    pub results: SuiteResults,
}

impl SuiteResult {
    /// Shortcut for the flat shape
    pub fn flat(&self) -> Option<&RankedResult> {
        match &self.results {
            SuiteResults::Flat { ranked, .. } => Some(ranked),
            SuiteResults::Grouped { .. } => None,
        }
    }
}

/// A single-use benchmark suite
#[derive(Debug)]
pub struct Suite {
    config: Config,
    registry: TestRegistry,
}

impl Suite {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            registry: TestRegistry::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &TestRegistry {
        &self.registry
    }

    /// Register a test in the open group, or the default group outside one
    pub fn add<B>(&mut self, name: impl Into<String>, body: B) -> &mut Self
    where
        B: TestBody + 'static,
    {
        let group = self.registry.current_group().map(str::to_owned);
        self.registry.register(group.as_deref(), name, Box::new(body));
        self
    }

    /// Register a test whose body is a future; each invocation is spawned
    /// on the runtime and completes when the future resolves
    pub fn add_async<F, Fut, E>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: FnMut() -> Fut + 'static,
        Fut: Future<Output = std::result::Result<(), E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        self.add(name, AsyncBody::new(factory))
    }

    /// Declare a named group; `define` registers its tests. Opening a group
    /// inside another group is an error.
    pub fn group<F>(&mut self, name: &str, define: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Suite) -> Result<()>,
    {
        self.registry.begin_group(name)?;
        let outcome = define(self);
        self.registry.end_group();
        outcome?;
        Ok(self)
    }

    /// Registration methods that accept tests and groups but discard them
    pub fn skip(&mut self) -> Skip<'_> {
        Skip { suite: self }
    }

    /// Execute every registered test and rank the results
    pub async fn run(self) -> Result<SuiteResult> {
        let Suite { config, registry } = self;
        let plan: ExecutionPlan = registry.into_plan()?;
        let runner = TimedLoop::from_config(&config.suite);

        info!(
            tests = plan.test_count(),
            groups = plan.groups().len(),
            duration_us = config.suite.duration_us,
            bounce = config.suite.bounce,
            "starting benchmark suite"
        );

        let grouped = plan.is_grouped();
        let mut ranked_groups = Vec::new();
        let mut executed = 0usize;

        for mut group in plan.into_groups() {
            let group_name = group.name().to_string();
            let mut raw: RawResult = Vec::with_capacity(group.len());

            for test in group.tests_mut() {
                if executed > 0 {
                    tokio::time::sleep(SETTLE_PAUSE).await;
                }
                executed += 1;

                debug!(group = %group_name, test = test.name(), "running test");
                let count = runner.run(test.body_mut()).await.map_err(|source| {
                    error!(group = %group_name, test = test.name(), error = %source, "test failed");
                    SimpleBenchError::TestFailed {
                        test: test.name().to_string(),
                        group: grouped.then(|| group_name.clone()),
                        source,
                    }
                })?;
                debug!(group = %group_name, test = test.name(), count, "test finished");

                raw.push((test.name().to_string(), count));
            }

            let ranked = stats::rank(&raw, runner.duration(), config.suite.compare);
            ranked_groups.push((group_name, ranked));
        }

        let results = if grouped {
            SuiteResults::Grouped {
                groups: ranked_groups,
            }
        } else {
            match ranked_groups.pop() {
                Some((group, ranked)) => SuiteResults::Flat {
                    group: Some(group),
                    ranked,
                },
                None => SuiteResults::Flat {
                    group: None,
                    ranked: stats::rank(&[], runner.duration(), config.suite.compare),
                },
            }
        };

        info!(tests = executed, "benchmark suite finished");

        Ok(SuiteResult {
            config,
            timestamp: Utc::now(),
            host: HostInfo::current(),
            results,
        })
    }
}

/// Registration surface whose tests are parsed but never run
pub struct Skip<'a> {
    suite: &'a mut Suite,
}

impl<'a> Skip<'a> {
    pub fn add<B>(self, name: impl Into<String>, _body: B) -> &'a mut Suite
    where
        B: TestBody + 'static,
    {
        let name: String = name.into();
        let group = self.suite.registry.current_group().map(str::to_owned);
        self.suite.registry.record_skip(group.as_deref(), &name);
        self.suite
    }

    /// Skip a whole group; `define` is never called
    pub fn group<F>(self, name: &str, _define: F) -> &'a mut Suite
    where
        F: FnOnce(&mut Suite) -> Result<()>,
    {
        self.suite.registry.record_skip(Some(name), "*");
        self.suite
    }
}
