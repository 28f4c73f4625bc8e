//! Test registry with group and skip support
//!
//! Tests live either in the implicit default group or in named groups, never
//! both. Group boundaries are tracked so that opening a group inside another
//! fails right away; the mixing rule can only be checked once registration
//! is over, in [`TestRegistry::into_plan`].

use crate::body::TestBody;
use crate::error::{Result, SimpleBenchError};
use tracing::debug;

/// Name of the implicit group holding ungrouped tests
pub const DEFAULT_GROUP: &str = "default";

/// A registered test: a name and the body to benchmark
pub struct TestCase {
    name: String,
    body: Box<dyn TestBody>,
}

impl TestCase {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn body_mut(&mut self) -> &mut dyn TestBody {
        self.body.as_mut()
    }
}

impl std::fmt::Debug for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase").field("name", &self.name).finish()
    }
}

/// Named, ordered collection of tests ranked against each other
#[derive(Debug)]
pub struct Group {
    name: String,
    tests: Vec<TestCase>,
}

impl Group {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tests: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn test_names(&self) -> Vec<&str> {
        self.tests.iter().map(TestCase::name).collect()
    }

    pub(crate) fn tests_mut(&mut self) -> &mut [TestCase] {
        &mut self.tests
    }

    /// Insert a test, replacing the body of an existing test with the same
    /// name in place
    fn insert(&mut self, name: String, body: Box<dyn TestBody>) {
        match self.tests.iter_mut().find(|t| t.name == name) {
            Some(existing) => {
                debug!(group = %self.name, test = %name, "replacing previously registered test");
                existing.body = body;
            }
            None => self.tests.push(TestCase { name, body }),
        }
    }
}

/// Validated, pruned set of groups ready for execution
#[derive(Debug)]
pub struct ExecutionPlan {
    groups: Vec<Group>,
}

impl ExecutionPlan {
    /// True when results must be keyed by group name
    pub fn is_grouped(&self) -> bool {
        self.groups.len() > 1
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn test_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    pub(crate) fn into_groups(self) -> Vec<Group> {
        self.groups
    }
}

/// Registry of all tests declared for one suite
#[derive(Debug)]
pub struct TestRegistry {
    default: Group,
    groups: Vec<Group>,
    current: Option<String>,
    nesting_violation: Option<(String, String)>,
    skipped: usize,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self {
            default: Group::new(DEFAULT_GROUP),
            groups: Vec::new(),
            current: None,
            nesting_violation: None,
            skipped: 0,
        }
    }

    /// Add a test to `group`, or to the default group when `None`. The
    /// group is created on first use.
    pub fn register(
        &mut self,
        group: Option<&str>,
        name: impl Into<String>,
        body: Box<dyn TestBody>,
    ) {
        let name = name.into();
        let target = match group {
            Some(group_name) => self.named_group_mut(group_name),
            None => &mut self.default,
        };
        debug!(group = %target.name, test = %name, "registered test");
        target.insert(name, body);
    }

    /// Open a named group. Fails if another group is already open; the
    /// failure is also kept and reported again by [`Self::into_plan`].
    pub fn begin_group(&mut self, name: &str) -> Result<()> {
        if let Some(outer) = &self.current {
            let err = SimpleBenchError::NestedGroup {
                outer: outer.clone(),
                inner: name.to_string(),
            };
            if self.nesting_violation.is_none() {
                self.nesting_violation = Some((outer.clone(), name.to_string()));
            }
            return Err(err);
        }

        self.named_group_mut(name);
        self.current = Some(name.to_string());
        Ok(())
    }

    pub fn end_group(&mut self) {
        self.current = None;
    }

    /// Group currently open for registration, if any
    pub fn current_group(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Note a test or group that was declared but skipped
    pub fn record_skip(&mut self, group: Option<&str>, name: &str) {
        self.skipped += 1;
        debug!(
            group = group.unwrap_or(DEFAULT_GROUP),
            test = name,
            "skipping disabled test"
        );
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped
    }

    pub fn test_count(&self) -> usize {
        self.default.len() + self.groups.iter().map(Group::len).sum::<usize>()
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(Group::name).collect()
    }

    /// Validate grouping rules and drop empty groups
    pub fn into_plan(self) -> Result<ExecutionPlan> {
        if let Some((outer, inner)) = self.nesting_violation {
            return Err(SimpleBenchError::NestedGroup { outer, inner });
        }
        if let Some(open) = self.current {
            return Err(SimpleBenchError::ConfigError {
                message: format!("group '{open}' was never closed"),
                field: None,
            });
        }
        if !self.groups.is_empty() && !self.default.is_empty() {
            return Err(SimpleBenchError::MixedGrouping {
                groups: self.groups.into_iter().map(|g| g.name).collect(),
            });
        }

        let candidates = if self.groups.is_empty() {
            vec![self.default]
        } else {
            self.groups
        };

        let groups = candidates
            .into_iter()
            .filter(|group| {
                if group.is_empty() {
                    debug!(group = %group.name, "pruning empty group");
                }
                !group.is_empty()
            })
            .collect();

        Ok(ExecutionPlan { groups })
    }

    fn named_group_mut(&mut self, name: &str) -> &mut Group {
        let index = match self.groups.iter().position(|g| g.name == name) {
            Some(index) => index,
            None => {
                self.groups.push(Group::new(name));
                self.groups.len() - 1
            }
        };
        &mut self.groups[index]
    }
}

impl Default for TestRegistry {
    fn default() -> Self {
        Self::new()
    }
}
