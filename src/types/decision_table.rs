use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use super::decision::{DEFAULT_DECISION, ProjectDecision};

/// Selects projects by build flag and test presence. `None` means "don't care".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    pub build: Option<bool>,
    pub have_tests: Option<bool>,
}

impl ProjectFilter {
    /// Matches every project.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Matches projects that are built by default.
    #[must_use]
    pub fn enabled() -> Self {
        Self {
            build: Some(true),
            have_tests: None,
        }
    }

    #[must_use]
    pub fn build(mut self, build: Option<bool>) -> Self {
        self.build = build;
        self
    }

    #[must_use]
    pub fn have_tests(mut self, have_tests: Option<bool>) -> Self {
        self.have_tests = have_tests;
        self
    }

    #[must_use]
    pub fn matches(&self, decision: &ProjectDecision) -> bool {
        self.build.is_none_or(|b| b == decision.enabled)
            && self.have_tests.is_none_or(|t| t == decision.has_tests())
    }
}

/// Per-project decisions produced by [`resolve`](crate::resolve).
///
/// Iteration is ordered by project name, so every query is deterministic.
/// The table is plain data: `Send + Sync`, cheap to share behind `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecisionTable {
    pub(crate) projects: BTreeMap<String, ProjectDecision>,
}

impl DecisionTable {
    /// Decision for `project`, or the default (disabled, no tests) if no rule
    /// mentions it. Never fails.
    #[must_use]
    pub fn lookup(&self, project: &str) -> &ProjectDecision {
        self.projects.get(project).unwrap_or(&DEFAULT_DECISION)
    }

    /// [`lookup`](Self::lookup) for each name, in the order given.
    pub fn lookup_many<'a, I>(&'a self, projects: I) -> Vec<(&'a str, &'a ProjectDecision)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        projects
            .into_iter()
            .map(|name| (name, self.lookup(name)))
            .collect()
    }

    /// Decision for `project` only if some rule mentions it.
    #[must_use]
    pub fn get(&self, project: &str) -> Option<&ProjectDecision> {
        self.projects.get(project)
    }

    /// Names of all projects whose resolved `enabled` flag is `true`.
    #[must_use]
    pub fn all_enabled(&self) -> BTreeSet<&str> {
        self.projects
            .iter()
            .filter(|(_, d)| d.enabled)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Sorted names of the projects matching `filter`.
    #[must_use]
    pub fn projects(&self, filter: ProjectFilter) -> Vec<&str> {
        self.projects
            .iter()
            .filter(|(_, d)| filter.matches(d))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Expand `requested` with transitive `builddep` dependencies.
    ///
    /// Dependencies come before the projects that need them and every project
    /// appears once. Dependency cycles are cut at the first revisit.
    pub fn build_order<I, S>(&self, requested: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut visited: HashSet<String> = HashSet::new();
        let mut order = Vec::new();

        for name in requested {
            let name = name.as_ref();
            if !visited.insert(name.to_owned()) {
                continue;
            }
            // (project, index of the next dependency to visit)
            let mut stack: Vec<(String, usize)> = vec![(name.to_owned(), 0)];
            while let Some(top) = stack.last_mut() {
                let deps = &self.lookup(&top.0).also_build;
                if let Some(dep) = deps.get(top.1) {
                    top.1 += 1;
                    if visited.insert(dep.clone()) {
                        stack.push((dep.clone(), 0));
                    }
                } else if let Some((done, _)) = stack.pop() {
                    order.push(done);
                }
            }
        }

        order
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProjectDecision)> {
        self.projects.iter().map(|(name, d)| (name.as_str(), d))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub(crate) fn entry(&mut self, project: &str) -> &mut ProjectDecision {
        self.projects.entry(project.to_owned()).or_default()
    }
}

impl fmt::Display for DecisionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DecisionTable({} projects, {} enabled)",
            self.projects.len(),
            self.projects.values().filter(|d| d.enabled).count(),
        )
    }
}
