use std::fmt;

use super::decision_table::DecisionTable;
use super::rule::{BuildDepRule, BuildRule, Rule, TestMapRule};

/// A flattened, ordered sequence of rules loaded from one top-level config.
///
/// Every include has already been spliced in place, so the rule order is the
/// order in which the resolution engine applies them. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    name: String,
    rules: Vec<Rule>,
}

impl Document {
    pub(crate) fn new(name: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    /// Name of the top-level configuration this document was loaded from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Fold the rules into a per-project decision table.
    ///
    /// Shorthand for [`resolve`](crate::resolve).
    #[must_use]
    pub fn resolve(&self) -> DecisionTable {
        crate::resolve::resolve(self)
    }

    /// Read a config file from disk.
    ///
    /// `path` is taken as given, relative to the current directory. Include
    /// targets starting with `.` resolve against the including file's
    /// directory and every other target against the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`](crate::LoadError) on I/O, parse, missing include
    /// or include cycle failure.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::LoadError> {
        let name = path.as_ref().to_string_lossy();
        crate::Loader::new(crate::FsSource::new(".")).load(&name)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}

/// Builder for a [`Document`] assembled in code rather than parsed from text.
///
/// # Example
///
/// ```
/// use buildcfg::DocumentBuilder;
///
/// let doc = DocumentBuilder::new("inline")
///     .build(["app"], Some(true))
///     .testmap(["app"], |t| t.host("app-host").unit("app-boot"))
///     .finish();
///
/// let table = doc.resolve();
/// assert!(table.lookup("app").enabled);
/// ```
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    name: String,
    rules: Vec<Rule>,
}

/// Intermediate builder passed to the test map closure.
#[derive(Debug, Default)]
pub struct TestListBuilder {
    host_tests: Vec<String>,
    unit_tests: Vec<String>,
}

impl DocumentBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Append a `build` rule. `None` leaves earlier decisions untouched.
    #[must_use]
    pub fn build<I, S>(mut self, projects: I, enabled: Option<bool>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.push(Rule::Build(BuildRule {
            projects: projects.into_iter().map(Into::into).collect(),
            enabled,
        }));
        self
    }

    /// Append a `testmap` rule whose tests are defined by the closure.
    #[must_use]
    pub fn testmap<I, S>(
        mut self,
        projects: I,
        f: impl FnOnce(TestListBuilder) -> TestListBuilder,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tests = f(TestListBuilder::default());
        self.rules.push(Rule::TestMap(TestMapRule {
            projects: projects.into_iter().map(Into::into).collect(),
            host_tests: tests.host_tests,
            unit_tests: tests.unit_tests,
        }));
        self
    }

    /// Append a `builddep` rule.
    #[must_use]
    pub fn builddep<I, S, N, T>(mut self, projects: I, needs: N) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        N: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.rules.push(Rule::BuildDep(BuildDepRule {
            projects: projects.into_iter().map(Into::into).collect(),
            needs: needs.into_iter().map(Into::into).collect(),
        }));
        self
    }

    #[must_use]
    pub fn finish(self) -> Document {
        Document::new(self.name, self.rules)
    }
}

impl TestListBuilder {
    #[must_use]
    pub fn host(mut self, name: impl Into<String>) -> Self {
        self.host_tests.push(name.into());
        self
    }

    #[must_use]
    pub fn unit(mut self, name: impl Into<String>) -> Self {
        self.unit_tests.push(name.into());
        self
    }
}
