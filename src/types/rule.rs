use std::fmt;

/// One entry of a configuration document.
///
/// Rules are produced by [`parse`](crate::parse::parse) or by
/// [`DocumentBuilder`](super::DocumentBuilder). A loaded
/// [`Document`](super::Document) never contains [`Rule::Include`]: includes are
/// spliced in place by the [`Loader`](crate::Loader).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Build(BuildRule),
    TestMap(TestMapRule),
    BuildDep(BuildDepRule),
    Include(IncludeRule),
}

/// Sets the build flag of every listed project.
///
/// `enabled` is `None` when the rule omits the flag; such a rule leaves any
/// earlier decision untouched, unlike an explicit `Some(false)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRule {
    pub projects: Vec<String>,
    pub enabled: Option<bool>,
}

/// Appends tests to every listed project.
///
/// Both surface schemas (split `host_tests`/`unit_tests` lists and the tagged
/// `tests=[hosttest(..), boottest(..)]` list) normalize into this shape.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TestMapRule {
    pub projects: Vec<String>,
    pub host_tests: Vec<String>,
    pub unit_tests: Vec<String>,
}

/// Declares that building a project also requires building `needs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDepRule {
    pub projects: Vec<String>,
    pub needs: Vec<String>,
}

/// Splices the rules of another configuration at this position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeRule {
    pub target: String,
    pub optional: bool,
}

impl Rule {
    /// The rule keyword as written in configuration text.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Rule::Build(_) => "build",
            Rule::TestMap(_) => "testmap",
            Rule::BuildDep(_) => "builddep",
            Rule::Include(_) => "include",
        }
    }
}

struct QuotedList<'a>(&'a [String]);

impl fmt::Display for QuotedList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{item:?}")?;
        }
        write!(f, "]")
    }
}

fn py_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Build(b) => {
                write!(f, "build(projects={}", QuotedList(&b.projects))?;
                if let Some(enabled) = b.enabled {
                    write!(f, ", enabled={}", py_bool(enabled))?;
                }
                write!(f, ")")
            }
            Rule::TestMap(t) => write!(
                f,
                "testmap(projects={}, host_tests={}, unit_tests={})",
                QuotedList(&t.projects),
                QuotedList(&t.host_tests),
                QuotedList(&t.unit_tests),
            ),
            Rule::BuildDep(d) => write!(
                f,
                "builddep(projects={}, needs={})",
                QuotedList(&d.projects),
                QuotedList(&d.needs),
            ),
            Rule::Include(i) => {
                write!(f, "include({:?}", i.target)?;
                if i.optional {
                    write!(f, ", optional=True")?;
                }
                write!(f, ")")
            }
        }
    }
}
