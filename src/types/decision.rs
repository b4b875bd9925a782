use std::fmt;

/// Resolved build and test status of a single project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDecision {
    /// Whether the project is built by default.
    pub enabled: bool,
    /// Tests run on the build host, in encounter order. Duplicates are kept.
    pub host_tests: Vec<String>,
    /// Tests run on or against the target image, in encounter order.
    pub unit_tests: Vec<String>,
    /// Projects that must also be built when this one is built.
    pub also_build: Vec<String>,
}

/// Decision returned for projects no rule mentions.
pub(crate) static DEFAULT_DECISION: ProjectDecision = ProjectDecision {
    enabled: false,
    host_tests: Vec::new(),
    unit_tests: Vec::new(),
    also_build: Vec::new(),
};

impl ProjectDecision {
    /// `true` if any host or unit test is mapped to the project.
    #[must_use]
    pub fn has_tests(&self) -> bool {
        !self.host_tests.is_empty() || !self.unit_tests.is_empty()
    }

    /// Host tests followed by unit tests.
    pub fn tests(&self) -> impl Iterator<Item = &str> {
        self.host_tests
            .iter()
            .chain(&self.unit_tests)
            .map(String::as_str)
    }
}

impl fmt::Display for ProjectDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "enabled={}, host_tests=[{}], unit_tests=[{}]",
            self.enabled,
            self.host_tests.join(", "),
            self.unit_tests.join(", "),
        )?;
        if !self.also_build.is_empty() {
            write!(f, ", also_build=[{}]", self.also_build.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_disabled_without_tests() {
        let d = ProjectDecision::default();
        assert!(!d.enabled);
        assert!(!d.has_tests());
        assert_eq!(d, DEFAULT_DECISION);
    }

    #[test]
    fn tests_iterates_host_then_unit() {
        let d = ProjectDecision {
            enabled: true,
            host_tests: vec!["h".into()],
            unit_tests: vec!["u1".into(), "u2".into()],
            also_build: vec![],
        };
        assert!(d.has_tests());
        assert_eq!(d.tests().collect::<Vec<_>>(), ["h", "u1", "u2"]);
    }

    #[test]
    fn display() {
        let d = ProjectDecision {
            enabled: true,
            host_tests: vec!["a".into(), "b".into()],
            unit_tests: vec![],
            also_build: vec!["dep".into()],
        };
        assert_eq!(
            d.to_string(),
            "enabled=true, host_tests=[a, b], unit_tests=[], also_build=[dep]"
        );
    }
}
