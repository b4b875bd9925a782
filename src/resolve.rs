use tracing::trace;

use crate::{DecisionTable, Document, Rule};

/// Fold a flattened document into per-project decisions.
///
/// Rules apply strictly in document order:
/// - `build` with an explicit flag overwrites `enabled`; without one it only
///   makes the project known.
/// - `testmap` appends host tests, then unit tests. Nothing is deduplicated.
/// - `builddep` appends missing dependencies and makes them known.
///
/// Pure and infallible: every document the loader produces is already valid.
#[must_use]
pub fn resolve(doc: &Document) -> DecisionTable {
    let mut table = DecisionTable::default();

    for rule in doc.rules() {
        trace!(%rule, "applying rule");
        match rule {
            Rule::Build(build) => {
                for project in &build.projects {
                    let decision = table.entry(project);
                    if let Some(enabled) = build.enabled {
                        decision.enabled = enabled;
                    }
                }
            }
            Rule::TestMap(testmap) => {
                for project in &testmap.projects {
                    let decision = table.entry(project);
                    decision.host_tests.extend(testmap.host_tests.iter().cloned());
                    decision.unit_tests.extend(testmap.unit_tests.iter().cloned());
                }
            }
            Rule::BuildDep(dep) => {
                for project in &dep.projects {
                    for need in &dep.needs {
                        let decision = table.entry(project);
                        if !decision.also_build.contains(need) {
                            decision.also_build.push(need.clone());
                        }
                        table.entry(need);
                    }
                }
            }
            // Spliced away by the loader.
            Rule::Include(_) => {}
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use crate::{DocumentBuilder, ProjectDecision};

    #[test]
    fn last_explicit_flag_wins() {
        let table = DocumentBuilder::new("t")
            .build(["p"], Some(true))
            .build(["p"], Some(false))
            .finish()
            .resolve();
        assert!(!table.lookup("p").enabled);
    }

    #[test]
    fn unset_flag_keeps_prior_value() {
        let table = DocumentBuilder::new("t")
            .build(["p"], Some(true))
            .build(["p"], None)
            .finish()
            .resolve();
        assert!(table.lookup("p").enabled);
    }

    #[test]
    fn unset_flag_alone_registers_disabled_project() {
        let table = DocumentBuilder::new("t")
            .build(["p"], None)
            .finish()
            .resolve();
        assert_eq!(table.get("p"), Some(&ProjectDecision::default()));
    }

    #[test]
    fn testmaps_accumulate_in_order() {
        let table = DocumentBuilder::new("t")
            .testmap(["p"], |t| t.host("a"))
            .testmap(["p", "q"], |t| t.host("b").unit("u"))
            .testmap(["p"], |t| t.host("a"))
            .finish()
            .resolve();
        let p = table.lookup("p");
        assert_eq!(p.host_tests, ["a", "b", "a"]);
        assert_eq!(p.unit_tests, ["u"]);
        assert_eq!(table.lookup("q").host_tests, ["b"]);
    }

    #[test]
    fn testmap_never_enables() {
        let table = DocumentBuilder::new("t")
            .testmap(["p"], |t| t.unit("boot"))
            .finish()
            .resolve();
        let p = table.lookup("p");
        assert!(!p.enabled);
        assert!(p.has_tests());
        assert!(table.all_enabled().is_empty());
    }

    #[test]
    fn builddep_records_dependencies_once() {
        let table = DocumentBuilder::new("t")
            .build(["app"], Some(true))
            .builddep(["app"], ["lib", "sdk"])
            .builddep(["app"], ["lib"])
            .finish()
            .resolve();
        assert_eq!(table.lookup("app").also_build, ["lib", "sdk"]);
        assert!(table.get("sdk").is_some());
        assert!(!table.lookup("sdk").enabled);
        assert!(table.lookup("app").enabled);
    }
}
