
use buildcfg::{DecisionTable, Loader, MemorySource};
use proptest::prelude::*;
use strategies::{arb_rules, project_names, render_split, render_tagged, to_document, GenRule};

fn resolve_text(files: &[(&str, String)], top: &str) -> DecisionTable {
    let mut source = MemorySource::new();
    for (name, text) in files {
        source.insert(name, text.as_str());
    }
    Loader::new(source).load(top).unwrap().resolve()
}

// ---------------------------------------------------------------------------
// Invariant 1: Reference model
//
// `enabled` is the last explicit build flag for the project (default false)
// and test lists are the in-order concatenation of every matching test map.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn matches_reference_model(rules in arb_rules()) {
        let table = to_document(&rules).resolve();

        for &project in project_names() {
            let mut enabled = false;
            let mut host = Vec::new();
            let mut unit = Vec::new();
            for rule in &rules {
                match rule {
                    GenRule::Build { projects, enabled: Some(flag) } => {
                        if projects.contains(&project) {
                            enabled = *flag;
                        }
                    }
                    GenRule::Build { enabled: None, .. } => {}
                    GenRule::TestMap { projects, host: h, unit: u } => {
                        for p in projects {
                            if *p == project {
                                host.extend(h.iter().map(|s| (*s).to_owned()));
                                unit.extend(u.iter().map(|s| (*s).to_owned()));
                            }
                        }
                    }
                }
            }

            let decision = table.lookup(project);
            prop_assert_eq!(decision.enabled, enabled, "enabled mismatch for {}", project);
            prop_assert_eq!(&decision.host_tests, &host, "host tests mismatch for {}", project);
            prop_assert_eq!(&decision.unit_tests, &unit, "unit tests mismatch for {}", project);
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 2: Text and builder agree
//
// Rendering rules to text and loading them resolves identically to building
// the same rules programmatically.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn text_matches_builder(rules in arb_rules()) {
        let from_text = resolve_text(&[("main", render_split(&rules))], "main");
        let from_builder = to_document(&rules).resolve();
        prop_assert_eq!(from_text, from_builder);
    }
}

// ---------------------------------------------------------------------------
// Invariant 3: Schema equivalence
//
// Split host/unit lists and tagged test lists resolve to the same table.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn schemas_are_equivalent(rules in arb_rules()) {
        let split = resolve_text(&[("main", render_split(&rules))], "main");
        let tagged = resolve_text(&[("main", render_tagged(&rules))], "main");
        prop_assert_eq!(split, tagged);
    }
}

// ---------------------------------------------------------------------------
// Invariant 4: Include splicing
//
// Moving any contiguous run of rules into an included config, at the same
// position, does not change the result.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn include_splice_is_transparent(
        rules in arb_rules(),
        a in any::<prop::sample::Index>(),
        b in any::<prop::sample::Index>(),
    ) {
        let len = rules.len() + 1;
        let (mut start, mut end) = (a.index(len), b.index(len));
        if start > end {
            std::mem::swap(&mut start, &mut end);
        }

        let main = format!(
            "{}\ninclude(\"part\")\n{}",
            render_split(&rules[..start]),
            render_split(&rules[end..]),
        );
        let part = render_split(&rules[start..end]);

        let spliced = resolve_text(&[("main", main), ("part", part)], "main");
        let inline = resolve_text(&[("main", render_split(&rules))], "main");
        prop_assert_eq!(spliced, inline);
    }

    #[test]
    fn missing_optional_include_is_transparent(
        rules in arb_rules(),
        at in any::<prop::sample::Index>(),
    ) {
        let pos = at.index(rules.len() + 1);
        let main = format!(
            "{}\ninclude(\"absent\", optional=True)\n{}",
            render_split(&rules[..pos]),
            render_split(&rules[pos..]),
        );

        let with_include = resolve_text(&[("main", main)], "main");
        let inline = resolve_text(&[("main", render_split(&rules))], "main");
        prop_assert_eq!(with_include, inline);
    }
}

// ---------------------------------------------------------------------------
// Invariant 5: Unset never overrides
//
// Appending a flagless build rule for every project changes nothing but
// registering the projects.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn trailing_unset_build_is_noop(rules in arb_rules()) {
        let before = to_document(&rules).resolve();

        let mut extended = rules.clone();
        extended.push(GenRule::Build {
            projects: project_names().to_vec(),
            enabled: None,
        });
        let after = to_document(&extended).resolve();

        for &project in project_names() {
            prop_assert_eq!(before.lookup(project), after.lookup(project));
        }
    }
}
