//! Validation of raw call expressions into [`Rule`]s.
//!
//! The grammar accepts any nesting of calls, lists and literals. This pass
//! checks each top-level call against the signature of its rule kind and
//! normalizes both test map schemas into split host/unit lists.

use crate::{BuildDepRule, BuildRule, IncludeRule, Rule, TestMapRule};

use super::error::ParseError;
use super::syntax::{Arg, Call, Node};

const BUILD_PARAMS: &[&str] = &["projects", "enabled"];
const TESTMAP_PARAMS: &[&str] = &["projects", "tests", "host_tests", "unit_tests"];
const BUILDDEP_PARAMS: &[&str] = &["projects", "needs"];
const INCLUDE_PARAMS: &[&str] = &["name", "optional"];
const HOSTTEST_PARAMS: &[&str] = &["host_cmd", "enabled"];
const BOOTTEST_PARAMS: &[&str] = &["name", "enabled"];
const PORTTEST_PARAMS: &[&str] = &["port", "enabled", "timeout"];
const HOSTTESTS_PARAMS: &[&str] = &["tests"];
const BOOTTESTS_PARAMS: &[&str] = &["port_tests", "provides"];
const ANDROIDTEST_PARAMS: &[&str] = &[
    "name",
    "command",
    "enabled",
    "nameprefix",
    "runargs",
    "timeout",
];
const ANDROIDPORTTESTS_PARAMS: &[&str] = &[
    "port_tests",
    "provides",
    "nameprefix",
    "cmdargs",
    "runargs",
];

pub(crate) fn lower(nodes: Vec<Node>) -> Result<Vec<Rule>, ParseError> {
    let mut flat = Vec::with_capacity(nodes.len());
    flatten(nodes, &mut flat);

    flat.into_iter()
        .map(|node| match node {
            Node::Call(call) => lower_call(&call),
            other => Err(ParseError::NotARule {
                found: format!("{} {other}", other.describe()),
            }),
        })
        .collect()
}

fn flatten(nodes: Vec<Node>, out: &mut Vec<Node>) {
    for node in nodes {
        match node {
            Node::List(items) => flatten(items, out),
            other => out.push(other),
        }
    }
}

fn lower_call(call: &Call) -> Result<Rule, ParseError> {
    match call.name.as_str() {
        "build" => {
            let args = BoundArgs::bind(call, BUILD_PARAMS)?;
            Ok(Rule::Build(BuildRule {
                projects: args.projects()?,
                enabled: args.optional_bool("enabled")?,
            }))
        }
        "testmap" => {
            let args = BoundArgs::bind(call, TESTMAP_PARAMS)?;
            let mut rule = TestMapRule {
                projects: args.projects()?,
                host_tests: args.optional_string_list("host_tests")?,
                unit_tests: args.optional_string_list("unit_tests")?,
            };
            if let Some(tests) = args.get("tests") {
                collect_tagged_tests(call, tests, &mut rule)?;
            }
            Ok(Rule::TestMap(rule))
        }
        "builddep" => {
            let args = BoundArgs::bind(call, BUILDDEP_PARAMS)?;
            Ok(Rule::BuildDep(BuildDepRule {
                projects: args.projects()?,
                needs: args.required_string_list("needs")?,
            }))
        }
        "include" => {
            let args = BoundArgs::bind(call, INCLUDE_PARAMS)?;
            Ok(Rule::Include(IncludeRule {
                target: args.required_string("name")?,
                optional: args.optional_bool("optional")?.unwrap_or(false),
            }))
        }
        other => Err(ParseError::UnknownRule {
            rule: call.to_string(),
            kind: other.to_owned(),
        }),
    }
}

/// Capability flags: what a port test needs, or what a test environment
/// provides. A test runs in an environment when its needs are a subset of
/// the provided flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PortFlags(u8);

impl PortFlags {
    const NAMES: [&'static str; 4] = ["android", "storage_boot", "storage_full", "smp4"];

    /// Provided to `boottests` unless overridden.
    const BOOT: PortFlags = PortFlags(0b1010);
    /// Provided to `androidporttests` unless overridden.
    const ANDROID: PortFlags = PortFlags(0b1111);

    fn flag(name: &str) -> Option<(&'static str, u8)> {
        Self::NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| (Self::NAMES[i], 1u8 << i))
    }

    fn apply(self, update: FlagUpdate) -> Self {
        PortFlags((self.0 | update.set) & !update.clear)
    }

    fn provided_by(self, provides: PortFlags) -> bool {
        self.0 & !provides.0 == 0
    }
}

/// Flags switched on and off by one `needs(...)` or `porttestflags(...)`.
#[derive(Debug, Clone, Copy, Default)]
struct FlagUpdate {
    set: u8,
    clear: u8,
}

/// A test as it flows through the test helper calls, before it is sorted
/// into a test map.
#[derive(Debug, Clone)]
enum TestValue {
    Host { name: String, enabled: bool },
    Unit { name: String, enabled: bool },
    Port { port: String, enabled: bool, needs: PortFlags },
}

/// Sort the entries of a unified `tests` list into the split lists of `rule`.
///
/// Disabled tests are dropped. Port tests must have been turned into boot or
/// Android tests by `boottests`/`androidporttests`.
fn collect_tagged_tests(
    testmap: &Call,
    tests: &Node,
    rule: &mut TestMapRule,
) -> Result<(), ParseError> {
    if !matches!(tests, Node::List(_)) {
        return Err(type_mismatch(testmap, "tests", "a list of tests"));
    }
    let mut values = Vec::new();
    eval_tests(testmap, tests, &mut values)?;

    for value in values {
        match value {
            TestValue::Host { name, enabled } => {
                if enabled {
                    rule.host_tests.push(name);
                }
            }
            TestValue::Unit { name, enabled } => {
                if enabled {
                    rule.unit_tests.push(name);
                }
            }
            TestValue::Port { .. } => {
                return Err(type_mismatch(
                    testmap,
                    "tests",
                    "host or boot tests (wrap port tests in boottests())",
                ));
            }
        }
    }
    Ok(())
}

/// Evaluate a test expression, appending the tests it denotes to `out`.
/// Nested lists are flattened in order. `within` is the innermost enclosing
/// call, named in errors.
fn eval_tests(within: &Call, node: &Node, out: &mut Vec<TestValue>) -> Result<(), ParseError> {
    match node {
        Node::List(items) => {
            for item in items {
                eval_tests(within, item, out)?;
            }
            Ok(())
        }
        Node::Call(call) => eval_test_call(within, call, out),
        Node::Method { receiver, call } if call.name == "needs" => {
            let update = flag_updates(call, &call.args, 0)?;
            let mut tests = Vec::new();
            eval_tests(call, receiver, &mut tests)?;
            for test in tests {
                out.push(require_port(call, test)?.with_needs(update));
            }
            Ok(())
        }
        Node::Method { call, .. } => Err(ParseError::UnknownTest {
            rule: node.to_string(),
            kind: call.name.clone(),
        }),
        _ => Err(type_mismatch(within, "tests", "a list of tests")),
    }
}

fn eval_test_call(within: &Call, call: &Call, out: &mut Vec<TestValue>) -> Result<(), ParseError> {
    match call.name.as_str() {
        "hosttest" => {
            let args = BoundArgs::bind(call, HOSTTEST_PARAMS)?;
            out.push(TestValue::Host {
                name: args.required_string("host_cmd")?,
                enabled: args.optional_bool("enabled")?.unwrap_or(true),
            });
        }
        "boottest" => {
            let args = BoundArgs::bind(call, BOOTTEST_PARAMS)?;
            out.push(TestValue::Unit {
                name: args.required_string("name")?,
                enabled: args.optional_bool("enabled")?.unwrap_or(true),
            });
        }
        "porttest" => {
            let args = BoundArgs::bind(call, PORTTEST_PARAMS)?;
            args.optional_int("timeout")?;
            out.push(TestValue::Port {
                port: args.required_string("port")?,
                enabled: args.optional_bool("enabled")?.unwrap_or(true),
                needs: PortFlags::default(),
            });
        }
        "needs" => {
            let (tests, flags) = match call.args.split_first() {
                Some((first, rest)) if first.keyword.as_deref().is_none_or(|k| k == "tests") => {
                    (&first.value, rest)
                }
                _ => {
                    return Err(ParseError::MissingArgument {
                        rule: call.to_string(),
                        argument: "tests",
                    });
                }
            };
            let update = flag_updates(call, flags, 1)?;
            let mut inner = Vec::new();
            eval_tests(call, tests, &mut inner)?;
            for test in inner {
                out.push(require_port(call, test)?.with_needs(update));
            }
        }
        "hosttests" => {
            let args = BoundArgs::bind(call, HOSTTESTS_PARAMS)?;
            let mut inner = Vec::new();
            eval_tests(call, args.required("tests")?, &mut inner)?;
            out.extend(
                inner
                    .into_iter()
                    .filter(|t| matches!(t, TestValue::Host { .. })),
            );
        }
        "boottests" => {
            let args = BoundArgs::bind(call, BOOTTESTS_PARAMS)?;
            let provides = args.provides(PortFlags::BOOT)?;
            for (port, enabled) in matching_ports(call, args.required("port_tests")?, provides)? {
                out.push(TestValue::Unit {
                    name: port,
                    enabled,
                });
            }
        }
        "androidtest" => {
            let args = BoundArgs::bind(call, ANDROIDTEST_PARAMS)?;
            let name = args.required_string("name")?;
            args.required_string("command")?;
            args.optional_string_list("runargs")?;
            args.optional_int("timeout")?;
            let prefix = args.optional_string("nameprefix")?.unwrap_or_default();
            out.push(TestValue::Unit {
                name: format!("{prefix}android-test:{name}"),
                enabled: args.optional_bool("enabled")?.unwrap_or(true),
            });
        }
        "androidporttests" => {
            let args = BoundArgs::bind(call, ANDROIDPORTTESTS_PARAMS)?;
            let provides = args.provides(PortFlags::ANDROID)?;
            args.optional_string_list("cmdargs")?;
            args.optional_string_list("runargs")?;
            let prefix = args.optional_string("nameprefix")?.unwrap_or_default();
            for (port, enabled) in matching_ports(call, args.required("port_tests")?, provides)? {
                out.push(TestValue::Unit {
                    name: format!("{prefix}android-port-test:android-test:{port}"),
                    enabled,
                });
            }
        }
        "porttestflags" => {
            return Err(type_mismatch(call, "tests", "a test, not a set of flags"));
        }
        other => {
            return Err(ParseError::UnknownTest {
                rule: within.to_string(),
                kind: other.to_owned(),
            });
        }
    }
    Ok(())
}

/// Port tests in `tests` whose needs are covered by `provides`, as
/// `(port, enabled)`. Other tests are ignored.
fn matching_ports(
    call: &Call,
    tests: &Node,
    provides: PortFlags,
) -> Result<Vec<(String, bool)>, ParseError> {
    let mut inner = Vec::new();
    eval_tests(call, tests, &mut inner)?;
    Ok(inner
        .into_iter()
        .filter_map(|test| match test {
            TestValue::Port {
                port,
                enabled,
                needs,
            } if needs.provided_by(provides) => Some((port, enabled)),
            _ => None,
        })
        .collect())
}

fn require_port(call: &Call, test: TestValue) -> Result<TestValue, ParseError> {
    match test {
        TestValue::Port { .. } => Ok(test),
        _ => Err(type_mismatch(call, "tests", "port tests")),
    }
}

impl TestValue {
    fn with_needs(self, update: FlagUpdate) -> Self {
        match self {
            TestValue::Port {
                port,
                enabled,
                needs,
            } => TestValue::Port {
                port,
                enabled,
                needs: needs.apply(update),
            },
            other => other,
        }
    }
}

/// Read flag keyword arguments. `positional` is how many positional
/// arguments `call` takes before them, for error reporting.
fn flag_updates(call: &Call, args: &[Arg], positional: usize) -> Result<FlagUpdate, ParseError> {
    let mut update = FlagUpdate::default();
    let mut seen = 0u8;
    for arg in args {
        let Some(keyword) = &arg.keyword else {
            return Err(ParseError::TooManyArguments {
                rule: call.to_string(),
                max: positional,
            });
        };
        let (name, bit) =
            PortFlags::flag(keyword).ok_or_else(|| ParseError::UnexpectedArgument {
                rule: call.to_string(),
                argument: keyword.clone(),
            })?;
        if seen & bit != 0 {
            return Err(ParseError::DuplicateArgument {
                rule: call.to_string(),
                argument: keyword.clone(),
            });
        }
        seen |= bit;
        match arg.value {
            Node::Bool(true) => update.set |= bit,
            Node::Bool(false) => update.clear |= bit,
            _ => return Err(type_mismatch(call, name, "a boolean")),
        }
    }
    Ok(update)
}

fn type_mismatch(call: &Call, argument: &'static str, expected: &'static str) -> ParseError {
    ParseError::TypeMismatch {
        rule: call.to_string(),
        argument,
        expected,
    }
}

/// Arguments of one call matched against a fixed parameter list, the way a
/// keyword-capable function signature binds them.
struct BoundArgs<'a> {
    call: &'a Call,
    params: &'static [&'static str],
    values: Vec<Option<&'a Node>>,
}

impl<'a> BoundArgs<'a> {
    fn bind(call: &'a Call, params: &'static [&'static str]) -> Result<Self, ParseError> {
        let mut values: Vec<Option<&Node>> = vec![None; params.len()];
        let mut seen_keyword = false;

        for (position, arg) in call.args.iter().enumerate() {
            let slot = match &arg.keyword {
                Some(keyword) => {
                    seen_keyword = true;
                    params.iter().position(|p| *p == keyword.as_str()).ok_or_else(|| {
                        ParseError::UnexpectedArgument {
                            rule: call.to_string(),
                            argument: keyword.clone(),
                        }
                    })?
                }
                None if seen_keyword => {
                    return Err(ParseError::syntax(format!(
                        "positional argument follows keyword argument in {call}"
                    )));
                }
                None if position >= params.len() => {
                    return Err(ParseError::TooManyArguments {
                        rule: call.to_string(),
                        max: params.len(),
                    });
                }
                None => position,
            };

            if values[slot].is_some() {
                return Err(ParseError::DuplicateArgument {
                    rule: call.to_string(),
                    argument: params[slot].to_owned(),
                });
            }
            values[slot] = Some(&arg.value);
        }

        Ok(Self {
            call,
            params,
            values,
        })
    }

    fn get(&self, param: &'static str) -> Option<&'a Node> {
        self.params
            .iter()
            .position(|p| *p == param)
            .and_then(|slot| self.values[slot])
    }

    fn required(&self, param: &'static str) -> Result<&'a Node, ParseError> {
        self.get(param).ok_or_else(|| ParseError::MissingArgument {
            rule: self.call.to_string(),
            argument: param,
        })
    }

    fn required_string(&self, param: &'static str) -> Result<String, ParseError> {
        match self.required(param)? {
            Node::Str(s) => Ok(s.clone()),
            _ => Err(type_mismatch(self.call, param, "a string")),
        }
    }

    fn optional_string(&self, param: &'static str) -> Result<Option<String>, ParseError> {
        match self.get(param) {
            None => Ok(None),
            Some(Node::Str(s)) => Ok(Some(s.clone())),
            Some(_) => Err(type_mismatch(self.call, param, "a string")),
        }
    }

    fn optional_int(&self, param: &'static str) -> Result<Option<i64>, ParseError> {
        match self.get(param) {
            None => Ok(None),
            Some(Node::Int(i)) => Ok(Some(*i)),
            Some(_) => Err(type_mismatch(self.call, param, "an integer")),
        }
    }

    /// The `provides` argument: a `porttestflags(...)` call, or `default`.
    fn provides(&self, default: PortFlags) -> Result<PortFlags, ParseError> {
        match self.get("provides") {
            None => Ok(default),
            Some(Node::Call(flags)) if flags.name == "porttestflags" => {
                Ok(PortFlags::default().apply(flag_updates(flags, &flags.args, 0)?))
            }
            Some(_) => Err(type_mismatch(self.call, "provides", "porttestflags(...)")),
        }
    }

    fn optional_bool(&self, param: &'static str) -> Result<Option<bool>, ParseError> {
        match self.get(param) {
            None => Ok(None),
            Some(Node::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(type_mismatch(self.call, param, "a boolean")),
        }
    }

    fn string_list(&self, param: &'static str, node: &Node) -> Result<Vec<String>, ParseError> {
        let Node::List(items) = node else {
            return Err(type_mismatch(self.call, param, "a list of strings"));
        };
        items
            .iter()
            .map(|item| match item {
                Node::Str(s) => Ok(s.clone()),
                _ => Err(type_mismatch(self.call, param, "a list of strings")),
            })
            .collect()
    }

    fn required_string_list(&self, param: &'static str) -> Result<Vec<String>, ParseError> {
        let node = self.required(param)?;
        self.string_list(param, node)
    }

    fn optional_string_list(&self, param: &'static str) -> Result<Vec<String>, ParseError> {
        match self.get(param) {
            None => Ok(Vec::new()),
            Some(node) => self.string_list(param, node),
        }
    }

    /// The `projects` argument: a non-empty list of project names.
    fn projects(&self) -> Result<Vec<String>, ParseError> {
        let projects = self.required_string_list("projects")?;
        if projects.is_empty() {
            return Err(ParseError::EmptyProjects {
                rule: self.call.to_string(),
            });
        }
        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use winnow::Parser;

    use super::*;
    use crate::parse::grammar;

    fn lower_str(input: &str) -> Result<Vec<Rule>, ParseError> {
        lower(grammar::config.parse(input).unwrap())
    }

    #[test]
    fn positional_arguments_bind_in_order() {
        let rules = lower_str(r#"build(["a", "b"], False)"#).unwrap();
        assert_eq!(
            rules,
            [Rule::Build(BuildRule {
                projects: vec!["a".into(), "b".into()],
                enabled: Some(false),
            })]
        );
    }

    #[test]
    fn omitted_enabled_is_unset() {
        let rules = lower_str(r#"build(projects=["a"])"#).unwrap();
        assert!(matches!(&rules[0], Rule::Build(b) if b.enabled.is_none()));
    }

    #[test]
    fn include_defaults_to_required() {
        let rules = lower_str(r#"include("common")"#).unwrap();
        assert_eq!(
            rules,
            [Rule::Include(IncludeRule {
                target: "common".into(),
                optional: false,
            })]
        );
    }

    #[test]
    fn tagged_tests_split_by_kind() {
        let rules = lower_str(
            r#"testmap(["p"], tests=[hosttest("h1"), boottest("u1"), [hosttest("h2")]])"#,
        )
        .unwrap();
        assert_eq!(
            rules,
            [Rule::TestMap(TestMapRule {
                projects: vec!["p".into()],
                host_tests: vec!["h1".into(), "h2".into()],
                unit_tests: vec!["u1".into()],
            })]
        );
    }

    #[test]
    fn boottests_expand_port_tests() {
        let rules = lower_str(
            r#"testmap(["p"], tests=[boottests([porttest("a"), porttest("b")])])"#,
        )
        .unwrap();
        assert!(matches!(&rules[0], Rule::TestMap(t) if t.unit_tests == ["a", "b"]));
    }

    fn tests_of(input: &str) -> (Vec<String>, Vec<String>) {
        match lower_str(input).unwrap().remove(0) {
            Rule::TestMap(t) => (t.host_tests, t.unit_tests),
            other => panic!("expected testmap, got {other:?}"),
        }
    }

    #[test]
    fn disabled_tests_are_dropped() {
        let (host, unit) = tests_of(
            r#"testmap(["p"], tests=[
                hosttest("h1", enabled=False), hosttest("h2"),
                boottest("u1", False),
                boottests([porttest("x", enabled=False), porttest("y")]),
            ])"#,
        );
        assert_eq!(host, ["h2"]);
        assert_eq!(unit, ["y"]);
    }

    #[test]
    fn boottests_keep_ports_the_boot_environment_provides() {
        let (_, unit) = tests_of(
            r#"testmap(["p"], tests=[boottests([
                porttest("needs-android").needs(android=True),
                porttest("plain"),
                porttest("needs-smp").needs(smp4=True, storage_boot=True),
                porttest("needs-full").needs(storage_full=True),
            ])])"#,
        );
        assert_eq!(unit, ["plain", "needs-smp"]);
    }

    #[test]
    fn provides_overrides_the_default_environment() {
        let (_, unit) = tests_of(
            r#"testmap(["p"], tests=[boottests(
                needs([porttest("a"), porttest("b", timeout=60)], storage_full=True),
                provides=porttestflags(storage_full=True),
            )])"#,
        );
        assert_eq!(unit, ["a", "b"]);
    }

    #[test]
    fn later_needs_switch_flags_off() {
        let (_, unit) = tests_of(
            r#"testmap(["p"], tests=[boottests([
                porttest("x").needs(android=True).needs(android=False),
            ])])"#,
        );
        assert_eq!(unit, ["x"]);
    }

    #[test]
    fn hosttests_keeps_only_host_tests() {
        let (host, unit) = tests_of(
            r#"testmap(["p"], tests=[hosttests([hosttest("h"), boottest("u"), porttest("x")])])"#,
        );
        assert_eq!(host, ["h"]);
        assert!(unit.is_empty());
    }

    #[test]
    fn android_tests_are_on_target_tests() {
        let (host, unit) = tests_of(
            r#"testmap(["p"], tests=[
                androidtest(name="shell", command="true", runargs=["--x"], timeout=30),
                androidporttests([porttest("a").needs(android=True), porttest("b")],
                                 nameprefix="vendor:"),
                androidtest("off", "true", enabled=False),
            ])"#,
        );
        assert!(host.is_empty());
        assert_eq!(
            unit,
            [
                "android-test:shell",
                "vendor:android-port-test:android-test:a",
                "vendor:android-port-test:android-test:b",
            ]
        );
    }

    #[test]
    fn unknown_port_flag() {
        let err =
            lower_str(r#"testmap(["p"], tests=[boottests([porttest("x").needs(gpu=True)])])"#)
                .unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedArgument { argument, .. } if argument == "gpu"
        ));
    }

    #[test]
    fn needs_applies_to_port_tests_only() {
        let err = lower_str(r#"testmap(["p"], tests=[needs([hosttest("h")], smp4=True)])"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::TypeMismatch { argument: "tests", expected: "port tests", .. }
        ));
    }

    #[test]
    fn bare_port_test_is_not_a_test_map_entry() {
        let err = lower_str(r#"testmap(["p"], tests=[porttest("x")])"#).unwrap_err();
        assert!(matches!(err, ParseError::TypeMismatch { argument: "tests", .. }));
    }

    #[test]
    fn provides_must_be_port_test_flags() {
        let err = lower_str(r#"testmap(["p"], tests=[boottests([], provides=True)])"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::TypeMismatch { argument: "provides", .. }
        ));
    }

    #[test]
    fn nested_top_level_lists_flatten_in_order() {
        let rules = lower_str(
            r#"[build(["a"]), [include("x"), build(["b"])]]
builddep(["a"], needs=["b"])"#,
        )
        .unwrap();
        let kinds: Vec<&str> = rules.iter().map(Rule::kind).collect();
        assert_eq!(kinds, ["build", "include", "build", "builddep"]);
    }

    #[test]
    fn unknown_rule_kind() {
        let err = lower_str(r#"archive("x")"#).unwrap_err();
        assert!(matches!(err, ParseError::UnknownRule { kind, .. } if kind == "archive"));
    }

    #[test]
    fn missing_projects() {
        let err = lower_str("build(enabled=True)").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingArgument { argument: "projects", .. }
        ));
    }

    #[test]
    fn empty_projects_rejected() {
        let err = lower_str("testmap(projects=[])").unwrap_err();
        assert!(matches!(err, ParseError::EmptyProjects { .. }));
    }

    #[test]
    fn enabled_must_be_boolean() {
        let err = lower_str(r#"build(["a"], enabled="yes")"#).unwrap_err();
        assert!(matches!(
            err,
            ParseError::TypeMismatch { argument: "enabled", expected: "a boolean", .. }
        ));
    }

    #[test]
    fn projects_must_be_strings() {
        let err = lower_str("build([1, 2])").unwrap_err();
        assert!(matches!(
            err,
            ParseError::TypeMismatch { argument: "projects", .. }
        ));
    }

    #[test]
    fn unexpected_keyword() {
        let err = lower_str(r#"build(["a"], dist=["x"])"#).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedArgument { argument, .. } if argument == "dist"
        ));
    }

    #[test]
    fn duplicate_argument() {
        let err = lower_str(r#"build(["a"], projects=["b"])"#).unwrap_err();
        assert!(matches!(
            err,
            ParseError::DuplicateArgument { argument, .. } if argument == "projects"
        ));
    }

    #[test]
    fn too_many_positional() {
        let err = lower_str(r#"include("a", True, False)"#).unwrap_err();
        assert!(matches!(err, ParseError::TooManyArguments { max: 2, .. }));
    }

    #[test]
    fn positional_after_keyword() {
        let err = lower_str(r#"include(name="a", True)"#).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn unknown_test_kind_names_the_rule() {
        let err = lower_str(r#"testmap(["p"], tests=[fuzztest("x")])"#).unwrap_err();
        match err {
            ParseError::UnknownTest { rule, kind } => {
                assert_eq!(kind, "fuzztest");
                assert!(rule.starts_with("testmap("));
            }
            other => panic!("expected UnknownTest, got {other:?}"),
        }
    }

    #[test]
    fn top_level_literal_is_not_a_rule() {
        let err = lower_str(r#""stray""#).unwrap_err();
        assert_eq!(
            err,
            ParseError::NotARule {
                found: "string \"stray\"".into()
            }
        );
    }
}
