use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;
use crate::component::{Component, Signature};
use crate::router::{Receiver, RoutedComponent};
use crate::EvalError;

fn div() -> Component {
    Component::markup(Signature::new("div"))
}

fn parse(evaluator: &mut Evaluator, source: &str) -> Node {
    match evaluator.parse(source) {
        Ok(root) => root,
        Err(err) => panic!("parse failed: {err}"),
    }
}

fn json_of(node: &Node) -> serde_json::Value {
    serde_json::to_value(node).unwrap()
}

#[test]
fn test_assignment_populates_attributes() {
    let root = parse(&mut Evaluator::new(), "x = 42");
    assert_eq!(root.attribute("x"), Some(&Value::Int(42)));
    assert!(root.children().is_empty());
    assert_eq!(root.tag(), None);
}

#[test]
fn test_assignment_does_not_bind_names() {
    let root = parse(&mut Evaluator::new(), "a = 1\nb = a");
    assert_eq!(root.attribute("a"), Some(&Value::Int(1)));
    assert_eq!(
        root.attribute("b"),
        Some(&Value::Error(EvalError::new("name 'a' is not defined")))
    );
}

#[test]
fn test_disallowed_import_aborts_parse() {
    let mut evaluator = Evaluator::new();
    let err = evaluator.parse("import forbidden_module");
    assert!(matches!(
        err,
        Err(SandboxError::DisallowedModule { ref name }) if name == "forbidden_module"
    ));
    assert!(evaluator.namespace().get("forbidden_module").is_none());
    assert_eq!(evaluator.state(), EvaluatorState::Ready);
}

#[test]
fn test_registered_component_call_becomes_child() {
    let mut evaluator = Evaluator::new();
    evaluator.register_component(div());
    let root = parse(&mut evaluator, "div()");
    assert_eq!(json_of(&root), json!({"children": [{"tag": "div", "children": []}]}));
}

#[test]
fn test_parses_are_independent_and_registrations_persist() {
    let mut evaluator = Evaluator::new();
    evaluator.register_component(div());
    evaluator.register_value("site", Value::str("docs"));

    let first = parse(&mut evaluator, "title = site\ndiv()");
    let second = parse(&mut evaluator, "other = site");

    assert_eq!(first.attribute("title"), Some(&Value::str("docs")));
    assert_eq!(first.children().len(), 1);
    assert_eq!(second.attribute("title"), None);
    assert_eq!(second.attribute("other"), Some(&Value::str("docs")));
    assert!(second.children().is_empty());
}

#[test]
fn test_undefined_name_marks_only_its_position() {
    let mut evaluator = Evaluator::new();
    evaluator.register_component(div());
    let root = parse(&mut evaluator, "div()\nmissing\ndiv()\nlabel = 'ok'");

    let children = root.children();
    assert_eq!(children.len(), 3);
    assert!(matches!(&children[0], Value::Node(node) if node.tag() == Some("div")));
    assert_eq!(
        children[1],
        Value::Error(EvalError::new("name 'missing' is not defined"))
    );
    assert!(matches!(&children[2], Value::Node(node) if node.tag() == Some("div")));
    assert_eq!(root.attribute("label"), Some(&Value::str("ok")));
    assert_eq!(
        json_of(&root)["children"][1],
        json!("<Evaluation Error: name 'missing' is not defined>")
    );
}

#[test]
fn test_expression_statement_shapes() {
    let root = parse(&mut Evaluator::new(), "{'a': 1}\nNone\n42\n'text'");
    assert_eq!(root.attribute("a"), Some(&Value::Int(1)));
    assert_eq!(root.children(), &[Value::Int(42), Value::str("text")]);
}

#[test]
fn test_root_reserved_keys() {
    let root = parse(&mut Evaluator::new(), "tag = 'page'\nchildren = [1, 2]");
    assert_eq!(root.tag(), Some("page"));
    assert_eq!(root.children(), &[Value::Int(1), Value::Int(2)]);
    assert!(root.attributes().is_empty());
}

#[test]
fn test_children_assignment_replaces_later_children() {
    let mut evaluator = Evaluator::new();
    evaluator.register_component(div());
    let root = parse(&mut evaluator, "children = [1]\ndiv()");
    assert_eq!(json_of(&root), json!({"children": [1]}));

    let root = parse(&mut evaluator, "div({'children': [1]}, 2)");
    assert_eq!(json_of(&root)["children"][0]["children"], json!([1]));
}

#[test]
fn test_none_tag_statement_keeps_tag_key() {
    let root = parse(&mut Evaluator::new(), "{'tag': None, 'a': 1}");
    assert_eq!(
        json_of(&root),
        json!({"children": [{"tag": null, "children": [], "a": 1}]})
    );
}

#[test]
fn test_over_range_integer_is_a_local_error() {
    let root = parse(&mut Evaluator::new(), "a = 1\nbig = 99999999999999999999\nb = 2");
    assert_eq!(root.attribute("a"), Some(&Value::Int(1)));
    assert_eq!(root.attribute("b"), Some(&Value::Int(2)));
    assert_eq!(
        root.attribute("big"),
        Some(&Value::error("integer literal too large: 99999999999999999999"))
    );
}

#[test]
fn test_repeating_an_empty_list_by_a_huge_count() {
    let root = parse(&mut Evaluator::new(), "x = [] * 10**18");
    assert_eq!(root.attribute("x"), Some(&Value::list(vec![])));
}

#[test]
fn test_ignored_statements() {
    let root = parse(&mut Evaluator::new(), "x = 1\nx += 1\ny: int = 2\npass");
    assert_eq!(json_of(&root), json!({"children": [], "x": 1}));
}

#[test]
fn test_syntax_error_reports_position() {
    let mut evaluator = Evaluator::new();
    let err = evaluator.parse("x = 1\nif x:\n    y = 2");
    assert!(matches!(err, Err(SandboxError::Parse { line: 2, .. })));
    assert_eq!(evaluator.state(), EvaluatorState::Ready);
}

#[test]
fn test_state_machine() {
    let mut evaluator = Evaluator::new();
    assert_eq!(evaluator.state(), EvaluatorState::Constructed);

    evaluator.register_module(["math"]);
    assert_eq!(evaluator.state(), EvaluatorState::Constructed);

    parse(&mut evaluator, "x = 1");
    assert_eq!(evaluator.state(), EvaluatorState::Done);

    evaluator.register_value("y", Value::Int(2));
    assert_eq!(evaluator.state(), EvaluatorState::Ready);

    parse(&mut evaluator, "z = y");
    assert_eq!(evaluator.state(), EvaluatorState::Done);
}

#[test]
fn test_denied_names_are_neutralized() {
    let mut evaluator = Evaluator::new();
    let root = parse(&mut evaluator, "a = open\nb = eval('1')");
    assert_eq!(root.attribute("a"), Some(&Value::None));
    assert_eq!(
        root.attribute("b"),
        Some(&Value::Error(EvalError::new("'NoneType' object is not callable")))
    );
    for name in DENIED_NAMES {
        assert_eq!(evaluator.namespace().get(name), Some(&Value::None), "{name}");
    }
}

#[test]
fn test_registrations_win_over_hardening() {
    let mut evaluator = Evaluator::new();
    evaluator.register_value("open", Value::Int(1));
    let root = parse(&mut evaluator, "a = open");
    assert_eq!(root.attribute("a"), Some(&Value::Int(1)));
}

#[test]
fn test_import_inside_expression_is_soft() {
    let root = parse(&mut Evaluator::new(), "m = __import__('os')\nok = 1");
    assert_eq!(
        root.attribute("m"),
        Some(&Value::Error(EvalError::new("Module os is not allowed")))
    );
    assert_eq!(root.attribute("ok"), Some(&Value::Int(1)));
}

#[test]
fn test_first_party_module_is_preloaded() {
    let root = parse(&mut Evaluator::new(), "a = attrs({'x': 1}, y=2)");
    assert_eq!(
        root.attribute("a"),
        Some(&Value::dict(
            [("x", Value::Int(1)), ("y", Value::Int(2))].into_iter().collect()
        ))
    );
}

#[test]
fn test_allowed_modules_preload_and_bind() {
    let mut evaluator = Evaluator::new();
    evaluator.register_module(["math"]);
    let source = "import math\nimport math as m\nfrom math import pi as p\n\
                  a = sqrt(16)\nb = math.floor(2.5)\nc = m.tau == 2 * p";
    let root = parse(&mut evaluator, source);
    assert_eq!(root.attribute("a"), Some(&Value::Float(4.0)));
    assert_eq!(root.attribute("b"), Some(&Value::Int(2)));
    assert_eq!(root.attribute("c"), Some(&Value::Bool(true)));
    assert!(root.children().is_empty());
}

#[test]
fn test_from_import_of_missing_symbol_is_skipped() {
    let mut evaluator = Evaluator::new();
    evaluator.register_module(["math"]);
    let root = parse(&mut evaluator, "from math import nothing, pi
a = nothing
b = pi");
    assert_eq!(
        root.attribute("a"),
        Some(&Value::error("name 'nothing' is not defined"))
    );
    assert_eq!(root.attribute("b"), Some(&Value::Float(std::f64::consts::PI)));
}

#[test]
fn test_builtin_tiers() {
    let mut evaluator = Evaluator::new();
    evaluator.register_builtin_tier([RiskTier::Normal]);
    assert!(evaluator.is_allowed("math"));
    assert!(evaluator.is_allowed("json"));
    assert!(!evaluator.is_allowed("os"));
    parse(&mut evaluator, "import string");

    evaluator.register_builtin_tier([RiskTier::Blocked]);
    let err = evaluator.parse("import subprocess");
    assert!(matches!(err, Err(SandboxError::ModuleNotFound { ref name }) if name == "subprocess"));
}

#[test]
fn test_defined_module_requires_allowlisting() {
    let mut evaluator = Evaluator::new();
    let symbols = [("accent", Value::str("teal"))].into_iter().collect();
    evaluator.define_module(Module::new("theme", symbols));

    let err = evaluator.parse("import theme");
    assert!(matches!(err, Err(SandboxError::DisallowedModule { .. })));

    evaluator.register_module(["theme"]);
    let root = parse(&mut evaluator, "color = accent");
    assert_eq!(root.attribute("color"), Some(&Value::str("teal")));
}

struct Fixed(Rc<Module>);

impl ModuleResolver for Fixed {
    fn resolve(&self, name: &str) -> Option<Rc<Module>> {
        (name == self.0.name()).then(|| Rc::clone(&self.0))
    }
}

#[test]
fn test_custom_resolver() {
    let module = Module::new("palette", [("red", Value::str("#f00"))].into_iter().collect());
    let mut evaluator = Evaluator::builder()
        .resolver(Fixed(Rc::new(module)))
        .build();
    evaluator.register_module(["palette"]);
    let root = parse(&mut evaluator, "from palette import red\nc = red");
    assert_eq!(root.attribute("c"), Some(&Value::str("#f00")));
}

#[test]
fn test_routed_component_delivers_during_parse() {
    let received = Rc::new(RefCell::new(Dict::new()));
    let mut evaluator = Evaluator::new();
    evaluator.register_component(RoutedComponent::new(
        Component::markup(Signature::new("meta").optional("name", Value::None)),
        Receiver::Map(Rc::clone(&received)),
    ));
    parse(&mut evaluator, "meta(name='viewport')");
    assert_eq!(received.borrow().get("name"), Some(&Value::str("viewport")));
}

#[test]
fn test_file_modules() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("settings.py"), "title = 'hi'\nport = 8000 + 80\n").unwrap();
    fs::create_dir(dir.path().join("pkg")).unwrap();
    fs::write(dir.path().join("pkg").join("base.py"), "from settings import port\nbase_port = port\n")
        .unwrap();

    let mut evaluator = Evaluator::builder().search_path(dir.path()).build();
    evaluator.register_module(["settings", "pkg.base"]);
    let root = parse(&mut evaluator, "import pkg.base\nfrom settings import title\nname = title\np = base_port");

    assert_eq!(root.attribute("name"), Some(&Value::str("hi")));
    assert_eq!(root.attribute("p"), Some(&Value::Int(8080)));
}

#[test]
fn test_file_module_errors() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.py"), "x = (\n").unwrap();
    fs::write(dir.path().join("a.py"), "import b\n").unwrap();
    fs::write(dir.path().join("b.py"), "import a\n").unwrap();

    let mut evaluator = Evaluator::builder().search_path(dir.path()).build();
    evaluator.register_module(["broken", "a", "b", "absent"]);

    let err = evaluator.parse("import broken");
    assert!(matches!(
        err,
        Err(SandboxError::ModuleLoad { ref name, ref source })
            if name == "broken" && matches!(**source, SandboxError::Parse { .. })
    ));

    let err = evaluator.parse("import a").map(|_| ());
    assert!(err.is_err_and(|err| {
        matches!(err, SandboxError::ModuleLoad { .. })
            && err.to_string().contains("cyclic import of module 'a'")
    }));

    let err = evaluator.parse("import absent");
    assert!(matches!(err, Err(SandboxError::ModuleNotFound { .. })));
}

#[test]
fn test_module_names_cannot_escape_search_paths() {
    let mut evaluator = Evaluator::new();
    evaluator.register_module(["../secret", "a..b"]);
    let root = parse(&mut evaluator, "m = __import__('../secret')\nn = __import__('a..b')");
    assert_eq!(
        root.attribute("m"),
        Some(&Value::Error(EvalError::new("No module named '../secret'")))
    );
    assert_eq!(
        root.attribute("n"),
        Some(&Value::Error(EvalError::new("No module named 'a..b'")))
    );
}
