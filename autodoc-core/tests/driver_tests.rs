//! End-to-end runs of the documentation loop over fixture modules

use autodoc_core::{
    document_file, parse, DriverOptions, OracleError, ParseError, ScriptedOracle, SyntaxTree,
};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join("python")
        .join(name)
}

/// Copy a fixture into a scratch directory so runs can rewrite it
fn scratch_copy(name: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    fs::copy(fixture_path(name), &path).unwrap();
    (dir, path)
}

fn reparse(path: &Path) -> SyntaxTree {
    parse(&fs::read_to_string(path).unwrap()).unwrap()
}

fn docstring_counts(tree: &SyntaxTree) -> Vec<(String, usize)> {
    tree.functions()
        .map(|function| (function.name.clone(), function.docstring_count()))
        .collect()
}

/// Answers every prompt with a docstring naming the function, except `failing`
fn naming_oracle(failing: Option<&'static str>) -> impl Fn(&str) -> Result<String, OracleError> {
    move |prompt: &str| {
        let name = prompt
            .split("def ")
            .nth(1)
            .and_then(|rest| rest.split('(').next())
            .unwrap_or("unknown")
            .to_string();
        if Some(name.as_str()) == failing {
            return Ok("I could not document this one.".to_string());
        }
        Ok(format!("Here is the docstring:\n\"\"\"Document {}.\"\"\"", name))
    }
}

#[test]
fn test_every_function_documented_exactly_once() {
    let (_dir, path) = scratch_copy("mixed.py");
    let oracle = ScriptedOracle::always("\"\"\"Generated.\"\"\"");

    let summary = document_file(&path, &oracle, &DriverOptions::default()).unwrap();

    assert_eq!(
        summary.documented,
        vec!["outer", "key", "__init__", "lookup", "fetch"]
    );
    assert!(summary.skipped.is_empty());
    assert_eq!(oracle.calls(), 5);

    let tree = reparse(&path);
    for (name, count) in docstring_counts(&tree) {
        assert_eq!(count, 1, "{} should have exactly one docstring", name);
    }
    for function in tree.functions() {
        let first = function.body.statements.first().unwrap();
        assert!(first.as_documentation().is_some(), "{}", function.name);
    }
    assert_eq!(fs::read_to_string(&path).unwrap(), summary.source);
}

#[test]
fn test_second_run_doubles_docstrings() {
    let (_dir, path) = scratch_copy("three_functions.py");
    let oracle = ScriptedOracle::always("\"\"\"Generated.\"\"\"");

    document_file(&path, &oracle, &DriverOptions::default()).unwrap();
    document_file(&path, &oracle, &DriverOptions::default()).unwrap();

    let counts = docstring_counts(&reparse(&path));
    assert_eq!(
        counts,
        vec![
            ("add".to_string(), 2),
            ("scale".to_string(), 2),
            ("hypotenuse".to_string(), 2),
        ]
    );
}

#[test]
fn test_failing_function_is_skipped_and_unchanged() {
    let (_dir, path) = scratch_copy("three_functions.py");
    let original = parse(&fs::read_to_string(&path).unwrap()).unwrap();
    let oracle = naming_oracle(Some("scale"));

    let summary = document_file(&path, &oracle, &DriverOptions::default()).unwrap();

    assert_eq!(summary.documented, vec!["add", "hypotenuse"]);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].name, "scale");
    assert!(summary.skipped[0].reason.contains("for function scale"));

    let tree = reparse(&path);
    assert_eq!(
        docstring_counts(&tree),
        vec![
            ("add".to_string(), 1),
            ("scale".to_string(), 0),
            ("hypotenuse".to_string(), 1),
        ]
    );

    let before = original.functions().find(|f| f.name == "scale").unwrap();
    let after = tree.functions().find(|f| f.name == "scale").unwrap();
    assert_eq!(
        original.source_segment(&before.span),
        tree.source_segment(&after.span)
    );
}

#[test]
fn test_file_is_persisted_after_each_patch() {
    let (_dir, path) = scratch_copy("three_functions.py");
    let original = fs::read_to_string(&path).unwrap();
    let snapshot: RefCell<Option<String>> = RefCell::new(None);

    let oracle = |prompt: &str| -> Result<String, OracleError> {
        if prompt.contains("def scale") && snapshot.borrow().is_none() {
            *snapshot.borrow_mut() = Some(fs::read_to_string(&path).unwrap());
        }
        Ok("\"\"\"Doc.\"\"\"".to_string())
    };

    document_file(&path, &oracle, &DriverOptions::default()).unwrap();

    let snapshot = snapshot.into_inner().expect("scale was never requested");
    let expected = original.replace(
        "def add(a, b):\n",
        "def add(a, b):\n    \"\"\"Doc.\"\"\"\n",
    );
    assert_eq!(snapshot, expected);
}

#[test]
fn test_regeneration_within_attempt_budget() {
    let (_dir, path) = scratch_copy("three_functions.py");
    let oracle = ScriptedOracle::replies([
        "no delimiter",
        "\"\"\"Add.\"\"\"",
        "\"\"\"Scale.\"\"\"",
        "still nothing",
        "nothing again",
    ]);

    let summary = document_file(&path, &oracle, &DriverOptions::default()).unwrap();

    assert_eq!(summary.documented, vec!["add", "scale"]);
    assert_eq!(summary.skipped[0].name, "hypotenuse");
    assert_eq!(oracle.calls(), 5);
}

#[test]
fn test_oracle_outage_skips_everything_without_writing() {
    let (_dir, path) = scratch_copy("mixed.py");
    let before = fs::read_to_string(&path).unwrap();
    let oracle = ScriptedOracle::new(Vec::new())
        .with_fallback(Err(OracleError::Transient("503 unavailable".into())));

    let summary = document_file(&path, &oracle, &DriverOptions::default()).unwrap();

    assert!(summary.documented.is_empty());
    assert_eq!(summary.skipped.len(), 5);
    assert_eq!(oracle.calls(), 5);
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_syntax_error_is_reported_before_any_call() {
    let (_dir, path) = scratch_copy("syntax_error.py");
    let before = fs::read_to_string(&path).unwrap();
    let oracle = ScriptedOracle::always("\"\"\"Doc.\"\"\"");

    let err = document_file(&path, &oracle, &DriverOptions::default()).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ParseError>(),
        Some(ParseError::Syntax { .. })
    ));
    assert_eq!(oracle.calls(), 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_python2_module_is_a_syntax_error() {
    let (_dir, path) = scratch_copy("python2_print.py");
    let before = fs::read_to_string(&path).unwrap();
    let oracle = ScriptedOracle::always("\"\"\"Doc.\"\"\"");

    let err = document_file(&path, &oracle, &DriverOptions::default()).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ParseError>(),
        Some(ParseError::Syntax { line: 2, .. })
    ));
    assert_eq!(oracle.calls(), 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_non_python_target_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "def f():\n    pass\n").unwrap();
    let oracle = ScriptedOracle::always("\"\"\"Doc.\"\"\"");

    assert!(document_file(&path, &oracle, &DriverOptions::default()).is_err());
    assert_eq!(oracle.calls(), 0);
}
