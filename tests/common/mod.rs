//! Shared fixture loader for the integration tests.
//!
//! Queries live in `tests/cases/*.mdx`; the expected analysis of a query, when
//! recorded, lives in `tests/assert/<stem>.json`.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// One query fixture.
#[derive(Debug, Clone)]
pub struct Case {
    pub name: String,
    pub path: PathBuf,
    pub query: String,
    pub expected: Option<PathBuf>,
}

pub fn tests_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests")
}

/// Discovers every `.mdx` case, sorted by name.
pub fn load_cases() -> Vec<Case> {
    let root = tests_dir();
    let mut cases: Vec<Case> = WalkDir::new(root.join("cases"))
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.path().extension().map_or(false, |x| x == "mdx"))
        .map(|entry| {
            let path = entry.path().to_path_buf();
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let query = std::fs::read_to_string(&path)
                .unwrap_or_else(|e| panic!("failed to read case '{}': {e}", path.display()));
            let expected = root.join("assert").join(format!("{name}.json"));
            Case {
                name,
                path,
                query,
                expected: expected.is_file().then_some(expected),
            }
        })
        .collect();
    cases.sort_by(|a, b| a.name.cmp(&b.name));
    cases
}

pub fn case(name: &str) -> Case {
    load_cases()
        .into_iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("no case named '{name}'"))
}
