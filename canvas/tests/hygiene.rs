//! Hygiene — keeps panic paths and silent error loss out of the core.
//!
//! The canvas crate promises its host that geometry violations are clamped
//! and stale targets are no-ops — never crashes, never dropped errors.
//! These tests scan the production sources for constructs that would break
//! that promise. Every budget is zero and never grows.

use std::fs;
use std::path::Path;

/// `(needle, why it is banned)` — every budget is zero.
const BANNED: &[(&str, &str)] = &[
    (".unwrap()", "panics on None/Err"),
    (".expect(", "panics on None/Err"),
    ("panic!(", "crashes the host event loop"),
    ("unreachable!(", "crashes when the impossible happens"),
    ("todo!(", "unfinished stub"),
    ("unimplemented!(", "unfinished stub"),
    ("let _ =", "discards a result without inspecting it"),
    (".ok()", "discards an error without inspecting it"),
    ("#[allow(dead_code)]", "hides unused code instead of removing it"),
];

/// Collect production `.rs` files under `src/`, excluding sibling test
/// files (`*_test.rs`).
fn production_sources(dir: &Path, out: &mut Vec<(String, String)>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            production_sources(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            let name = path.to_string_lossy().to_string();
            if name.ends_with("_test.rs") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(&path) {
                out.push((name, content));
            }
        }
    }
}

#[test]
fn production_sources_stay_panic_free() {
    let mut files = Vec::new();
    production_sources(Path::new("src"), &mut files);
    assert!(!files.is_empty(), "no sources found — wrong working directory?");

    let mut violations = Vec::new();
    for (path, content) in &files {
        for (needle, reason) in BANNED {
            for (lineno, line) in content.lines().enumerate() {
                if line.contains(needle) {
                    violations.push(format!("  {path}:{} — `{needle}` ({reason})", lineno + 1));
                }
            }
        }
    }
    assert!(
        violations.is_empty(),
        "hygiene violations in canvas sources:\n{}",
        violations.join("\n")
    );
}
