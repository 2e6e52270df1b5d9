//! Helpers for inventory locations.
//!
//! A location is a POSIX-style path relative to a graph root, e.g.
//! `node_modules/pkg2/node_modules/@org/pkg3`. The root itself is the empty
//! string. Linked packages outside the root use `../` segments.

use std::path::{Component, Path};

use path_clean::PathClean;

use crate::package_json::extract_package_name;

pub const NODE_MODULES: &str = "node_modules";

/// Normalize a location: resolve `.`/`..` segments, use `/` separators and
/// map the root to `""`.
pub fn normalize(location: &str) -> String {
    if location.is_empty() {
        return String::new();
    }
    let cleaned = Path::new(location).clean();
    let joined = to_location(&cleaned);
    if joined == "." { String::new() } else { joined }
}

/// Join two locations, either of which may be the root.
pub fn join(base: &str, rest: &str) -> String {
    match (base.is_empty(), rest.is_empty()) {
        (true, _) => normalize(rest),
        (_, true) => normalize(base),
        _ => normalize(&format!("{base}/{rest}")),
    }
}

/// Convert a relative filesystem path into a location string.
pub fn to_location(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::CurDir => None,
            other => Some(other.as_os_str().to_string_lossy().into_owned()),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Location of `to` relative to `from`, e.g. `/code/project` →
/// `/code/project/node_modules/pkg1` gives `node_modules/pkg1`, and
/// `/code/pkg2` gives `../pkg2`.
pub fn relative(from: &Path, to: &Path) -> Option<String> {
    pathdiff::diff_paths(to, from).map(|diff| normalize(&to_location(&diff)))
}

/// Location of the package whose `node_modules` directory contains
/// `location`. Packages outside any `node_modules` (workspace folders, links
/// targets) are owned by the root.
pub fn parent_package(location: &str) -> &str {
    let needle = "node_modules/";
    let mut search_end = location.len();
    while let Some(idx) = location[..search_end].rfind(needle) {
        if idx == 0 {
            return "";
        }
        if location.as_bytes()[idx - 1] == b'/' {
            return &location[..idx - 1];
        }
        search_end = idx;
    }
    ""
}

/// Package name implied by a location: everything after the last
/// `node_modules/`, or the last path segment for folders.
pub fn package_name(location: &str) -> &str {
    match location.rfind("node_modules/") {
        Some(idx) => &location[idx + "node_modules/".len()..],
        None => location.rsplit('/').next().unwrap_or(location),
    }
}

/// Split a bare specifier into module id and the subpath inside it.
///
/// `@org/abc/stuff` → (`@org/abc`, `/stuff`), `pkg3` → (`pkg3`, ``)
pub fn split_specifier(specifier: &str) -> (&str, &str) {
    let module_id = extract_package_name(specifier);
    (module_id, &specifier[module_id.len()..])
}

/// Reduce an external import id to the module root it lives in.
///
/// `pkg2/node_modules/pkg3/stuff` → `pkg2/node_modules/pkg3`, scoped names
/// keep both segments: `@org/pkg/node_modules/dep/x` → `@org/pkg/node_modules/dep`.
pub fn module_root_of_import(import: &str) -> &str {
    let mut end = 0;
    let mut rest = import;
    loop {
        let name = extract_package_name(rest);
        if name.is_empty() {
            break;
        }
        end += name.len();
        rest = &rest[name.len()..];
        match rest.strip_prefix("/node_modules/") {
            Some(tail) if !tail.is_empty() => {
                end += "/node_modules/".len();
                rest = tail;
            }
            _ => break,
        }
    }
    &import[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_segments() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("."), "");
        assert_eq!(normalize("./node_modules/a"), "node_modules/a");
        assert_eq!(normalize("packages/ws/../other"), "packages/other");
        assert_eq!(normalize("../shared"), "../shared");
    }

    #[test]
    fn join_handles_root() {
        assert_eq!(join("", "node_modules/a"), "node_modules/a");
        assert_eq!(join("node_modules/a", ""), "node_modules/a");
        assert_eq!(join("..", "node_modules/a"), "../node_modules/a");
        assert_eq!(join("node_modules/a", "node_modules/b"), "node_modules/a/node_modules/b");
    }

    #[test]
    fn parent_package_walks_up_one_install_level() {
        assert_eq!(parent_package("node_modules/a"), "");
        assert_eq!(parent_package("node_modules/a/node_modules/b"), "node_modules/a");
        assert_eq!(
            parent_package("node_modules/a/node_modules/@s/b"),
            "node_modules/a"
        );
        assert_eq!(parent_package("packages/ws"), "");
        assert_eq!(parent_package("packages/ws/node_modules/x"), "packages/ws");
        assert_eq!(parent_package(""), "");
    }

    #[test]
    fn package_name_from_location() {
        assert_eq!(package_name("node_modules/a"), "a");
        assert_eq!(package_name("node_modules/a/node_modules/@s/b"), "@s/b");
        assert_eq!(package_name("packages/ws"), "ws");
    }

    #[test]
    fn split_specifier_keeps_scope() {
        assert_eq!(split_specifier("@org/abc/stuff"), ("@org/abc", "/stuff"));
        assert_eq!(split_specifier("pkg3/stuff"), ("pkg3", "/stuff"));
        assert_eq!(split_specifier("pkg3"), ("pkg3", ""));
    }

    #[test]
    fn module_root_of_nested_imports() {
        assert_eq!(module_root_of_import("pkg3"), "pkg3");
        assert_eq!(module_root_of_import("pkg3/stuff"), "pkg3");
        assert_eq!(
            module_root_of_import("pkg2/node_modules/pkg3/stuff"),
            "pkg2/node_modules/pkg3"
        );
        assert_eq!(module_root_of_import("@org/pkg/lib/x.js"), "@org/pkg");
        assert_eq!(
            module_root_of_import("@org/pkg/node_modules/@s/dep/x"),
            "@org/pkg/node_modules/@s/dep"
        );
    }

    #[test]
    fn relative_locations() {
        let root = Path::new("/code/project");
        assert_eq!(
            relative(root, Path::new("/code/project/node_modules/pkg1")).as_deref(),
            Some("node_modules/pkg1")
        );
        assert_eq!(relative(root, Path::new("/code/pkg2")).as_deref(), Some("../pkg2"));
        assert_eq!(relative(root, root).as_deref(), Some(""));
    }
}
