//! Reload policy: style patch or full reload.
//!
//! | module code | style   | forced | outcome      |
//! |-------------|---------|--------|--------------|
//! | same        | same    | no     | `Unchanged`  |
//! | same        | changed | no     | `StylePatch` |
//! | changed     | any     | any    | `Reload`     |
//! | any         | any     | yes    | `Reload`     |
//!
//! A style patch keeps the markup the browser already holds, so the new
//! style is rewritten to the scope hash of the previous one. When the
//! previous style has no hash to borrow (a page gaining its first `<style>`)
//! the browser's scope class cannot be recovered, and the page reloads.

use std::sync::LazyLock;

use regex::Regex;

use crate::sync::RouteVersions;

static SCOPE_HASH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"kettle-([0-9a-f]+)").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    Unchanged,
    /// Style to push, already carrying the previous scope hash.
    StylePatch(String),
    Reload,
}

/// Compare the previous and current artifact of a route.
pub fn decide(versions: &RouteVersions, forced: bool) -> DiffOutcome {
    let Some(previous) = &versions.previous else {
        return DiffOutcome::Reload;
    };
    let current = &versions.current;

    if forced || previous.module_code != current.module_code {
        return DiffOutcome::Reload;
    }
    if previous.style == current.style {
        return DiffOutcome::Unchanged;
    }
    match rewrite_scope_hash(&current.style, &previous.style) {
        Some(code) => DiffOutcome::StylePatch(code),
        None => DiffOutcome::Reload,
    }
}

/// Replace every scope hash in `current` with the first one in `previous`.
///
/// `None` when `current` is scoped but `previous` carries no hash.
pub fn rewrite_scope_hash(current: &str, previous: &str) -> Option<String> {
    let Some(caps) = SCOPE_HASH.captures(previous) else {
        return (!SCOPE_HASH.is_match(current)).then(|| current.to_string());
    };
    let replacement = format!("kettle-{}", &caps[1]);
    Some(
        SCOPE_HASH
            .replace_all(current, regex::NoExpand(&replacement))
            .into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{RouteArtifact, RouteContents};
    use std::sync::Arc;

    fn artifact(code: &str, style: &str) -> Arc<RouteArtifact> {
        Arc::new(RouteArtifact::from_contents(RouteContents {
            source_relative_path: "index.page".into(),
            data_script: None,
            hydration_script: String::new(),
            module_code: code.into(),
            style: style.into(),
            dependencies: Vec::new(),
        }))
    }

    fn versions(prev: (&str, &str), cur: (&str, &str)) -> RouteVersions {
        RouteVersions {
            previous: Some(artifact(prev.0, prev.1)),
            current: artifact(cur.0, cur.1),
        }
    }

    #[test]
    fn test_unchanged() {
        let v = versions(("js", "h1.kettle-aa{}"), ("js", "h1.kettle-aa{}"));
        assert_eq!(decide(&v, false), DiffOutcome::Unchanged);
    }

    #[test]
    fn test_style_only_patches_with_previous_hash() {
        let v = versions(
            ("js", "h1.kettle-aa{color:red}"),
            ("js", "h1.kettle-bb{color:blue}p.kettle-bb{x:1}"),
        );
        assert_eq!(
            decide(&v, false),
            DiffOutcome::StylePatch("h1.kettle-aa{color:blue}p.kettle-aa{x:1}".into())
        );
    }

    #[test]
    fn test_module_change_reloads() {
        let v = versions(("js1", "a"), ("js2", "a"));
        assert_eq!(decide(&v, false), DiffOutcome::Reload);
        let v = versions(("js1", "a"), ("js2", "b"));
        assert_eq!(decide(&v, false), DiffOutcome::Reload);
    }

    #[test]
    fn test_forced_reloads() {
        let v = versions(("js", "a"), ("js", "a"));
        assert_eq!(decide(&v, true), DiffOutcome::Reload);
        let v = versions(("js", "a"), ("js", "b"));
        assert_eq!(decide(&v, true), DiffOutcome::Reload);
    }

    #[test]
    fn test_no_previous_reloads() {
        let v = RouteVersions {
            previous: None,
            current: artifact("js", "a"),
        };
        assert_eq!(decide(&v, false), DiffOutcome::Reload);
    }

    #[test]
    fn test_first_style_reloads() {
        let v = versions(("js", ""), ("js", "h1.kettle-bb{color:red}"));
        assert_eq!(decide(&v, false), DiffOutcome::Reload);
        assert_eq!(rewrite_scope_hash("p.kettle-bb{}", ""), None);
    }

    #[test]
    fn test_style_removed_patches_empty() {
        let v = versions(("js", "h1.kettle-aa{color:red}"), ("js", ""));
        assert_eq!(decide(&v, false), DiffOutcome::StylePatch(String::new()));
        assert_eq!(rewrite_scope_hash("", ""), Some(String::new()));
    }
}
