//! Markup transforms: component inlining, scope classes, interpolation.

use std::borrow::Cow;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::compiler::CompileError;
use crate::utils::html::escape;

static COMPONENT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([A-Z][A-Za-z0-9_]*)\s*/>").unwrap());

static OPEN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([a-z][a-z0-9-]*)((?:\s[^>]*?)?)(\s*/?)>").unwrap());

static CLASS_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bclass\s*=\s*"([^"]*)""#).unwrap());

static DATA_EXPR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\s*data((?:\.[A-Za-z0-9_]+)*)\s*\}").unwrap());

static REQUEST_EXPR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\s*(params|query)\.([A-Za-z0-9_]+)\s*\}").unwrap());

/// Replace `<Name />` with the markup of the imported component.
pub fn inline_components(
    path: &Path,
    markup: &str,
    components: &FxHashMap<String, String>,
) -> Result<String, CompileError> {
    if let Some(caps) = COMPONENT_TAG
        .captures_iter(markup)
        .find(|caps| !components.contains_key(&caps[1]))
    {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        return Err(
            CompileError::new(path, format!("unknown component `{}`", &caps[1]))
                .at(markup, whole.start, whole.len()),
        );
    }

    Ok(COMPONENT_TAG
        .replace_all(markup, |caps: &Captures<'_>| {
            components.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned())
}

/// Add `class` to every opening tag.
pub fn add_scope_class(markup: &str, class: &str) -> String {
    OPEN_TAG
        .replace_all(markup, |caps: &Captures<'_>| {
            let tag = &caps[1];
            let attrs = &caps[2];
            let tail = &caps[3];

            let attrs: Cow<'_, str> = if CLASS_ATTR.is_match(attrs) {
                CLASS_ATTR.replace(attrs, |c: &Captures<'_>| {
                    format!("class=\"{} {class}\"", &c[1])
                })
            } else {
                Cow::Owned(format!(" class=\"{class}\"{attrs}"))
            };
            format!("<{tag}{attrs}{tail}>")
        })
        .into_owned()
}

/// Fill `{data.a.b}` expressions from the page data, HTML escaped.
pub fn interpolate(template: &str, data: &Value) -> String {
    DATA_EXPR
        .replace_all(template, |caps: &Captures<'_>| {
            let value = caps[1]
                .split('.')
                .filter(|s| !s.is_empty())
                .try_fold(data, |value, key| match value {
                    Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
                    _ => value.get(key),
                });
            escape(&display_value(value)).into_owned()
        })
        .into_owned()
}

/// Fill `{params.x}` and `{query.x}` from a request.
///
/// `json` bodies get string-escaped values so the result stays valid JSON.
pub fn fill_request(
    template: &str,
    params: impl Fn(&str) -> Option<String>,
    query: impl Fn(&str) -> Option<String>,
    json: bool,
) -> String {
    REQUEST_EXPR
        .replace_all(template, |caps: &Captures<'_>| {
            let value = match &caps[1] {
                "params" => params(&caps[2]),
                _ => query(&caps[2]),
            }
            .unwrap_or_default();

            if json {
                let quoted = Value::String(value).to_string();
                quoted[1..quoted.len() - 1].to_string()
            } else {
                value
            }
        })
        .into_owned()
}

fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inline_components() {
        let mut components = FxHashMap::default();
        components.insert("Nav".to_string(), "<nav>menu</nav>".to_string());

        let out = inline_components(Path::new("/src/a.page"), "<Nav />\n<p>x</p><Nav/>", &components)
            .unwrap();
        assert_eq!(out, "<nav>menu</nav>\n<p>x</p><nav>menu</nav>");

        let err = inline_components(Path::new("/src/a.page"), "<p/>\n<Footer />", &components)
            .unwrap_err();
        assert_eq!(err.message, "unknown component `Footer`");
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_add_scope_class() {
        let out = add_scope_class(
            r#"<div><h1 id="t">Hi</h1><p class="lead">x</p><br/><img src="a.png" /></div>"#,
            "kettle-ab",
        );
        assert_eq!(
            out,
            r#"<div class="kettle-ab"><h1 class="kettle-ab" id="t">Hi</h1><p class="lead kettle-ab">x</p><br class="kettle-ab"/><img class="kettle-ab" src="a.png" /></div>"#
        );
    }

    #[test]
    fn test_comments_and_closing_tags_untouched() {
        assert_eq!(add_scope_class("<!-- c --></p>", "k"), "<!-- c --></p>");
    }

    #[test]
    fn test_interpolate() {
        let data = json!({"user": {"name": "<Ada>"}, "n": 3, "tags": ["a", "b"]});
        let out = interpolate("{data.user.name} {data.n} {data.tags.1} [{data.missing}]", &data);
        assert_eq!(out, "&lt;Ada&gt; 3 b []");
    }

    #[test]
    fn test_fill_request() {
        let params = |k: &str| (k == "id").then(|| "7".to_string());
        let query = |k: &str| (k == "q").then(|| "a\"b".to_string());

        assert_eq!(
            fill_request("user {params.id} {query.q}", params, query, false),
            "user 7 a\"b"
        );
        assert_eq!(
            fill_request(r#"{"id":"{params.id}","q":"{query.q}"}"#, params, query, true),
            r#"{"id":"7","q":"a\"b"}"#
        );
    }
}
