//! Built-in data runtime: data scripts written as JSON documents.
//!
//! String values starting with `$` are bindings resolved per request:
//!
//! ```json
//! {
//!   "id": "$params.id",
//!   "tab": "$query.tab",
//!   "posts": "$store.posts",
//!   "path": "$request.path",
//!   "pid": "$process.pid",
//!   "weather": "$fetch.https://example.com/weather.json",
//!   "price": "$$5",
//!   "$console": "rendering a user page"
//! }
//! ```
//!
//! `$$` escapes a literal dollar. A top-level `$console` string is written to
//! the log on each call and left out of the result.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::{DataHandler, DataRuntime, LinkError, Sandbox};
use crate::core::RequestInfo;

const CONSOLE_KEY: &str = "$console";

/// Runtime for JSON data scripts.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRuntime;

impl DataRuntime for JsonRuntime {
    fn link(&self, source: &str) -> Result<Arc<dyn DataHandler>, LinkError> {
        let mut document: Value =
            serde_json::from_str(source.trim()).map_err(|e| LinkError::Syntax(e.to_string()))?;

        let console = match &mut document {
            Value::Object(map) => match map.remove(CONSOLE_KEY) {
                Some(Value::String(text)) => Some(text),
                Some(_) => {
                    return Err(LinkError::Syntax(format!("`{CONSOLE_KEY}` must be a string")));
                }
                None => None,
            },
            _ => None,
        };

        check_bindings(&document)?;
        Ok(Arc::new(JsonHandler { document, console }))
    }
}

struct JsonHandler {
    document: Value,
    console: Option<String>,
}

impl DataHandler for JsonHandler {
    fn call(&self, request: &RequestInfo, sandbox: &Sandbox) -> Result<Value, LinkError> {
        if let Some(text) = &self.console {
            sandbox.console(text);
        }
        resolve(&self.document, request, sandbox)
    }
}

// ============================================================================
// Bindings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Binding<'a> {
    Request(&'a str),
    Param(&'a str),
    Query(&'a str),
    Store(&'a str),
    Process(&'a str),
    Fetch(&'a str),
}

/// Parse a `$namespace.rest` string. `Ok(None)` for plain and `$$` strings.
fn parse_binding(text: &str) -> Result<Option<Binding<'_>>, LinkError> {
    let Some(expr) = text.strip_prefix('$') else {
        return Ok(None);
    };
    if expr.starts_with('$') {
        return Ok(None);
    }

    let unknown = || LinkError::UnknownBinding(text.to_string());
    let (namespace, rest) = expr.split_once('.').ok_or_else(unknown)?;
    if rest.is_empty() {
        return Err(unknown());
    }

    let binding = match namespace {
        "request" if matches!(rest, "path" | "method" | "url" | "body") => Binding::Request(rest),
        "params" => Binding::Param(rest),
        "query" => Binding::Query(rest),
        "store" => Binding::Store(rest),
        "process" if matches!(rest, "pid" | "mode" | "version") => Binding::Process(rest),
        "fetch" => Binding::Fetch(rest),
        _ => return Err(unknown()),
    };
    Ok(Some(binding))
}

/// Reject unknown bindings at link time rather than on first request.
fn check_bindings(value: &Value) -> Result<(), LinkError> {
    match value {
        Value::String(text) => parse_binding(text).map(|_| ()),
        Value::Array(items) => items.iter().try_for_each(check_bindings),
        Value::Object(map) => map.values().try_for_each(check_bindings),
        _ => Ok(()),
    }
}

fn resolve(value: &Value, request: &RequestInfo, sandbox: &Sandbox) -> Result<Value, LinkError> {
    Ok(match value {
        Value::String(text) => match parse_binding(text)? {
            Some(binding) => evaluate(binding, request, sandbox),
            None => match text.strip_prefix('$') {
                Some(literal) => Value::String(literal.to_string()),
                None => value.clone(),
            },
        },
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| resolve(item, request, sandbox))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key.clone(), resolve(item, request, sandbox)?);
            }
            Value::Object(out)
        }
        other => other.clone(),
    })
}

fn evaluate(binding: Binding<'_>, request: &RequestInfo, sandbox: &Sandbox) -> Value {
    let text = |s: Option<&str>| s.map_or(Value::Null, |s| Value::String(s.to_string()));

    match binding {
        Binding::Request("path") => Value::String(request.path.clone()),
        Binding::Request("url") => Value::String(request.url.clone()),
        Binding::Request("body") => Value::String(request.body.clone()),
        Binding::Request(_) => text(request.method.map(|m| m.as_str())),
        Binding::Param(name) => text(request.param(name)),
        Binding::Query(name) => text(request.query(name)),
        Binding::Store(key) => sandbox.store().get(key).unwrap_or(Value::Null),
        Binding::Process("pid") => Value::from(sandbox.process().pid),
        Binding::Process("mode") => Value::String(sandbox.process().mode.as_str().to_string()),
        Binding::Process(_) => Value::String(sandbox.process().version.to_string()),
        Binding::Fetch(url) => sandbox.fetch(url),
    }
}
