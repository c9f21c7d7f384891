//! Style scoping.
//!
//! Every selector of a page's style gets a `.kettle-<hash>` class appended,
//! and every element of its markup gets the same class. The hash is derived
//! from the raw style text, so a style edit changes the hash while leaving
//! the unscoped markup (and therefore the module code) untouched.

use std::sync::LazyLock;

use regex::Regex;

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

/// At-rules whose blocks hold ordinary rules.
const NESTING_AT_RULES: [&str; 4] = ["media", "supports", "container", "layer"];

/// 8 hex digits of the blake3 hash of `style`.
pub fn scope_hash(style: &str) -> String {
    let hash = blake3::hash(style.as_bytes());
    hex::encode(&hash.as_bytes()[..4])
}

pub fn scope_class(hash: &str) -> String {
    format!("kettle-{hash}")
}

/// Compact `css` and append `.class` to every selector.
///
/// Keyframes and other non-nesting at-rules are copied as they are.
pub fn scope_css(css: &str, class: &str) -> String {
    let css = COMMENT.replace_all(css, "");
    let mut out = String::with_capacity(css.len() + 64);
    scope_block(&css, class, &mut out);
    out
}

fn scope_block(css: &str, class: &str, out: &mut String) {
    let mut rest = css;

    while let Some(open) = rest.find('{') {
        let Some(close) = matching_brace(rest, open) else {
            out.push_str(rest.trim());
            return;
        };

        let mut prelude = rest[..open].trim();
        // Statement at-rules (`@import ...;`) ahead of the block.
        if let Some(end) = prelude.rfind(';') {
            out.push_str(prelude[..=end].trim());
            prelude = prelude[end + 1..].trim();
        }
        let body = rest[open + 1..close].trim();

        if let Some(at_rule) = prelude.strip_prefix('@') {
            out.push_str(prelude);
            out.push('{');
            if NESTING_AT_RULES.iter().any(|name| at_rule.starts_with(name)) {
                scope_block(body, class, out);
            } else {
                out.push_str(body);
            }
            out.push('}');
        } else {
            let selectors: Vec<_> = prelude
                .split(',')
                .map(|s| scope_selector(s.trim(), class))
                .collect();
            out.push_str(&selectors.join(","));
            out.push('{');
            out.push_str(body);
            out.push('}');
        }

        rest = &rest[close + 1..];
    }

    out.push_str(rest.trim());
}

fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in text.bytes().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Pseudo-elements must stay last, so the class goes in front of them.
fn scope_selector(selector: &str, class: &str) -> String {
    if selector.is_empty() {
        return String::new();
    }
    match selector.find("::") {
        Some(i) => format!("{}.{class}{}", &selector[..i], &selector[i..]),
        None => format!("{selector}.{class}"),
    }
}
