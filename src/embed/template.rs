//! Template types for typed variable injection.

use std::marker::PhantomData;

/// Trait for template variable sets
pub trait TemplateVars {
    /// Placeholder name and value pairs, names without the surrounding `__`.
    fn pairs(&self) -> Vec<(&'static str, &str)>;
}

/// Template with typed variable injection
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        fill(self.content, &vars.pairs())
    }
}

/// Replace `__NAME__` placeholders in a single pass.
///
/// Inserted values are never rescanned, so user content that happens to
/// contain a placeholder name passes through untouched. Unknown
/// placeholders are left as they are.
fn fill(content: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(content.len() + pairs.iter().map(|(_, v)| v.len()).sum::<usize>());
    let mut rest = content;

    while let Some(start) = rest.find("__") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let replaced = after.find("__").and_then(|end| {
            let name = &after[..end];
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (value, end))
        });
        match replaced {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("__");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_single_pass() {
        let out = fill("<p>__A__|__B__</p>", &[("A", "__B__"), ("B", "b")]);
        assert_eq!(out, "<p>__B__|b</p>");
    }

    #[test]
    fn test_fill_unknown_kept() {
        assert_eq!(fill("x __dunder__ y", &[("A", "1")]), "x __dunder__ y");
        assert_eq!(fill("tail __", &[]), "tail __");
    }
}
