//! Splitting a view file into its sections.
//!
//! ```text
//! <data>{ "title": "$params.id" }</data>
//! <script>
//! import Nav from './Nav.component';
//! console.log(data.title);
//! </script>
//! <style>h1 { color: red; }</style>
//! <Nav />
//! <h1>{data.title}</h1>
//! ```
//!
//! Each tagged section may appear at most once; whatever is left over is
//! the markup.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::compiler::CompileError;
use crate::core::FileKind;

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*import[ \t]+([A-Za-z_][A-Za-z0-9_]*)[ \t]+from[ \t]+['"]([^'"]+)['"][ \t]*;?[ \t]*$"#)
        .unwrap()
});

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Sections {
    pub data: Option<String>,
    pub script: String,
    pub style: String,
    pub markup: String,
}

/// One `import Name from './X.component'` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub name: String,
    pub path: PathBuf,
}

pub fn split(path: &Path, source: &str) -> Result<Sections, CompileError> {
    let mut markup = source.to_string();
    let data = take_section(path, source, &mut markup, "data")?;
    let script = take_section(path, source, &mut markup, "script")?;
    let style = take_section(path, source, &mut markup, "style")?;

    Ok(Sections {
        data: data.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
        script: script.map(|s| s.trim().to_string()).unwrap_or_default(),
        style: style.map(|s| s.trim().to_string()).unwrap_or_default(),
        markup: markup.trim().to_string(),
    })
}

/// Cut `<tag>...</tag>` out of `markup`, returning its body.
fn take_section(
    path: &Path,
    source: &str,
    markup: &mut String,
    tag: &str,
) -> Result<Option<String>, CompileError> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let located = |message: String| {
        let offset = source.find(&open).unwrap_or(0);
        CompileError::new(path, message).at(source, offset, open.len())
    };

    let Some(start) = markup.find(&open) else {
        return Ok(None);
    };
    let body_start = start + open.len();
    let Some(len) = markup[body_start..].find(&close) else {
        return Err(located(format!("unclosed {open}")));
    };
    let body_end = body_start + len;

    let body = markup[body_start..body_end].to_string();
    markup.replace_range(start..body_end + close.len(), "");

    if markup.contains(&open) {
        return Err(located(format!("more than one {open} section")));
    }
    Ok(Some(body))
}

/// Parse import lines and return the script with them removed.
pub fn imports(path: &Path, script: &str) -> Result<(Vec<Import>, String), CompileError> {
    let dir = path.parent().unwrap_or(Path::new(""));
    let mut found = Vec::new();

    for caps in IMPORT.captures_iter(script) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        let name = &caps[1];
        let target = &caps[2];

        if !(target.starts_with("./") || target.starts_with("../")) {
            return Err(CompileError::new(path, format!("import `{target}` must be relative"))
                .at(script, whole.start, whole.len()));
        }
        let resolved = join_relative(dir, target);
        if !FileKind::from_path(&resolved).is_some_and(|k| k.is_view() && !k.is_page()) {
            return Err(CompileError::new(
                path,
                format!("`{target}` is not a component or layout"),
            )
            .at(script, whole.start, whole.len()));
        }
        if found.iter().any(|i: &Import| i.name == name) {
            return Err(CompileError::new(path, format!("`{name}` imported twice"))
                .at(script, whole.start, whole.len()));
        }

        found.push(Import {
            name: name.to_string(),
            path: resolved,
        });
    }

    let rest = IMPORT.replace_all(script, "").trim().to_string();
    Ok((found, rest))
}

/// Join without touching the file system, folding `.` and `..`.
fn join_relative(dir: &Path, target: &str) -> PathBuf {
    let mut out = dir.to_path_buf();
    for component in Path::new(target).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<data>{\"a\":1}</data>\n<script>\nimport Nav from './Nav.component';\nlet x = 1;\n</script>\n<style>h1 { color: red; }</style>\n<Nav />\n<h1>Hi</h1>\n";

    #[test]
    fn test_split_sections() {
        let sections = split(Path::new("/src/index.page"), PAGE).unwrap();
        assert_eq!(sections.data.as_deref(), Some("{\"a\":1}"));
        assert!(sections.script.contains("let x = 1;"));
        assert_eq!(sections.style, "h1 { color: red; }");
        assert_eq!(sections.markup, "<Nav />\n<h1>Hi</h1>");
    }

    #[test]
    fn test_markup_only() {
        let sections = split(Path::new("/src/a.page"), "<p>plain</p>").unwrap();
        assert_eq!(sections.data, None);
        assert!(sections.script.is_empty());
        assert!(sections.style.is_empty());
        assert_eq!(sections.markup, "<p>plain</p>");
    }

    #[test]
    fn test_unclosed_and_duplicate_sections() {
        let err = split(Path::new("/src/a.page"), "<p>x</p>\n<style>h1{}").unwrap_err();
        assert_eq!(err.message, "unclosed <style>");
        assert_eq!(err.line, 2);

        let err = split(Path::new("/src/a.page"), "<data>1</data><data>2</data>").unwrap_err();
        assert!(err.message.contains("more than one"));
    }

    #[test]
    fn test_imports_resolved_relative_to_file() {
        let script = "import Nav from './Nav.component';\nimport Shell from \"../layouts/Shell.layout\"\nrun();";
        let (imports, rest) = imports(Path::new("/src/blog/index.page"), script).unwrap();

        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].name, "Nav");
        assert_eq!(imports[0].path, PathBuf::from("/src/blog/Nav.component"));
        assert_eq!(imports[1].path, PathBuf::from("/src/layouts/Shell.layout"));
        assert_eq!(rest, "run();");
    }

    #[test]
    fn test_import_errors() {
        let page = Path::new("/src/index.page");
        assert!(imports(page, "import x from 'lodash';").is_err());
        assert!(imports(page, "import About from './about.page';").is_err());
        assert!(imports(page, "import A from './A.component';\nimport A from './B.component';").is_err());
    }
}
