//! Pages, components and layouts.
//!
//! ```text
//! index.page ──load──▶ Sections ──imports──▶ Nav.component ──load──▶ ...
//!      │                                         │
//!      └──────── markup with <Nav /> inlined ◀───┘
//!                         │
//!            scope hash over all styles
//!                         │
//!        ┌────────────────┼──────────────────┐
//!   scoped CSS     scoped markup        module code
//!                  (ViewModule)      (unscoped, for diffing)
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::Value;

use super::markup::{add_scope_class, inline_components, interpolate};
use super::scope::{scope_class, scope_css, scope_hash};
use super::sections::{imports, split};
use crate::compiler::{CompileError, CompileOutput, CompileUnit, PageModule, Rendered, ServerModule};
use crate::core::FileKind;
use crate::debug;

/// A view file with its imports resolved.
#[derive(Debug, Clone, Default)]
struct LoadedView {
    markup: String,
    /// Raw styles of this file and everything it imports, in import order.
    style: String,
    script: String,
}

/// Per-compile state shared across the import tree.
#[derive(Default)]
struct Loader {
    /// Direct imports per file read.
    imports: FxHashMap<PathBuf, Vec<PathBuf>>,
    /// Files already loaded, for diamonds.
    loaded: FxHashMap<PathBuf, LoadedView>,
    /// Current import chain, for cycle detection.
    stack: Vec<PathBuf>,
}

pub fn compile(unit: &CompileUnit) -> Result<CompileOutput, CompileError> {
    let source = read(&unit.path)?;
    let sections = split(&unit.path, &source)?;

    if sections.data.is_some() && !unit.kind.is_page() {
        return Err(CompileError::new(
            &unit.path,
            "<data> is only allowed in pages",
        ));
    }

    let mut loader = Loader::default();
    loader.stack.push(unit.path.clone());
    let view = loader.resolve(&unit.path, &source, sections.markup, &sections.script, sections.style)?;

    let hash = scope_hash(&view.style);
    let class = scope_class(&hash);
    let style = if view.style.is_empty() {
        String::new()
    } else {
        scope_css(&view.style, &class)
    };
    let template = add_scope_class(&view.markup, &class);

    let class_name = match &unit.route {
        Some(route) => route.class_name(),
        None => fallback_class_name(&unit.path),
    };

    debug!("compile"; "{} -> {} ({} import(s))",
        unit.path.display(), class, loader.imports.len() - 1);

    Ok(CompileOutput {
        module_code: module_code(&view, sections.data.as_deref()),
        hydration_script: hydration_script(&class_name, &view.script),
        module: ServerModule::Page(Arc::new(ViewModule {
            template,
            style: style.clone(),
        })),
        style,
        data_script: sections.data,
        imports: loader.imports,
    })
}

fn read(path: &Path) -> Result<String, CompileError> {
    fs::read_to_string(path)
        .map_err(|e| CompileError::new(path, format!("failed to read source: {e}")))
}

impl Loader {
    /// Resolve the imports of an already split file.
    fn resolve(
        &mut self,
        path: &Path,
        source: &str,
        markup: String,
        script: &str,
        style: String,
    ) -> Result<LoadedView, CompileError> {
        let (found, script) = imports(path, script)?;
        self.imports
            .insert(path.to_path_buf(), found.iter().map(|i| i.path.clone()).collect());

        let mut components = FxHashMap::default();
        let mut styles = vec![style];
        let mut scripts = vec![script];

        for import in &found {
            if self.stack.contains(&import.path) {
                let offset = source.find(import.path.file_name().and_then(|n| n.to_str()).unwrap_or("")).unwrap_or(0);
                return Err(CompileError::new(
                    path,
                    format!("import cycle through {}", import.path.display()),
                )
                .at(source, offset, 0));
            }
            let child = self.load(&import.path)?;
            components.insert(import.name.clone(), child.markup);
            styles.push(child.style);
            scripts.push(child.script);
        }

        let markup = inline_components(path, &markup, &components)?;
        Ok(LoadedView {
            markup,
            style: join_nonempty(&styles),
            script: join_nonempty(&scripts),
        })
    }

    fn load(&mut self, path: &Path) -> Result<LoadedView, CompileError> {
        if let Some(view) = self.loaded.get(path) {
            return Ok(view.clone());
        }

        let source = read(path)?;
        let sections = split(path, &source)?;
        if sections.data.is_some() {
            return Err(CompileError::new(path, "<data> is only allowed in pages"));
        }

        self.stack.push(path.to_path_buf());
        let view = self.resolve(path, &source, sections.markup, &sections.script, sections.style);
        self.stack.pop();

        let view = view?;
        self.loaded.insert(path.to_path_buf(), view.clone());
        Ok(view)
    }
}

fn join_nonempty(parts: &[String]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Emitted server module. Scope classes are left out so a style-only edit
/// leaves it unchanged.
fn module_code(view: &LoadedView, data_script: Option<&str>) -> String {
    let markup = Value::String(view.markup.clone());
    let data = data_script.map_or(Value::Null, |d| Value::String(d.to_string()));
    format!(
        "export const markup = {markup};\nexport const data = {data};\nexport function script() {{\n{}\n}}\n",
        view.script
    )
}

fn hydration_script(class_name: &str, script: &str) -> String {
    format!(
        "class {class_name} {{\n  constructor({{ target, hydrate, props }}) {{\n    this.target = target;\n    this.hydrate = hydrate;\n    const data = props.data;\n{script}\n  }}\n}}"
    )
}

fn fallback_class_name(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("View");
    let kind = FileKind::from_path(path).map_or("View", |k| match k {
        FileKind::Layout => "Layout",
        _ => "Component",
    });
    let mut name: String = stem.chars().filter(char::is_ascii_alphanumeric).collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name.push_str(kind);
    name
}

/// Loaded page: scoped markup template plus scoped style.
struct ViewModule {
    template: String,
    style: String,
}

impl PageModule for ViewModule {
    fn render(&self, data: &Value) -> Rendered {
        Rendered {
            markup: interpolate(&self.template, data),
            style: self.style.clone(),
        }
    }
}
