//! Built-in page compiler.
//!
//! ```text
//! builtin/
//! ├── sections   # <data> / <script> / <style> / markup, import lines
//! ├── scope      # scope hash, selector scoping
//! ├── markup     # component inlining, scope classes, interpolation
//! ├── view       # .page / .component / .layout
//! └── endpoint   # verb files, .socket files
//! ```

mod endpoint;
mod markup;
mod scope;
mod sections;
mod view;

use crate::compiler::{CompileError, CompileOutput, CompileUnit, PageCompiler};
use crate::core::FileKind;

/// Compiles the source formats understood out of the box.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceCompiler;

impl PageCompiler for SourceCompiler {
    fn compile(&self, unit: &CompileUnit) -> Result<CompileOutput, CompileError> {
        match unit.kind {
            FileKind::Page | FileKind::Component | FileKind::Layout => view::compile(unit),
            FileKind::Verb(_) => endpoint::compile_verb(unit),
            FileKind::Socket => endpoint::compile_socket(unit),
        }
    }
}
