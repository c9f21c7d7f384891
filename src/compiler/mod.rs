//! Page compilation.
//!
//! # Module Structure
//!
//! ```text
//! compiler/
//! ├── builtin/      # SourceCompiler: the default PageCompiler
//! ├── dependency    # DependencyGraph (file → dependents)
//! ├── error         # CompileError
//! └── worker        # Isolated compile thread emitting sync frames
//! ```
//!
//! A [`PageCompiler`] turns one source file into a [`ServerModule`] plus
//! the artifact text the hot-reload diff compares. Compilers never touch
//! the serving side's state: everything they learn travels back through
//! the sync channel from the worker.

pub mod builtin;
pub mod dependency;
mod error;
pub mod worker;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::core::{FileKind, RequestInfo, RouteId};

pub use dependency::{DependencyGraph, DependencySnapshot};
pub use error::CompileError;
pub use worker::WorkerHandle;

/// One file to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileUnit {
    pub path: PathBuf,
    pub kind: FileKind,
    /// Route the file is served under. `None` for fragments.
    pub route: Option<RouteId>,
    /// Source directory, for relative display paths.
    pub base: PathBuf,
}

/// Everything a successful compile produces.
#[derive(Debug)]
pub struct CompileOutput {
    pub module: ServerModule,
    /// Emitted server module text; the JS side of the reload diff.
    pub module_code: String,
    /// Compiled, scoped CSS; the style side of the reload diff.
    pub style: String,
    pub data_script: Option<String>,
    pub hydration_script: String,
    /// Direct imports of every file read during the compile, keyed by file.
    /// Always carries an entry for the unit itself, possibly empty.
    pub imports: FxHashMap<PathBuf, Vec<PathBuf>>,
}

/// Compiles source files into server modules.
pub trait PageCompiler: Send + Sync {
    fn compile(&self, unit: &CompileUnit) -> Result<CompileOutput, CompileError>;
}

// ============================================================================
// Server modules
// ============================================================================

/// Markup and style of a page rendered against its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub markup: String,
    pub style: String,
}

pub trait PageModule: Send + Sync {
    fn render(&self, data: &Value) -> Rendered;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

/// Plain HTTP handler behind a verb file.
pub trait Endpoint: Send + Sync {
    fn respond(&self, request: &RequestInfo) -> EndpointResponse;
}

/// WebSocket handler behind a `.socket` file.
pub trait SocketEndpoint: Send + Sync {
    /// Text sent once when a client connects.
    fn greeting(&self) -> Option<String>;

    /// Reply to one text frame, if any.
    fn on_message(&self, text: &str) -> Option<String>;
}

/// Loaded form of a compiled route, shared by every request that uses it.
#[derive(Clone)]
pub enum ServerModule {
    Page(Arc<dyn PageModule>),
    Endpoint(Arc<dyn Endpoint>),
    Socket(Arc<dyn SocketEndpoint>),
}

impl ServerModule {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Page(_) => "page",
            Self::Endpoint(_) => "endpoint",
            Self::Socket(_) => "socket",
        }
    }
}

impl fmt::Debug for ServerModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServerModule::{}", self.label())
    }
}
