//! Server context: everything the serving side shares.
//!
//! One `ServerContext` is built per server and handed (as `Arc`) to the
//! request pool, the hot-reload actors and every handler transition. There
//! is no other shared mutable state apart from the shutdown flag.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use parking_lot::RwLock;

use crate::compiler::builtin::SourceCompiler;
use crate::compiler::{CompileError, CompileUnit, DependencyGraph, PageCompiler, ServerModule, WorkerHandle};
use crate::config::AppConfig;
use crate::core::{FileKind, RouteId, RunMode};
use crate::render::{DevEndpoints, DocumentRenderer, PageDocument};
use crate::route::RouteTable;
use crate::sandbox::{DataRuntime, JsonRuntime, MemoryStore, Sandbox, Store};
use crate::sync::{self, FlushReport, RouteCache, SyncInbox};
use crate::utils::path::normalize_path;
use crate::{debug, log};

/// Pluggable collaborators of the engine.
pub struct Collaborators {
    pub compiler: Arc<dyn PageCompiler>,
    pub renderer: Arc<dyn DocumentRenderer>,
    pub runtime: Arc<dyn DataRuntime>,
    pub store: Arc<dyn Store>,
}

impl Collaborators {
    /// Built-in implementations, with the store seeded from config.
    pub fn builtin(config: &AppConfig) -> Result<Self> {
        let store = match config.store_seed() {
            Some(seed) if seed.is_file() => {
                let store = MemoryStore::seeded(&seed)?;
                debug!("store"; "{} key(s) from {}", store.len(), seed.display());
                store
            }
            Some(seed) => {
                log!("warning"; "store seed {} not found, starting empty", seed.display());
                MemoryStore::new()
            }
            None => MemoryStore::new(),
        };

        Ok(Self {
            compiler: Arc::new(SourceCompiler),
            renderer: Arc::new(PageDocument),
            runtime: Arc::new(JsonRuntime),
            store: Arc::new(store),
        })
    }
}

pub struct ServerContext {
    pub config: Arc<AppConfig>,
    pub mode: RunMode,
    /// Normalized source directory.
    pub base: PathBuf,
    pub routes: RouteTable,
    pub cache: RouteCache,
    /// Serving-side copy of the dependency graph, replaced by sync frames.
    pub graph: RwLock<DependencyGraph>,
    pub sandbox: Sandbox,
    pub renderer: Arc<dyn DocumentRenderer>,
    inbox: SyncInbox,
    worker: WorkerHandle,
    /// Initial discovery finished; change events count from here on.
    initialised: AtomicBool,
}

impl ServerContext {
    /// Build the context and start the compile worker.
    pub fn new(config: Arc<AppConfig>, collaborators: Collaborators) -> Result<Arc<Self>> {
        let mode = config.run_mode();
        let base = normalize_path(&config.source_dir());

        let (frames, inbox) = sync::channel();
        let worker = WorkerHandle::spawn(collaborators.compiler, frames)
            .context("failed to start compile worker")?;

        let sandbox = Sandbox::new(
            collaborators.runtime,
            collaborators.store,
            mode,
            &config.sandbox,
        );

        Ok(Arc::new(Self {
            mode,
            routes: RouteTable::new(base.clone()),
            base,
            cache: RouteCache::new(mode),
            graph: RwLock::new(DependencyGraph::new()),
            sandbox,
            renderer: collaborators.renderer,
            inbox,
            worker,
            initialised: AtomicBool::new(false),
            config,
        }))
    }

    /// Compile one routable file through the worker, then apply its frames.
    pub fn compile(
        &self,
        path: &Path,
        kind: FileKind,
        route: &RouteId,
    ) -> Result<ServerModule, CompileError> {
        let unit = CompileUnit {
            path: path.to_path_buf(),
            kind,
            route: Some(route.clone()),
            base: self.base.clone(),
        };
        let result = self.worker.compile(unit);
        self.flush_sync();
        result
    }

    /// Apply pending sync frames, logging anything that went wrong.
    pub fn flush_sync(&self) -> FlushReport {
        let report = self.inbox.flush(&self.cache, &self.graph);
        for err in &report.errors {
            log!("sync"; "{}", err);
        }
        if report.applied > 0 {
            debug!("sync"; "applied {} frame(s), {} route(s) cached, {} file(s) tracked",
                report.applied, self.cache.len(), self.graph.read().len());
        }
        report
    }

    pub fn mark_initialised(&self) {
        self.initialised.store(true, Ordering::Release);
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised.load(Ordering::Acquire)
    }

    /// Dev socket path, in development only.
    pub fn dev_socket(&self) -> Option<&str> {
        self.mode
            .is_development()
            .then_some(self.config.dev.socket_path.as_str())
    }

    /// Endpoints the injected browser client uses, in development only.
    pub fn dev_endpoints(&self) -> Option<DevEndpoints<'_>> {
        self.dev_socket().map(|socket_path| DevEndpoints {
            socket_path,
            ping_path: &self.config.dev.ping_path,
        })
    }
}
