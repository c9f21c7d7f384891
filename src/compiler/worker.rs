//! Isolated compile worker.
//!
//! A single thread owns the page compiler and the authoritative dependency
//! graph. Requests arrive over a channel and are compiled one at a time, in
//! arrival order. For each success the worker emits, in this order:
//!
//! 1. a `dependency_map` frame with the whole updated graph,
//! 2. a `route` frame for page units,
//! 3. the reply carrying the loaded [`ServerModule`].
//!
//! Because frames are queued before the reply, a caller that flushes the
//! sync inbox after `compile()` returns always sees its own update. A failed
//! compile emits no frames.

use std::path::Path;
use std::sync::Arc;
use std::thread;

use crossbeam::channel::{self, Receiver, Sender};

use super::{CompileError, CompileUnit, DependencyGraph, PageCompiler, ServerModule};
use crate::debug;
use crate::sync::{RouteContents, SyncMessage, SyncSender};
use crate::utils::path::display_relative;

type Reply = Result<ServerModule, CompileError>;

struct CompileJob {
    unit: CompileUnit,
    reply: Sender<Reply>,
}

/// Client side of the compile worker. Cheap to clone.
#[derive(Clone)]
pub struct WorkerHandle {
    jobs: Sender<CompileJob>,
}

impl WorkerHandle {
    /// Start the worker thread. It runs until every handle is dropped.
    pub fn spawn(compiler: Arc<dyn PageCompiler>, frames: SyncSender) -> std::io::Result<Self> {
        let (jobs, queue) = channel::unbounded();
        thread::Builder::new()
            .name("kettle-compile".into())
            .spawn(move || run(compiler.as_ref(), &queue, &frames))?;
        Ok(Self { jobs })
    }

    /// Compile one unit and wait for the result.
    pub fn compile(&self, unit: CompileUnit) -> Reply {
        let (reply, rx) = channel::bounded(1);
        let path = unit.path.clone();

        self.jobs
            .send(CompileJob { unit, reply })
            .map_err(|_| stopped(&path))?;

        rx.recv().unwrap_or_else(|_| Err(stopped(&path)))
    }
}

fn stopped(path: &Path) -> CompileError {
    CompileError::new(path, "compile worker has stopped")
}

// =============================================================================
// Worker loop
// =============================================================================

fn run(compiler: &dyn PageCompiler, queue: &Receiver<CompileJob>, frames: &SyncSender) {
    let mut graph = DependencyGraph::new();

    for job in queue {
        let result = compile_one(compiler, &mut graph, &job.unit, frames);
        // Requester may have given up; nothing to do.
        let _ = job.reply.send(result);
    }

    debug!("compile"; "worker stopped");
}

fn compile_one(
    compiler: &dyn PageCompiler,
    graph: &mut DependencyGraph,
    unit: &CompileUnit,
    frames: &SyncSender,
) -> Reply {
    let output = compiler.compile(unit)?;

    for (file, imports) in &output.imports {
        graph.record(file, imports);
    }
    emit(
        frames,
        &SyncMessage::DependencyMap {
            dependency_map: graph.snapshot(),
        },
    );

    if unit.kind.is_page()
        && let Some(route) = &unit.route
    {
        let dependencies = output
            .imports
            .get(&unit.path)
            .cloned()
            .unwrap_or_default();

        emit(
            frames,
            &SyncMessage::Route {
                route: route.clone(),
                contents: RouteContents {
                    source_relative_path: display_relative(&unit.path, &unit.base),
                    data_script: output.data_script,
                    hydration_script: output.hydration_script,
                    module_code: output.module_code,
                    style: output.style,
                    dependencies,
                },
            },
        );
    }

    Ok(output.module)
}

fn emit(frames: &SyncSender, message: &SyncMessage) {
    if let Err(err) = frames.send(message) {
        debug!("compile"; "dropping sync frame: {}", err);
    }
}
