//! Hot-reload notifier.
//!
//! Turns one file-change event into reload requests, then turns each
//! request into at most one message for the dev socket.
//!
//! ```text
//! FileChange ──on_change──▶ Exit | Ignored | Notified([ReloadRequest])
//!                                                    │
//!                                              apply_reload
//!                                                    │
//!                                         Delivery { route, css | reload }
//! ```
//!
//! Non-page files never reload anything themselves: the dependency graph
//! is walked up to the pages that import them.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use super::diff::{DiffOutcome, decide};
use super::message::HotReloadMessage;
use crate::compiler::DependencyGraph;
use crate::context::ServerContext;
use crate::core::{ChangeKind, FileChange, FileKind, RouteId, is_page_file};
use crate::route::Trigger;
use crate::utils::path::display_relative;
use crate::{debug, log};

/// A page to reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadRequest {
    pub path: PathBuf,
    /// Reached through the dependency graph rather than changed itself.
    pub due_to_dependency_change: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Initial discovery is still running.
    Ignored,
    /// Production: the process must exit with status 1.
    Exit,
    Notified(Vec<ReloadRequest>),
}

/// Message for the clients viewing `route`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub route: RouteId,
    pub message: HotReloadMessage,
}

/// Route one change event.
pub fn on_change(ctx: &ServerContext, change: &FileChange) -> ChangeOutcome {
    if !ctx.is_initialised() {
        return ChangeOutcome::Ignored;
    }
    if !ctx.mode.is_development() {
        return ChangeOutcome::Exit;
    }

    let path = change.path.as_path();
    let kind = (!change.is_dir)
        .then(|| FileKind::from_path(path))
        .flatten();

    let requests = match (kind, change.kind) {
        (Some(kind), ChangeKind::Created) if kind.is_routable() => {
            if let Err(err) = ctx.routes.register(path) {
                log!("watch"; "{}", err);
            }
            walk(ctx, path)
        }
        (Some(kind), ChangeKind::Removed) if kind.is_routable() => {
            ctx.routes.unregister(path);
            walk(ctx, path)
        }
        (Some(FileKind::Page), ChangeKind::Modified) => vec![ReloadRequest {
            path: path.to_path_buf(),
            due_to_dependency_change: false,
        }],
        (Some(kind), ChangeKind::Modified) if kind.is_routable() => {
            if let Some(entry) = ctx.routes.entry_for_source(path) {
                let _ = entry.handler.advance(ctx, Trigger::Invalidate);
            }
            walk(ctx, path)
        }
        _ => walk(ctx, path),
    };

    ChangeOutcome::Notified(requests)
}

/// Pages depending on `path`, directly or through other files.
pub fn walk(ctx: &ServerContext, path: &Path) -> Vec<ReloadRequest> {
    ctx.flush_sync();

    let graph = ctx.graph.read();
    let mut visited = FxHashSet::default();
    visited.insert(path.to_path_buf());

    let mut requests = Vec::new();
    visit(&graph, path, &mut visited, &mut requests);
    requests
}

fn visit(
    graph: &DependencyGraph,
    file: &Path,
    visited: &mut FxHashSet<PathBuf>,
    requests: &mut Vec<ReloadRequest>,
) {
    let Some(dependents) = graph.dependents(file) else {
        return;
    };
    let mut dependents: Vec<_> = dependents.iter().collect();
    dependents.sort();

    for dependent in dependents {
        if !visited.insert(dependent.clone()) {
            continue;
        }
        if is_page_file(dependent) {
            requests.push(ReloadRequest {
                path: dependent.clone(),
                due_to_dependency_change: true,
            });
        } else {
            visit(graph, dependent, visited, requests);
        }
    }
}

/// Recompile one page and decide what its clients receive.
pub fn apply_reload(ctx: &ServerContext, request: &ReloadRequest) -> Option<Delivery> {
    let Some(entry) = ctx.routes.entry_for_source(&request.path) else {
        debug!("reload"; "no route for {}, skipping", request.path.display());
        return None;
    };
    let handler = &entry.handler;
    let route = entry.key.route.clone();

    if !handler.is_listening() {
        let was = handler.state_label();
        let _ = handler.advance(ctx, Trigger::Invalidate);
        debug!("reload"; "{} has no listener, invalidated ({})", route, was);
        return None;
    }

    if request.due_to_dependency_change {
        handler.force_next_reload();
    }

    if handler.advance(ctx, Trigger::Change).is_err() {
        handler.take_forced();
        crate::logger::status_error(
            &format!("failed {}", display_relative(&request.path, &ctx.base)),
            "",
        );
        return Some(Delivery {
            route,
            message: HotReloadMessage::Reload,
        });
    }

    ctx.flush_sync();
    let forced = handler.take_forced();
    let Some(versions) = ctx.cache.versions(&route) else {
        return Some(Delivery {
            route,
            message: HotReloadMessage::Reload,
        });
    };

    let message = match decide(&versions, forced) {
        DiffOutcome::Unchanged => {
            debug!("reload"; "{} unchanged", route);
            return None;
        }
        DiffOutcome::StylePatch(code) => {
            ctx.cache.replace_style(&route, code.clone());
            HotReloadMessage::Css { code }
        }
        DiffOutcome::Reload => HotReloadMessage::Reload,
    };

    crate::logger::status_success(&format!("{} {}", message.label(), route));
    Some(Delivery { route, message })
}
