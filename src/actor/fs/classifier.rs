//! notify events to file changes.
//!
//! Events are mapped one to one, in the order notify reports them. There
//! is no debouncing: every change reaches the notifier.

use std::path::PathBuf;

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};

use super::filter::WatchFilter;
use crate::core::{ChangeKind, FileChange};
use crate::debug;
use crate::utils::path::normalize_path;

/// Changes carried by one notify event that pass `filter`.
pub(super) fn classify(event: &Event, filter: &WatchFilter) -> Vec<FileChange> {
    let mut changes = Vec::new();

    match event.kind {
        EventKind::Create(kind) => {
            let dir = matches!(kind, CreateKind::Folder);
            push_all(&mut changes, &event.paths, ChangeKind::Created, dir);
        }
        EventKind::Remove(kind) => {
            let dir = matches!(kind, RemoveKind::Folder);
            push_all(&mut changes, &event.paths, ChangeKind::Removed, dir);
        }
        // mtime/atime/chmod noise
        EventKind::Modify(ModifyKind::Metadata(_)) => {}
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            push_all(&mut changes, &event.paths, ChangeKind::Removed, false);
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            push_all(&mut changes, &event.paths, ChangeKind::Created, false);
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() == 2 => {
            push_all(&mut changes, &event.paths[..1], ChangeKind::Removed, false);
            push_all(&mut changes, &event.paths[1..], ChangeKind::Created, false);
        }
        EventKind::Modify(_) => {
            push_all(&mut changes, &event.paths, ChangeKind::Modified, false);
        }
        _ => return changes,
    }

    changes.retain_mut(|change| {
        correct_by_existence(change) && filter.accepts(&change.path, change.is_dir)
    });
    changes
}

fn push_all(changes: &mut Vec<FileChange>, paths: &[PathBuf], kind: ChangeKind, dir: bool) {
    for path in paths {
        let path = normalize_path(path);
        let is_dir = dir || path.is_dir();
        changes.push(FileChange { path, kind, is_dir });
    }
}

/// Reconcile the reported kind with what is on disk. `false` drops the change.
///
/// Editors that save by rename report stale kinds: a creation for a file
/// already gone, or a removal for a file that is back.
fn correct_by_existence(change: &mut FileChange) -> bool {
    let exists = change.path.exists();
    match change.kind {
        ChangeKind::Created if !exists => {
            debug!("watch"; "discard created (gone): {}", change.path.display());
            false
        }
        ChangeKind::Modified if !exists => {
            change.kind = ChangeKind::Removed;
            true
        }
        ChangeKind::Removed if exists => {
            change.kind = ChangeKind::Modified;
            true
        }
        _ => true,
    }
}
