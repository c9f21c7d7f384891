use std::path::PathBuf;

use notify::event::{CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use tempfile::TempDir;

use super::classifier::classify;
use super::filter::WatchFilter;
use super::scan::{discover, scan};
use crate::config::WatchConfig;
use crate::context::testing::{CountingCompiler, test_context};
use crate::core::{ChangeKind, FileChange};
use crate::utils::path::normalize_path;

fn project(files: &[&str]) -> (TempDir, PathBuf, WatchFilter) {
    let temp = TempDir::new().unwrap();
    let base = normalize_path(temp.path());
    for rel in files {
        let path = base.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }
    let filter = WatchFilter::new(&base, &WatchConfig::default());
    (temp, base, filter)
}

fn event(kind: EventKind, paths: &[&PathBuf]) -> Event {
    Event {
        kind,
        paths: paths.iter().map(|p| (*p).clone()).collect(),
        attrs: Default::default(),
    }
}

#[test]
fn test_filter_rules() {
    let (_temp, base, filter) = project(&[]);

    assert!(filter.accepts(&base.join("index.page"), false));
    assert!(filter.accepts(&base.join("blog/Nav.component"), false));
    assert!(filter.accepts(&base.join("blog"), true));

    assert!(!filter.accepts(&base.join(".db/store.json"), false));
    assert!(!filter.accepts(&base.join(".hidden.page"), false));
    assert!(!filter.accepts(&base.join("node_modules/x/index.page"), false));
    assert!(!filter.accepts(&base.join("README.md"), false));
    assert!(!filter.accepts(&base.join("index.page~"), false));
    assert!(!filter.accepts(&PathBuf::from("/elsewhere/index.page"), false));
}

#[test]
fn test_classify_kinds() {
    let (_temp, base, filter) = project(&["index.page", "Nav.component"]);
    let page = base.join("index.page");
    let nav = base.join("Nav.component");
    let gone = base.join("gone.page");

    let created = classify(&event(EventKind::Create(CreateKind::File), &[&page]), &filter);
    assert_eq!(created, vec![FileChange::file(&page, ChangeKind::Created)]);

    let modified = classify(
        &event(EventKind::Modify(ModifyKind::Data(DataChange::Any)), &[&nav]),
        &filter,
    );
    assert_eq!(modified, vec![FileChange::file(&nav, ChangeKind::Modified)]);

    let removed = classify(&event(EventKind::Remove(RemoveKind::File), &[&gone]), &filter);
    assert_eq!(removed, vec![FileChange::file(&gone, ChangeKind::Removed)]);

    let metadata = classify(
        &event(EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any)), &[&page]),
        &filter,
    );
    assert!(metadata.is_empty());
}

#[test]
fn test_classify_corrects_stale_kinds() {
    let (_temp, base, filter) = project(&["index.page"]);
    let page = base.join("index.page");
    let gone = base.join("gone.page");

    // created then deleted before the event was read
    let created = classify(&event(EventKind::Create(CreateKind::File), &[&gone]), &filter);
    assert!(created.is_empty());

    // modified but no longer there
    let modified = classify(
        &event(EventKind::Modify(ModifyKind::Data(DataChange::Any)), &[&gone]),
        &filter,
    );
    assert_eq!(modified[0].kind, ChangeKind::Removed);

    // atomic save: removed then recreated
    let removed = classify(&event(EventKind::Remove(RemoveKind::File), &[&page]), &filter);
    assert_eq!(removed[0].kind, ChangeKind::Modified);
}

#[test]
fn test_classify_rename_both() {
    let (_temp, base, filter) = project(&["new.page"]);
    let old = base.join("old.page");
    let new = base.join("new.page");

    let changes = classify(
        &event(EventKind::Modify(ModifyKind::Name(RenameMode::Both)), &[&old, &new]),
        &filter,
    );
    assert_eq!(
        changes,
        vec![
            FileChange::file(&old, ChangeKind::Removed),
            FileChange::file(&new, ChangeKind::Created),
        ]
    );
}

#[test]
fn test_scan_skips_ignored() {
    let (_temp, base, filter) = project(&[
        "index.page",
        "users_[id].get",
        "Nav.component",
        ".db/store.json",
        "node_modules/pkg/index.page",
        "notes.txt",
    ]);

    let files = scan(&filter);
    assert_eq!(
        files,
        vec![
            base.join("Nav.component"),
            base.join("index.page"),
            base.join("users_[id].get"),
        ]
    );
}

#[test]
fn test_discover_registers_routable_files() {
    let compiles = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let (ctx, _temp) = test_context(CountingCompiler::new(compiles), &[]);
    for rel in ["index.page", "chat.socket", "Nav.component"] {
        std::fs::write(ctx.base.join(rel), "").unwrap();
    }

    let filter = WatchFilter::new(&ctx.base, &WatchConfig::default());
    assert_eq!(discover(&ctx, &filter), 2);
    assert_eq!(ctx.routes.len(), 2);
    assert!(ctx.is_initialised());
}
