//! Route table.
//!
//! One entry per routable source file. Entries are looked up two ways: by
//! URL (through a `matchit` router per method, rebuilt on every mutation)
//! and by source path (for the hot-reload notifier).

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use matchit::Router;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::handler::LazyHandler;
use super::translate::{TranslateError, translate};
use crate::core::{FileKind, RouteId, RouteMethod};
use crate::log;

/// Identity of a route: method plus route id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub method: RouteMethod,
    pub route: RouteId,
}

impl Ord for RouteKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.route
            .cmp(&other.route)
            .then_with(|| self.method.cmp(&other.method))
    }
}

impl PartialOrd for RouteKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A registered route.
#[derive(Debug)]
pub struct RouteEntry {
    pub key: RouteKey,
    pub source: PathBuf,
    pub kind: FileKind,
    pub handler: Arc<LazyHandler>,
}

/// Successful URL lookup.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub entry: Arc<RouteEntry>,
    pub params: Vec<(String, String)>,
}

#[derive(Default)]
struct TableInner {
    entries: FxHashMap<RouteKey, Arc<RouteEntry>>,
    by_source: FxHashMap<PathBuf, RouteKey>,
    routers: FxHashMap<RouteMethod, Router<RouteKey>>,
}

pub struct RouteTable {
    base: PathBuf,
    inner: RwLock<TableInner>,
}

impl RouteTable {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            inner: RwLock::new(TableInner::default()),
        }
    }

    /// Source directory routes are translated against.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Register a routable file with a fresh, uncompiled handler.
    ///
    /// Re-registering the same file replaces its entry. When a different
    /// file already owns the route, the newer registration wins.
    pub fn register(&self, path: &Path) -> Result<RouteKey, TranslateError> {
        let spec = translate(&self.base, path)?;
        let key = RouteKey {
            method: spec.method,
            route: spec.route.clone(),
        };
        let entry = Arc::new(RouteEntry {
            key: key.clone(),
            source: path.to_path_buf(),
            kind: spec.kind,
            handler: Arc::new(LazyHandler::new(path, spec.kind, spec.route)),
        });

        let mut guard = self.inner.write();
        let inner = &mut *guard;

        if let Some(old_key) = inner.by_source.remove(path) {
            inner.entries.remove(&old_key);
        }
        if let Some(existing) = inner.entries.get(&key) {
            log!("warning"; "{} {} from {} replaces {}",
                key.method, key.route, path.display(), existing.source.display());
            inner.by_source.remove(&existing.source);
        }

        inner.entries.insert(key.clone(), entry);
        inner.by_source.insert(path.to_path_buf(), key.clone());
        inner.rebuild();

        Ok(key)
    }

    /// Remove the entry owned by `path`, if any.
    pub fn unregister(&self, path: &Path) -> Option<RouteKey> {
        let mut inner = self.inner.write();
        let key = inner.by_source.remove(path)?;
        inner.entries.remove(&key);
        inner.rebuild();
        Some(key)
    }

    /// Match a request path against the routes of one method.
    pub fn lookup(&self, method: RouteMethod, path: &str) -> Option<RouteMatch> {
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        let inner = self.inner.read();
        let matched = inner.routers.get(&method)?.at(path).ok()?;
        let entry = Arc::clone(inner.entries.get(matched.value)?);
        let params = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Some(RouteMatch { entry, params })
    }

    pub fn entry_for_source(&self, path: &Path) -> Option<Arc<RouteEntry>> {
        let inner = self.inner.read();
        let key = inner.by_source.get(path)?;
        inner.entries.get(key).cloned()
    }

    /// All entries, ordered by route then method.
    pub fn entries(&self) -> Vec<Arc<RouteEntry>> {
        let mut entries: Vec<_> = self.inner.read().entries.values().cloned().collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TableInner {
    fn rebuild(&mut self) {
        let mut keys: Vec<_> = self.entries.keys().cloned().collect();
        keys.sort();

        let mut routers: FxHashMap<RouteMethod, Router<RouteKey>> = FxHashMap::default();
        for key in keys {
            let router = routers.entry(key.method).or_insert_with(Router::new);
            if let Err(err) = router.insert(key.route.to_pattern(), key.clone()) {
                log!("warning"; "{} {} is unreachable: {}", key.method, key.route, err);
            }
        }
        self.routers = routers;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HttpMethod;
    use crate::route::HandlerState;

    const GET: RouteMethod = RouteMethod::Http(HttpMethod::Get);

    fn table() -> RouteTable {
        RouteTable::new("/src")
    }

    fn src(rel: &str) -> PathBuf {
        Path::new("/src").join(rel)
    }

    #[test]
    fn test_register_and_lookup() {
        let table = table();
        table.register(&src("index.page")).unwrap();
        table.register(&src("users_[id].get")).unwrap();
        table.register(&src("chat.socket")).unwrap();

        let root = table.lookup(GET, "/").unwrap();
        assert_eq!(root.entry.source, src("index.page"));
        assert!(root.params.is_empty());

        let user = table.lookup(GET, "/users/42").unwrap();
        assert_eq!(user.entry.kind, FileKind::Verb(HttpMethod::Get));
        assert_eq!(user.params, vec![("id".to_string(), "42".to_string())]);

        assert!(table.lookup(RouteMethod::Socket, "/chat").is_some());
        assert!(table.lookup(GET, "/chat").is_none());
        assert!(table.lookup(RouteMethod::Http(HttpMethod::Post), "/").is_none());
    }

    #[test]
    fn test_trailing_slash_matches() {
        let table = table();
        table.register(&src("blog/index.page")).unwrap();
        assert!(table.lookup(GET, "/blog/").is_some());
        assert!(table.lookup(GET, "/blog").is_some());
    }

    #[test]
    fn test_static_segment_beats_param() {
        let table = table();
        table.register(&src("users_[id].page")).unwrap();
        table.register(&src("users_new.page")).unwrap();

        assert_eq!(table.lookup(GET, "/users/new").unwrap().entry.source, src("users_new.page"));
        assert_eq!(table.lookup(GET, "/users/3").unwrap().entry.source, src("users_[id].page"));
    }

    #[test]
    fn test_reregistration_is_idempotent_and_resets_handler() {
        let table = table();
        let path = src("about.page");

        let first = table.register(&path).unwrap();
        let before = table.entry_for_source(&path).unwrap();
        before.handler.set_state_for_test(HandlerState::Failed(
            crate::route::HandlerError::internal("x"),
        ));

        let second = table.register(&path).unwrap();
        assert_eq!(first, second);
        assert_eq!(table.len(), 1);

        let after = table.entry_for_source(&path).unwrap();
        assert!(!Arc::ptr_eq(&before.handler, &after.handler));
        assert_eq!(after.handler.state_label(), "uninitialized");
    }

    #[test]
    fn test_collision_last_wins() {
        let table = table();
        table.register(&src("blog.page")).unwrap();
        table.register(&src("blog/index.page")).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup(GET, "/blog").unwrap().entry.source, src("blog/index.page"));
        assert!(table.entry_for_source(&src("blog.page")).is_none());

        // Removing the displaced file must not remove the winner.
        assert_eq!(table.unregister(&src("blog.page")), None);
        assert!(table.lookup(GET, "/blog").is_some());
    }

    #[test]
    fn test_unregister() {
        let table = table();
        let path = src("about.page");
        table.register(&path).unwrap();

        let key = table.unregister(&path).unwrap();
        assert_eq!(key.route.as_str(), "/about");
        assert!(table.lookup(GET, "/about").is_none());
        assert!(table.is_empty());
        assert_eq!(table.unregister(&path), None);
    }

    #[test]
    fn test_fragments_rejected() {
        let table = table();
        assert!(table.register(&src("Nav.component")).is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn test_entries_sorted() {
        let table = table();
        table.register(&src("z.page")).unwrap();
        table.register(&src("index.post")).unwrap();
        table.register(&src("index.page")).unwrap();

        let routes: Vec<_> = table
            .entries()
            .iter()
            .map(|e| format!("{} {}", e.key.method, e.key.route))
            .collect();
        assert_eq!(routes, vec!["get /", "post /", "get /z"]);
    }
}
