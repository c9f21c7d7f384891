//! Initial discovery of the source tree.

use std::path::PathBuf;

use jwalk::WalkDir;

use super::filter::WatchFilter;
use crate::context::ServerContext;
use crate::core::FileKind;
use crate::{debug, log};

/// Every watched file under the filter's base, sorted.
pub fn scan(filter: &WatchFilter) -> Vec<PathBuf> {
    let mut files: Vec<_> = WalkDir::new(filter.base())
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|p| filter.accepts(p, false))
        .collect();
    files.sort();
    files
}

/// Register a route for every routable file and mark the context initialised.
pub fn discover(ctx: &ServerContext, filter: &WatchFilter) -> usize {
    let mut registered = 0;

    for path in scan(filter) {
        if !FileKind::from_path(&path).is_some_and(FileKind::is_routable) {
            continue;
        }
        match ctx.routes.register(&path) {
            Ok(key) => {
                debug!("watch"; "{} {} <- {}", key.method, key.route, path.display());
                registered += 1;
            }
            Err(err) => log!("watch"; "{}", err),
        }
    }

    ctx.mark_initialised();
    registered
}
