//! `kettle routes`: print the route table derived from the source tree.

use anyhow::{Result, bail};
use owo_colors::OwoColorize;

use crate::actor::fs::{WatchFilter, scan};
use crate::config::AppConfig;
use crate::core::FileKind;
use crate::log;
use crate::route::RouteTable;
use crate::utils::path::{display_relative, normalize_path};

pub fn list_routes(config: &AppConfig) -> Result<()> {
    let base = normalize_path(&config.source_dir());
    if !base.is_dir() {
        bail!("source directory {} does not exist", base.display());
    }

    let table = build_table(&WatchFilter::new(&base, &config.watch));
    if table.is_empty() {
        log!("routes"; "no routable files under {}", base.display());
        return Ok(());
    }

    for (method, route, source) in rows(&table) {
        println!("{}  {}  {}", format!("{method:<7}").cyan(), route, source.dimmed());
    }
    log!("routes"; "{} route(s)", table.len());
    Ok(())
}

fn build_table(filter: &WatchFilter) -> RouteTable {
    let table = RouteTable::new(filter.base());
    for path in scan(filter) {
        if !FileKind::from_path(&path).is_some_and(FileKind::is_routable) {
            continue;
        }
        if let Err(err) = table.register(&path) {
            log!("routes"; "{}", err);
        }
    }
    table
}

/// `(method, route, source)` per entry, ordered by route.
fn rows(table: &RouteTable) -> Vec<(String, String, String)> {
    table
        .entries()
        .iter()
        .map(|entry| {
            (
                entry.key.method.to_string(),
                entry.key.route.to_string(),
                display_relative(&entry.source, table.base()),
            )
        })
        .collect()
}
