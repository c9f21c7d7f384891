use std::path::{Component, Path, PathBuf};

use crate::config::WatchConfig;
use crate::core::FileKind;

/// Decides which paths under the source directory are watched.
///
/// - dot-prefixed files and directories are skipped
/// - names listed in `[watch] ignore` are skipped anywhere in the tree
/// - editor temp files are skipped
/// - files must have a known kind
#[derive(Debug, Clone)]
pub struct WatchFilter {
    base: PathBuf,
    ignore: Vec<String>,
}

impl WatchFilter {
    pub fn new(base: impl Into<PathBuf>, config: &WatchConfig) -> Self {
        Self {
            base: base.into(),
            ignore: config.ignore.clone(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Whether a change to `path` is forwarded. Directories skip the kind check.
    pub fn accepts(&self, path: &Path, is_dir: bool) -> bool {
        let Ok(relative) = path.strip_prefix(&self.base) else {
            return false;
        };

        let skipped = relative.components().any(|c| match c {
            Component::Normal(name) => {
                let name = name.to_string_lossy();
                name.starts_with('.') || self.ignore.iter().any(|i| *i == name)
            }
            _ => false,
        });
        if skipped {
            return false;
        }

        is_dir || (!is_temp_file(path) && FileKind::from_path(path).is_some())
    }
}

/// Editor artifacts.
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp") || name.ends_with('~')
}
