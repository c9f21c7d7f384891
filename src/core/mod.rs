//! Core types - pure abstractions shared across the codebase.

mod change;
mod kind;
mod method;
mod mode;
mod request;
mod route;
mod state;

pub use change::{ChangeKind, FileChange};
pub use kind::{FileKind, is_page_file};
pub use method::{HttpMethod, RouteMethod};
pub use mode::RunMode;
pub use request::RequestInfo;
pub use route::RouteId;
pub use state::{is_shutdown, register_server, setup_shutdown_handler};
