//! Configuration section definitions, one file per `[section]`.

mod dev;
mod project;
mod sandbox;
mod serve;
mod watch;

pub use dev::DevConfig;
pub use project::ProjectConfig;
pub use sandbox::SandboxConfig;
pub use serve::ServeConfig;
pub use watch::WatchConfig;
