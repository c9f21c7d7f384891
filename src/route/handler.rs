//! Lazily compiled route handler.
//!
//! ```text
//!                 Request / Change
//!  Uninitialized ─────────────────▶ Compiled(module)
//!        ▲   ╲                        │   ▲
//!        │    ╲ compile fails         │   │ Change (recompile)
//!        │     ▼                      │   │
//!        │    Failed(error) ◀─────────┘───┘
//!        │         │ Request (retry)
//!        └─────────┴── Invalidate
//! ```
//!
//! The state lives behind a mutex that is held across compilation, so at
//! most one compile per handler is ever in flight. Callers arriving while
//! a compile runs wait for it and then reuse its result.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::error::HandlerError;
use crate::compiler::ServerModule;
use crate::context::ServerContext;
use crate::core::{FileKind, RouteId};
use crate::log;

#[derive(Debug, Clone)]
pub enum HandlerState {
    Uninitialized,
    Compiled(ServerModule),
    Failed(HandlerError),
}

impl HandlerState {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Compiled(_) => "compiled",
            Self::Failed(_) => "failed",
        }
    }
}

/// What drives a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Incoming request: reuse a compiled module, compile otherwise.
    Request,
    /// Source or dependency changed with a listener attached: recompile now.
    Change,
    /// Source changed with nobody listening: drop the module.
    Invalidate,
}

#[derive(Debug)]
pub struct LazyHandler {
    source: PathBuf,
    kind: FileKind,
    route: RouteId,
    state: Mutex<HandlerState>,
    /// A development client has requested this route.
    listening: AtomicBool,
    /// Next diff must reload regardless of what changed.
    force_reload: AtomicBool,
}

impl LazyHandler {
    pub fn new(source: &Path, kind: FileKind, route: RouteId) -> Self {
        Self {
            source: source.to_path_buf(),
            kind,
            route,
            state: Mutex::new(HandlerState::Uninitialized),
            listening: AtomicBool::new(false),
            force_reload: AtomicBool::new(false),
        }
    }

    /// Run one transition. Returns the module for `Request` and `Change`.
    pub fn advance(
        &self,
        ctx: &ServerContext,
        trigger: Trigger,
    ) -> Result<Option<ServerModule>, HandlerError> {
        let mut state = self.state.lock();

        match trigger {
            Trigger::Invalidate => {
                *state = HandlerState::Uninitialized;
                Ok(None)
            }
            Trigger::Request => {
                if ctx.mode.is_development() {
                    self.listening.store(true, Ordering::Release);
                }
                if let HandlerState::Compiled(module) = &*state {
                    return Ok(Some(module.clone()));
                }
                self.compile_into(&mut state, ctx).map(Some)
            }
            Trigger::Change => self.compile_into(&mut state, ctx).map(Some),
        }
    }

    fn compile_into(
        &self,
        state: &mut HandlerState,
        ctx: &ServerContext,
    ) -> Result<ServerModule, HandlerError> {
        match ctx.compile(&self.source, self.kind, &self.route) {
            Ok(module) => {
                *state = HandlerState::Compiled(module.clone());
                Ok(module)
            }
            Err(err) => {
                log!("error"; "{}", err);
                let err = HandlerError::from(err);
                *state = HandlerState::Failed(err.clone());
                Err(err)
            }
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Acquire)
    }

    /// Require the next diff for this route to reload.
    pub fn force_next_reload(&self) {
        self.force_reload.store(true, Ordering::Release);
    }

    /// Read and clear the forced-reload flag.
    pub fn take_forced(&self) -> bool {
        self.force_reload.swap(false, Ordering::AcqRel)
    }

    pub fn state_label(&self) -> &'static str {
        self.state.lock().label()
    }

    #[cfg(test)]
    pub fn set_state_for_test(&self, state: HandlerState) {
        *self.state.lock() = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::{CountingCompiler, test_context};
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_compile_once_under_concurrent_requests() {
        let compiles = Arc::new(AtomicUsize::new(0));
        let (ctx, _temp) = test_context(CountingCompiler::new(compiles.clone()), &["index.page"]);
        let entry = ctx.routes.entry_for_source(&ctx.base.join("index.page")).unwrap();

        std::thread::scope(|scope| {
            for _ in 0..16 {
                scope.spawn(|| {
                    let module = entry.handler.advance(&ctx, Trigger::Request).unwrap();
                    assert!(matches!(module, Some(ServerModule::Page(_))));
                });
            }
        });

        assert_eq!(compiles.load(Ordering::SeqCst), 1);
        assert_eq!(entry.handler.state_label(), "compiled");
        assert!(entry.handler.is_listening());
    }

    #[test]
    fn test_failure_then_retry() {
        let compiles = Arc::new(AtomicUsize::new(0));
        let compiler = CountingCompiler::new(compiles.clone());
        let failing = compiler.failing_switch();
        let (ctx, _temp) = test_context(compiler, &["index.page"]);
        let handler = &ctx.routes.entry_for_source(&ctx.base.join("index.page")).unwrap().handler;

        failing.store(true, Ordering::SeqCst);
        let err = handler.advance(&ctx, Trigger::Request).unwrap_err();
        assert_eq!(err.status, 500);
        assert_eq!(handler.state_label(), "failed");

        failing.store(false, Ordering::SeqCst);
        assert!(handler.advance(&ctx, Trigger::Request).unwrap().is_some());
        assert_eq!(handler.state_label(), "compiled");
        assert_eq!(compiles.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_change_recompiles_and_invalidate_resets() {
        let compiles = Arc::new(AtomicUsize::new(0));
        let (ctx, _temp) = test_context(CountingCompiler::new(compiles.clone()), &["index.page"]);
        let handler = &ctx.routes.entry_for_source(&ctx.base.join("index.page")).unwrap().handler;

        handler.advance(&ctx, Trigger::Request).unwrap();
        handler.advance(&ctx, Trigger::Request).unwrap();
        assert_eq!(compiles.load(Ordering::SeqCst), 1);

        handler.advance(&ctx, Trigger::Change).unwrap();
        assert_eq!(compiles.load(Ordering::SeqCst), 2);

        assert!(handler.advance(&ctx, Trigger::Invalidate).unwrap().is_none());
        assert_eq!(handler.state_label(), "uninitialized");

        handler.advance(&ctx, Trigger::Request).unwrap();
        assert_eq!(compiles.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_forced_flag_is_taken_once() {
        let handler = LazyHandler::new(Path::new("/src/a.page"), FileKind::Page, RouteId::new("/a"));
        assert!(!handler.take_forced());
        handler.force_next_reload();
        assert!(handler.take_forced());
        assert!(!handler.take_forced());
    }
}
