//! HTTP server with hot reload support.
//!
//! ```text
//! serve ──▶ ServerContext ──▶ Coordinator (watch starts)
//!              │                    │
//!          discover ──▶ RouteTable  │ actors on a tokio thread
//!              │                    │
//!     tiny_http accept loop ──▶ rayon pool ──▶ dispatch
//! ```

mod dispatch;
mod lifecycle;
mod response;
mod socket;

use std::io::Read;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel;
use tiny_http::{Request, Server};
use tokio::sync::mpsc;

use self::dispatch::{Action, Incoming, dispatch};
use self::response::{header_value, respond_unavailable, send};
use crate::actor::Coordinator;
use crate::actor::fs::{WatchFilter, discover};
use crate::actor::messages::WsMsg;
use crate::config::AppConfig;
use crate::context::{Collaborators, ServerContext};
use crate::core::{HttpMethod, register_server};
use crate::logger::PhaseTimer;
use crate::{debug, log};

/// Serve the project until Ctrl+C, or until a change in production mode.
pub fn serve(config: AppConfig) -> Result<()> {
    let config = Arc::new(config);
    let collaborators = Collaborators::builtin(&config)?;
    let ctx = ServerContext::new(Arc::clone(&config), collaborators)?;

    // Watch before discovery so nothing written in between is missed.
    let filter = WatchFilter::new(&ctx.base, &config.watch);
    let coordinator = Coordinator::new(Arc::clone(&ctx), filter.clone())
        .context("failed to start file watcher")?;
    let ws_tx = coordinator.ws_sender();

    let routes = {
        let _timer = PhaseTimer::start("serve", "discover");
        discover(&ctx, &filter)
    };
    log!("serve"; "{} route(s) from {} ({})", routes, ctx.base.display(), ctx.mode.as_str());

    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    register_server(Arc::clone(&server), shutdown_tx);

    let actors = lifecycle::spawn_actors(coordinator, shutdown_rx);
    log!("serve"; "http://{}", addr);
    if let Some(path) = ctx.dev_socket() {
        debug!("hotreload"; "ws://{}{}", addr, path);
    }

    run_request_loop(&server, &ctx, &ws_tx)?;
    lifecycle::wait_for_shutdown(actors);
    Ok(())
}

fn run_request_loop(
    server: &Server,
    ctx: &Arc<ServerContext>,
    ws_tx: &mpsc::Sender<WsMsg>,
) -> Result<()> {
    // Compiles block, so requests run on a pool
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(ctx.config.serve.workers.max(1))
        .build()
        .context("failed to create request pool")?;

    for request in server.incoming_requests() {
        let ctx = Arc::clone(ctx);
        let ws_tx = ws_tx.clone();
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &ctx, &ws_tx) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(
    mut request: Request,
    ctx: &ServerContext,
    ws_tx: &mpsc::Sender<WsMsg>,
) -> Result<()> {
    // Early exit if shutdown requested
    if crate::core::is_shutdown() {
        return respond_unavailable(request);
    }

    let mut body = String::new();
    if let Err(e) = request.as_reader().read_to_string(&mut body) {
        debug!("serve"; "unreadable request body: {}", e);
    }

    let incoming = Incoming {
        method: HttpMethod::from_transport(request.method()),
        target: request.url().to_string(),
        accept: header_value(&request, "Accept"),
        upgrade: socket::wants_upgrade(&request),
        body,
    };
    debug!("serve"; "{} {}", request.method(), incoming.target);

    match dispatch(ctx, &incoming) {
        Action::Reply(reply) => send(request, reply),
        Action::DevSocket { route } => socket::accept_dev_client(request, route, ws_tx),
        Action::Socket(endpoint) => socket::accept_socket(request, endpoint),
    }
}
