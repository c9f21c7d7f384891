//! Request dispatch, independent of the transport.
//!
//! ```text
//! Incoming ──▶ ping? ──▶ dev socket? ──▶ RouteTable::lookup
//!                                            │
//!                         handler.advance(Request)
//!                                            │
//!                 ┌──────────────┬───────────┴────────┐
//!               Page          Endpoint             Socket
//!        data ▸ render ▸      respond()          upgrade
//!           document
//! ```

use std::sync::Arc;

use serde_json::Value;

use super::response::Reply;
use crate::compiler::{PageModule, ServerModule, SocketEndpoint};
use crate::context::ServerContext;
use crate::core::{HttpMethod, RequestInfo, RouteId, RouteMethod};
use crate::logger::PhaseTimer;
use crate::render::PageParts;
use crate::route::{HandlerError, RouteError, RouteMatch, Trigger};

/// What the transport needs to know about a request.
#[derive(Debug, Clone, Default)]
pub struct Incoming {
    /// `None` for methods no handler file can answer.
    pub method: Option<HttpMethod>,
    pub target: String,
    pub accept: Option<String>,
    /// Client asked for a WebSocket upgrade.
    pub upgrade: bool,
    pub body: String,
}

/// Outcome of dispatch.
pub enum Action {
    Reply(Reply),
    /// Hand the connection to the hot-reload clients.
    DevSocket { route: Option<RouteId> },
    /// Serve a `.socket` route on the upgraded connection.
    Socket(Arc<dyn SocketEndpoint>),
}

pub fn dispatch(ctx: &ServerContext, incoming: &Incoming) -> Action {
    let request = RequestInfo::from_target(incoming.method, &incoming.target)
        .with_body(incoming.body.clone());

    if request.path == ctx.config.dev.ping_path {
        return Action::Reply(Reply::empty());
    }

    if ctx.dev_socket() == Some(request.path.as_str()) {
        if !incoming.upgrade {
            return Action::Reply(Reply::text(426, "Upgrade Required"));
        }
        return Action::DevSocket {
            route: request.query("route").map(RouteId::new),
        };
    }

    match resolve(ctx, incoming, &request.path) {
        Some(found) => run(ctx, incoming, found, request),
        None => Action::Reply(error(ctx, incoming, &RouteError::NotFound.into())),
    }
}

/// Socket routes win for upgrade requests; HEAD falls back to GET.
fn resolve(ctx: &ServerContext, incoming: &Incoming, path: &str) -> Option<RouteMatch> {
    if incoming.upgrade
        && let Some(found) = ctx.routes.lookup(RouteMethod::Socket, path)
    {
        return Some(found);
    }

    let method = incoming.method?;
    ctx.routes
        .lookup(RouteMethod::Http(method), path)
        .or_else(|| {
            (method == HttpMethod::Head)
                .then(|| ctx.routes.lookup(RouteMethod::Http(HttpMethod::Get), path))
                .flatten()
        })
        .or_else(|| ctx.routes.lookup(RouteMethod::Socket, path))
}

fn run(ctx: &ServerContext, incoming: &Incoming, found: RouteMatch, request: RequestInfo) -> Action {
    let entry = &found.entry;
    let request = request.with_params(found.params);

    let module = match entry.handler.advance(ctx, Trigger::Request) {
        Ok(Some(module)) => module,
        Ok(None) => {
            let err = HandlerError::internal(format!("no module for {}", entry.key.route));
            return Action::Reply(error(ctx, incoming, &err));
        }
        Err(err) => return Action::Reply(error(ctx, incoming, &err)),
    };

    match module {
        ServerModule::Socket(socket) if incoming.upgrade => Action::Socket(socket),
        ServerModule::Socket(_) => Action::Reply(Reply::text(426, "Upgrade Required")),
        ServerModule::Endpoint(endpoint) => Action::Reply(endpoint.respond(&request).into()),
        ServerModule::Page(page) => match render_page(ctx, &entry.key.route, page.as_ref(), &request) {
            Ok(reply) => Action::Reply(reply),
            Err(err) => Action::Reply(error(ctx, incoming, &err)),
        },
    }
}

/// Data handler, then markup, then the full document.
fn render_page(
    ctx: &ServerContext,
    route: &RouteId,
    page: &dyn PageModule,
    request: &RequestInfo,
) -> Result<Reply, HandlerError> {
    let artifact = ctx
        .cache
        .current(route)
        .ok_or_else(|| HandlerError::internal(format!("{route} has no compiled artifact")))?;

    let data = {
        let _timer = PhaseTimer::start("serve", format!("data {route}"));
        match artifact.data_handler(&ctx.sandbox)? {
            Some(handler) => handler.call(request, &ctx.sandbox)?,
            None => Value::Null,
        }
    };

    let _timer = PhaseTimer::start("serve", format!("render {route}"));
    let rendered = page.render(&data);
    let class_name = route.class_name();

    // Fresh documents pair the module's markup with its own style. The cached
    // style may carry an older scope hash kept for clients patched in place.
    let html = ctx.renderer.render(&PageParts {
        route,
        class_name: &class_name,
        markup: &rendered.markup,
        style: &rendered.style,
        hydration_script: &artifact.hydration_script,
        data: &data,
        dev: ctx.dev_endpoints(),
    });

    Ok(Reply::html(200, html))
}

fn error(ctx: &ServerContext, incoming: &Incoming, err: &HandlerError) -> Reply {
    Reply::error(err, incoming.accept.as_deref(), ctx.config.show_stack())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::source_context;
    use crate::reload::{HotReloadMessage, ReloadRequest, apply_reload};
    use regex::Regex;

    fn get(target: &str) -> Incoming {
        Incoming {
            method: Some(HttpMethod::Get),
            target: target.into(),
            ..Default::default()
        }
    }

    fn reply(action: Action) -> Reply {
        match action {
            Action::Reply(reply) => reply,
            Action::DevSocket { .. } => panic!("unexpected dev socket"),
            Action::Socket(_) => panic!("unexpected socket"),
        }
    }

    const USER_PAGE: &str = "<data>{\"id\": \"$params.id\", \"tab\": \"$query.tab\"}</data>\n\
        <style>h1 { color: red }</style>\n<h1>User {data.id} ({data.tab})</h1>";

    #[test]
    fn test_ping() {
        let (ctx, _temp) = source_context(&[], "");
        let reply = reply(dispatch(&ctx, &get("/.well-known/ping")));
        assert_eq!(reply.status, 200);
        assert!(reply.body.is_empty());
    }

    #[test]
    fn test_page_with_data() {
        let (ctx, _temp) = source_context(&[("users_[id].page", USER_PAGE)], "");
        let reply = reply(dispatch(&ctx, &get("/users/7?tab=posts")));

        assert_eq!(reply.status, 200);
        assert!(reply.body.contains("User 7 (posts)"), "{}", reply.body);
        assert!(reply.body.contains("h1.kettle-"));
        assert!(reply.body.contains("/.well-known/dev"));

        let entry = ctx.routes.lookup(RouteMethod::Http(HttpMethod::Get), "/users/1").unwrap().entry;
        assert!(entry.handler.is_listening());
    }

    #[test]
    fn test_production_page_has_no_dev_socket() {
        let (ctx, _temp) = source_context(&[("index.page", "<p>home</p>")], "[project]\nproduction = true");
        let reply = reply(dispatch(&ctx, &get("/")));
        assert_eq!(reply.status, 200);
        assert!(!reply.body.contains("WebSocket"));

        let entry = ctx.routes.lookup(RouteMethod::Http(HttpMethod::Get), "/").unwrap().entry;
        assert!(!entry.handler.is_listening());
    }

    #[test]
    fn test_endpoint_and_head_fallback() {
        let (ctx, _temp) = source_context(&[("api_[id].get", "{\"id\": \"{params.id}\"}")], "");

        let json = reply(dispatch(&ctx, &get("/api/3")));
        assert_eq!(json.content_type, "application/json");
        assert_eq!(json.body, "{\"id\": \"3\"}");

        let head = Incoming {
            method: Some(HttpMethod::Head),
            ..get("/api/3")
        };
        assert_eq!(reply(dispatch(&ctx, &head)).status, 200);

        let post = Incoming {
            method: Some(HttpMethod::Post),
            ..get("/api/3")
        };
        assert_eq!(reply(dispatch(&ctx, &post)).status, 404);
    }

    #[test]
    fn test_not_found_json() {
        let (ctx, _temp) = source_context(&[], "");
        let incoming = Incoming {
            accept: Some("application/json".into()),
            ..get("/missing")
        };
        let reply = reply(dispatch(&ctx, &incoming));
        assert_eq!(reply.status, 404);
        assert!(reply.body.contains("Page not found."));
    }

    #[test]
    fn test_compile_error_document() {
        let (ctx, _temp) = source_context(&[("broken.page", "<style>p{}")], "");
        let shown = reply(dispatch(&ctx, &get("/broken")));
        assert_eq!(shown.status, 500);
        assert!(shown.body.contains("<pre><code>"));

        let (ctx, _temp) = source_context(&[("broken.page", "<style>p{}")], "[dev]\nshow_stack = false");
        let hidden = reply(dispatch(&ctx, &get("/broken")));
        assert_eq!(hidden.status, 500);
        assert!(!hidden.body.contains("<pre><code>"));
    }

    #[test]
    fn test_sockets() {
        let (ctx, _temp) = source_context(&[("chat.socket", "hello")], "");

        let plain = reply(dispatch(&ctx, &get("/chat")));
        assert_eq!(plain.status, 426);

        let upgrade = Incoming {
            upgrade: true,
            ..get("/chat")
        };
        match dispatch(&ctx, &upgrade) {
            Action::Socket(socket) => assert_eq!(socket.greeting().as_deref(), Some("hello")),
            _ => panic!("expected socket"),
        }

        let dev = Incoming {
            upgrade: true,
            ..get("/.well-known/dev?route=/chat")
        };
        match dispatch(&ctx, &dev) {
            Action::DevSocket { route } => assert_eq!(route, Some(RouteId::new("/chat"))),
            _ => panic!("expected dev socket"),
        }
    }

    #[test]
    fn test_dev_socket_absent_in_production() {
        let (ctx, _temp) = source_context(&[], "[project]\nproduction = true");
        let dev = Incoming {
            upgrade: true,
            ..get("/.well-known/dev")
        };
        assert_eq!(reply(dispatch(&ctx, &dev)).status, 404);
    }

    /// Scope class on the `<h1>` element and on the `h1` selector.
    fn h1_scopes(html: &str) -> (String, String) {
        let class = Regex::new(r#"<h1 class="(kettle-[0-9a-f]+)""#).unwrap();
        let selector = Regex::new(r"h1\.(kettle-[0-9a-f]+)\{").unwrap();
        (
            class.captures(html).unwrap()[1].to_string(),
            selector.captures(html).unwrap()[1].to_string(),
        )
    }

    #[test]
    fn test_fresh_load_after_style_patch() {
        let (ctx, _temp) = source_context(
            &[("index.page", "<style>h1 { color: red }</style>\n<h1>Hi</h1>")],
            "",
        );
        let (class, selector) = h1_scopes(&reply(dispatch(&ctx, &get("/"))).body);
        assert_eq!(class, selector);

        let path = ctx.base.join("index.page");
        std::fs::write(&path, "<style>h1 { color: blue }</style>\n<h1>Hi</h1>").unwrap();
        let request = ReloadRequest {
            path,
            due_to_dependency_change: false,
        };
        let delivery = apply_reload(&ctx, &request).unwrap();
        assert!(matches!(delivery.message, HotReloadMessage::Css { .. }));

        let body = reply(dispatch(&ctx, &get("/"))).body;
        let (class, selector) = h1_scopes(&body);
        assert_eq!(class, selector);
        assert!(body.contains("color: blue"));
    }
}
