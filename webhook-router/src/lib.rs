//! # webhook-router
//!
//! Maps (method, path) pairs to a handler plus an ordered middleware list and
//! dispatches requests through the combined chain: global middleware first, then
//! route-specific middleware, then the handler. Routing misses and chain failures
//! never escape [`Router::handle`]; they come back as 405/404/500 JSON responses.

mod chain;

pub use chain::{Handler, Middleware, Next};

use std::collections::HashMap;
use std::sync::Arc;

use logibot_core::{Method, Request, Response};
use serde_json::json;
use tracing::{debug, error, instrument, warn};

/// A registered route: terminal handler plus its route-specific middleware, fixed at
/// registration time.
struct Route {
    handler: Arc<dyn Handler>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

/// Request router keyed by method, then exact path string.
#[derive(Default)]
pub struct Router {
    routes: HashMap<Method, HashMap<String, Route>>,
    global: Vec<Arc<dyn Middleware>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for (method, path). Paths match as exact strings, no
    /// parameterized segments; re-registering the same pair replaces the old route.
    pub fn register(
        &mut self,
        method: Method,
        path: impl Into<String>,
        handler: Arc<dyn Handler>,
        middlewares: Vec<Arc<dyn Middleware>>,
    ) {
        let path = path.into();
        debug!(%method, %path, middleware_count = middlewares.len(), "route registered");
        self.routes
            .entry(method)
            .or_default()
            .insert(path, Route { handler, middlewares });
    }

    /// Appends a middleware applied to every route, ahead of the route-specific ones,
    /// in registration order.
    pub fn use_middleware(&mut self, middleware: Arc<dyn Middleware>) {
        self.global.push(middleware);
    }

    /// Dispatches one request. Unknown method → 405; unknown path → 404 echoing the
    /// requested path and method; an `Err` anywhere in the chain → 500 carrying the
    /// error message. Each call builds its own chain cursor, so concurrent dispatches
    /// are independent.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path()))]
    pub async fn handle(&self, request: Request) -> Response {
        let Some(paths) = self.routes.get(&request.method) else {
            warn!("no routes registered for method");
            return Response::error("Method Not Allowed", 405);
        };

        let path = request.path().to_string();
        let Some(route) = paths.get(&path) else {
            warn!("no route registered for path");
            return Response::json(
                404,
                &json!({
                    "error": "Not Found",
                    "path": path,
                    "method": request.method.to_string(),
                }),
            );
        };

        let chain: Vec<Arc<dyn Middleware>> = self
            .global
            .iter()
            .chain(route.middlewares.iter())
            .cloned()
            .collect();

        let next = Next::new(&chain, route.handler.as_ref());
        match next.run(request).await {
            Ok(response) => {
                debug!(status = response.status, "request handled");
                response
            }
            Err(e) => {
                error!(error = %e, "request chain failed");
                Response::json(
                    500,
                    &json!({
                        "error": "Internal Server Error",
                        "message": e.to_string(),
                    }),
                )
            }
        }
    }
}
