//! Onion-style middleware chain with a request-scoped cursor.
//!
//! [`Next`] carries the not-yet-run tail of the middleware list plus the terminal
//! handler. Each dispatch builds its own [`Next`], so concurrent requests never share
//! cursor state; a middleware that drops it without calling [`Next::run`] short-circuits
//! the rest of the chain.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use logibot_core::{Request, Response, Result};

/// Terminal route handler.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, request: Request) -> Result<Response>;
}

/// Any async closure `Fn(Request) -> Future<Result<Response>>` is a handler, so routes
/// can be registered inline without a named type.
#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response>> + Send,
{
    async fn call(&self, request: Request) -> Result<Response> {
        (self)(request).await
    }
}

/// One layer of the chain. May run logic before/after `next.run(request).await`,
/// rewrite the request or response, or return a response without calling `next` at all.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, request: Request, next: Next<'_>) -> Result<Response>;
}

/// Remaining chain for one dispatch: the middleware tail plus the terminal handler.
pub struct Next<'a> {
    remaining: &'a [Arc<dyn Middleware>],
    handler: &'a dyn Handler,
}

impl<'a> Next<'a> {
    pub(crate) fn new(remaining: &'a [Arc<dyn Middleware>], handler: &'a dyn Handler) -> Self {
        Self { remaining, handler }
    }

    /// Advances the cursor: runs the head middleware with the rest of the chain, or the
    /// terminal handler once the middleware list is exhausted.
    pub async fn run(mut self, request: Request) -> Result<Response> {
        match self.remaining.split_first() {
            Some((middleware, rest)) => {
                self.remaining = rest;
                middleware.handle(request, self).await
            }
            None => self.handler.call(request).await,
        }
    }
}
