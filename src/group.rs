//! Route groups: a shared path prefix for a batch of registrations.
//!
//! ```rust,no_run
//! use tine::{Group, Request, Response, Router};
//!
//! # async fn list(_: Request) -> Response { Response::text("") }
//! # async fn show(_: Request) -> Response { Response::text("") }
//! let users = Group::new("/users")
//!     .get("", list)
//!     .get("/:id", show);
//!
//! let app = Router::new().mount(users);
//! ```

use http::Method;

use crate::handler::{BoxedHandler, Handler};
use crate::router::method_shorthands;

/// Routes waiting to be mounted on a [`Router`](crate::Router), all under one
/// prefix.
pub struct Group {
    prefix: String,
    routes: Vec<(Method, String, BoxedHandler)>,
}

impl Group {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), routes: Vec::new() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Queues `prefix + path` for `method`. Nothing is validated until the
    /// group is mounted.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        let path = format!("{}{path}", self.prefix);
        self.routes.push((method, path, handler.into_endpoint()));
        self
    }

    method_shorthands! {
        get => GET,
        post => POST,
        put => PUT,
        patch => PATCH,
        delete => DELETE,
        head => HEAD,
        options => OPTIONS,
    }

    /// The queued `(method, full path)` pairs, in registration order.
    pub fn routes(&self) -> impl Iterator<Item = (&Method, &str)> {
        self.routes.iter().map(|(method, path, _)| (method, path.as_str()))
    }

    pub(crate) fn into_routes(self) -> impl Iterator<Item = (Method, String, BoxedHandler)> {
        self.routes.into_iter()
    }
}
