//! Per-method request routing.
//!
//! One radix tree per HTTP method. The router picks the tree, the tree finds
//! the handler in O(path-length). When the path exists under another method
//! only, the router says so, so the server can answer `405` instead of `404`.

use std::collections::HashMap;

use http::{Extensions, Method};
use tracing::debug;

use crate::error::Error;
use crate::group::Group;
use crate::handler::{BoxedHandler, Handler};
use crate::tree::{Config, Params, Tree};

/// Generates the `get`/`post`/… shorthands for a builder with an `on` method.
macro_rules! method_shorthands {
    ($($name:ident => $method:ident),* $(,)?) => {
        $(
            #[doc = concat!("Registers a handler for `", stringify!($method), "` requests.")]
            pub fn $name(self, path: &str, handler: impl Handler) -> Self {
                self.on(Method::$method, path, handler)
            }
        )*
    };
}

pub(crate) use method_shorthands;

/// Outcome of routing one request.
pub(crate) enum Dispatch<'r> {
    Found { handler: &'r BoxedHandler, params: Params },
    /// The path is registered, but not for this method.
    MethodNotAllowed { allow: Vec<Method> },
    NotFound,
}

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each registration returns `self` so calls chain naturally.
pub struct Router {
    trees: HashMap<Method, Tree<BoxedHandler>>,
    config: Config,
    not_found: Option<BoxedHandler>,
    props: Extensions,
}

impl Router {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// A router whose trees use custom placeholder and delimiter bytes.
    pub fn with_config(config: Config) -> Self {
        Self { trees: HashMap::new(), config, not_found: None, props: Extensions::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `:name` syntax. `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use tine::{Method, Request, Response, Router};
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET,  "/users/:id", get_user)
    ///     .on(Method::POST, "/users",     create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the route is invalid, so misconfiguration fails at startup.
    /// Use [`Router::try_on`] to handle the error instead.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.try_on(method, path, handler).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Fallible form of [`Router::on`].
    pub fn try_on(self, method: Method, path: &str, handler: impl Handler) -> Result<Self, Error> {
        self.insert(method, path, handler.into_endpoint())
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

    /// Registers every route of `group`.
    ///
    /// # Panics
    ///
    /// Panics if any of the group's routes is invalid.
    pub fn mount(self, group: Group) -> Self {
        self.insert_all(group.into_routes())
    }

    /// Registers every route of `other` on this router, re-inserted under this
    /// router's syntax. `other`'s props are added, and its not-found handler is
    /// used if this router has none.
    ///
    /// # Panics
    ///
    /// Panics if one of `other`'s routes conflicts with a route already here.
    pub fn merge(self, other: Router) -> Self {
        let Router { trees, not_found, props, .. } = other;
        let mut router = self.insert_all(trees.into_iter().flat_map(|(method, tree)| {
            tree.into_routes()
                .into_iter()
                .map(move |(path, handler)| (method.clone(), path, handler))
        }));
        router.not_found = router.not_found.or(not_found);
        router.props.extend(props);
        router
    }

    /// Answers requests that match no route under any method. Without one the
    /// server replies with an empty `404`.
    pub fn not_found(mut self, handler: impl Handler) -> Self {
        self.not_found = Some(handler.into_endpoint());
        self
    }

    /// Stores an application-wide value every handler can read back with
    /// [`Request::prop`](crate::Request::prop). One value per type; a second
    /// call with the same type replaces the first.
    pub fn prop<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.props.insert(value);
        self
    }

    fn insert_all(self, routes: impl IntoIterator<Item = (Method, String, BoxedHandler)>) -> Self {
        let mut router = self;
        for (method, path, handler) in routes {
            router = router.insert(method, &path, handler).unwrap_or_else(|e| panic!("{e}"));
        }
        router
    }

    fn insert(mut self, method: Method, path: &str, handler: BoxedHandler) -> Result<Self, Error> {
        let config = self.config;
        self.trees
            .entry(method.clone())
            .or_insert_with(|| Tree::with_config(config))
            .insert(path, handler)
            .map_err(|source| Error::Route { path: path.to_owned(), source })?;
        debug!(%method, path, "route registered");
        Ok(self)
    }

    /// Number of registered endpoints across every method.
    pub fn len(&self) -> usize {
        self.trees.values().map(Tree::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Methods with a route matching `path`, sorted by name.
    pub fn allowed(&self, path: &str) -> Vec<Method> {
        let mut allowed: Vec<Method> = self
            .trees
            .iter()
            .filter(|(_, tree)| tree.lookup(path).is_some())
            .map(|(method, _)| method.clone())
            .collect();
        allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        allowed
    }

    pub(crate) fn lookup(&self, method: &Method, path: &str) -> Dispatch<'_> {
        if let Some(found) = self.trees.get(method).and_then(|tree| tree.lookup(path)) {
            return Dispatch::Found { handler: found.handler, params: found.params };
        }
        let allow = self.allowed(path);
        if allow.is_empty() {
            Dispatch::NotFound
        } else {
            Dispatch::MethodNotAllowed { allow }
        }
    }

    pub(crate) fn fallback(&self) -> Option<&BoxedHandler> {
        self.not_found.as_ref()
    }

    pub(crate) fn props(&self) -> &Extensions {
        &self.props
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::request::Parts;

    use super::*;
    use crate::{Request, Response};

    async fn user(req: Request) -> Response {
        Response::text(format!("user {}", req.param("id").unwrap_or("?")))
    }

    async fn ok(_req: Request) -> &'static str {
        "ok"
    }

    async fn other(_req: Request) -> &'static str {
        "other"
    }

    fn head(path: &str) -> Parts {
        http::Request::builder().uri(path).body(()).unwrap().into_parts().0
    }

    async fn call(router: &Router, method: Method, path: &str) -> Option<Response> {
        match router.lookup(&method, path) {
            Dispatch::Found { handler, params } => {
                Some(handler.call(head(path), Bytes::new(), params).await)
            }
            _ => None,
        }
    }

    #[tokio::test]
    async fn found_handler_receives_params() {
        let router = Router::new().get("/users/:id", user);

        let res = call(&router, Method::GET, "/users/7").await.unwrap();
        assert_eq!(res.body(), b"user 7");
    }

    #[test]
    fn other_method_yields_method_not_allowed() {
        let router = Router::new()
            .post("/users", ok)
            .get("/users", ok)
            .put("/users/:id", ok);

        match router.lookup(&Method::DELETE, "/users") {
            Dispatch::MethodNotAllowed { allow } => assert_eq!(allow, [Method::GET, Method::POST]),
            _ => panic!("expected 405"),
        }
        assert!(matches!(router.lookup(&Method::GET, "/nope"), Dispatch::NotFound));
    }

    #[test]
    fn len_counts_every_method() {
        let router = Router::new().get("/", ok).post("/", ok).get("/", ok);
        assert_eq!(router.len(), 2);
    }

    #[test]
    fn try_on_reports_conflicts() {
        let err = Router::new()
            .get("/users/:id", ok)
            .try_on(Method::GET, "/users/:name", ok)
            .err()
            .unwrap();
        assert!(matches!(err, Error::Route { ref path, .. } if path == "/users/:name"));
        assert!(err.to_string().contains("/users/:id"));
    }

    #[test]
    #[should_panic(expected = "route pattern must not be empty")]
    fn on_panics_on_empty_pattern() {
        let _ = Router::new().get("", ok);
    }

    #[test]
    fn custom_config_reaches_every_tree() {
        let router = Router::with_config(Config::default().placeholder(b'$'))
            .get("/files/$name", ok);
        assert!(matches!(router.lookup(&Method::GET, "/files/a.txt"), Dispatch::Found { .. }));
        assert!(matches!(router.lookup(&Method::GET, "/files/:name"), Dispatch::Found { .. }));
    }

    #[tokio::test]
    async fn merge_takes_routes_fallback_and_props() {
        let api = Router::new()
            .get("/users/:id", user)
            .post("/users", ok)
            .not_found(other)
            .prop(7u32);
        let router = Router::new().get("/", ok).merge(api);

        assert_eq!(router.len(), 3);
        let res = call(&router, Method::GET, "/users/3").await.unwrap();
        assert_eq!(res.body(), b"user 3");
        assert!(matches!(router.lookup(&Method::POST, "/users"), Dispatch::Found { .. }));
        assert!(router.fallback().is_some());
        assert_eq!(router.props().get::<u32>(), Some(&7));
    }

    #[tokio::test]
    async fn merge_keeps_own_not_found() {
        let router = Router::new().not_found(ok).merge(Router::new().not_found(other));

        let handler = router.fallback().unwrap();
        let res = handler.call(head("/missing"), Bytes::new(), Params::new()).await;
        assert_eq!(res.body(), b"ok");
    }

    #[test]
    #[should_panic(expected = "/users/:id")]
    fn merge_panics_on_conflict() {
        let _ = Router::new()
            .get("/users/:id", ok)
            .merge(Router::new().get("/users/:name", ok));
    }
}
