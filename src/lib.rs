//! # tine
//!
//! A minimal async HTTP framework built around a compressed-trie router.
//!
//! ## The contract
//!
//! Every route is a `(method, pattern, handler)` triple. At startup each one is
//! inserted into the radix tree for its method. At request time the tree for
//! the request method is walked once, in time proportional to the path length,
//! and hands back the handler together with the captured `:name` parameters.
//!
//! - Radix-tree routing: shared prefixes stored once, see [`tree`]
//! - `404` when nothing matches, `405` + `Allow` when only another method does
//! - Route groups with a common prefix, and merging whole routers
//! - A custom not-found handler and application-wide props
//! - hyper underneath, HTTP/1.1 and HTTP/2
//! - Graceful shutdown on SIGTERM / Ctrl-C, draining in-flight requests with
//!   an optional time limit
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use tine::{Group, Request, Response, Router, Server, StatusCode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tine::Error> {
//!     let app = Router::new()
//!         .get("/", index)
//!         .mount(Group::new("/users").get("/:id", get_user).post("", create_user));
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! async fn index(_req: Request) -> &'static str {
//!     "hello"
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#))
//! }
//!
//! async fn create_user(req: Request) -> Response {
//!     if req.body().is_empty() {
//!         return Response::status(StatusCode::BAD_REQUEST);
//!     }
//!     Response::builder()
//!         .status(StatusCode::CREATED)
//!         .header("location", "/users/99")
//!         .json(r#"{"id":"99"}"#)
//! }
//! ```

mod error;
mod group;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod tree;

pub use error::{Error, InsertError};
pub use group::Group;
pub use handler::Handler;
pub use http::{Method, StatusCode};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
