//! Handlers and the endpoints the route trees store.
//!
//! A per-method tree holds handlers of many concrete types, so each handler is
//! turned into an [`Endpoint`] when it is registered. The tree only ever sees
//! the endpoint. After a lookup, dispatch passes it the request head, the
//! collected body and the parameters the lookup bound, and the endpoint builds
//! the [`Request`] the user's function receives:
//!
//! ```text
//! router.get("/users/:id", show)       show.into_endpoint()   -> Arc<FnEndpoint>
//! tree.lookup("/users/7")              Match { handler: &endpoint, params: {id: 7} }
//! endpoint.call(head, body, params)    show(Request::new(..)) -> Response
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http::request::Parts;

use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::tree::Params;

pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A routed handler with its concrete type erased.
#[doc(hidden)]
pub trait Endpoint: Send + Sync + 'static {
    fn call(&self, head: Parts, body: Bytes, params: Params) -> BoxFuture;
}

/// What the route trees store; cloned out of the tree per request.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn Endpoint>;

/// Implemented for every valid route handler: any
/// `async fn(Request) -> impl IntoResponse` that is `Send + Sync + 'static`.
///
/// The trait is sealed.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_endpoint(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_endpoint(self) -> BoxedHandler {
        Arc::new(FnEndpoint(self))
    }
}

struct FnEndpoint<F>(F);

impl<F, Fut, R> Endpoint for FnEndpoint<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, head: Parts, body: Bytes, params: Params) -> BoxFuture {
        let fut = (self.0)(Request::new(head, body, params));
        Box::pin(async move { fut.await.into_response() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn greet(req: Request) -> String {
        format!("{} {}", req.method(), req.param("name").unwrap_or("nobody"))
    }

    #[tokio::test]
    async fn endpoint_builds_the_request_from_bound_params() {
        let endpoint = greet.into_endpoint();
        let (head, ()) = http::Request::post("/hello/ada").body(()).unwrap().into_parts();
        let params = Params::from([("name".to_owned(), "ada".to_owned())]);

        let res = endpoint.call(head, Bytes::new(), params).await;
        assert_eq!(res.body(), b"POST ada");
    }
}
