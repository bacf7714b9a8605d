//! Minimal tine example: CRUD-style JSON endpoints and a route group.
//!
//! Run with:
//!   cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl -X POST http://localhost:3000/users -d '{"name":"alice"}'
//!   curl -X DELETE http://localhost:3000/users/42
//!   curl -i -X PUT http://localhost:3000/users/42      # 405, Allow: DELETE, GET
//!   curl http://localhost:3000/api/v1/params/a/fixed/b
//!   curl http://localhost:3000/nowhere                 # custom 404

use std::time::Duration;

use tine::{Group, Request, Response, Router, Server, StatusCode};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), tine::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tine=debug".into()))
        .init();

    let api = Group::new("/api/v1")
        .get("/params/:one/:two", echo_params)
        .get("/params/:one/fixed/:two", echo_params);

    let users = Router::new()
        .get("/users/:id",    get_user)
        .post("/users",       create_user)
        .delete("/users/:id", delete_user);

    let app = Router::new()
        .prop(Service("demo"))
        .merge(users)
        .mount(api)
        .not_found(not_found);

    Server::bind("0.0.0.0:3000")?
        .shutdown_timeout(Duration::from_secs(10))
        .serve(app)
        .await
}

#[derive(Clone)]
struct Service(&'static str);

async fn not_found(req: Request) -> Response {
    let service = req.prop::<Service>().map_or("tine", |s| s.0);
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .json(format!(r#"{{"service":"{service}","missing":"{}"}}"#, req.path()))
}

// GET /users/:id
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#))
}

// POST /users
async fn create_user(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }

    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/users/99")
        .json(r#"{"id":"99","name":"new_user"}"#)
}

// DELETE /users/:id → 204 No Content
async fn delete_user(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn echo_params(req: Request) -> String {
    let mut params: Vec<_> = req.params().iter().collect();
    params.sort();
    format!("{} {params:?}", req.path())
}
