use crate::domain_port::*;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

pub type Responder = Arc<dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync>;

struct Route {
    method: HttpMethod,
    path: String,
    delay: Duration,
    responder: Responder,
}

/// In-process backend answering from a table of routes.
///
/// Every request is recorded before it is answered. Unknown routes get a 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
}

fn bare_path(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the responder for `method path`.
    pub fn route<F>(&self, method: HttpMethod, path: &str, responder: F) -> &Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    {
        self.route_with_delay(method, path, Duration::ZERO, responder)
    }

    /// Like [`route`](Self::route), answering only after `delay`.
    pub fn route_with_delay<F>(
        &self,
        method: HttpMethod,
        path: &str,
        delay: Duration,
        responder: F,
    ) -> &Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        routes.retain(|r| !(r.method == method && r.path == path));
        routes.push(Route {
            method,
            path: path.to_owned(),
            delay,
            responder: Arc::new(responder),
        });
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, method: HttpMethod, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && bare_path(&r.path) == path)
            .count()
    }

    /// A small self-consistent backend for offline runs of the CLI.
    pub fn demo() -> Self {
        let transport = Self::new();
        let login = |_: &HttpRequest| {
            Ok(json_response(
                200,
                serde_json::json!({
                    "accessToken": "demo-access-1",
                    "refreshToken": "demo-refresh",
                    "user": demo_profile(),
                }),
            ))
        };
        transport
            .route(HttpMethod::Post, "/auth/login", login)
            .route(HttpMethod::Post, "/auth/identity-login", login)
            .route(HttpMethod::Post, "/auth/register", login)
            .route(HttpMethod::Post, "/auth/logout", |_| Ok(HttpResponse::new(204, "")))
            .route(HttpMethod::Post, "/auth/refresh", |req| {
                let presented = req
                    .body
                    .as_ref()
                    .and_then(|b| b.get("refreshToken"))
                    .and_then(|t| t.as_str());
                if presented == Some("demo-refresh") {
                    Ok(json_response(200, serde_json::json!({ "accessToken": "demo-access-2" })))
                } else {
                    Ok(HttpResponse::new(401, r#"{"error":"invalid refresh token"}"#))
                }
            })
            .route(HttpMethod::Get, "/auth/me", |req| {
                if req.bearer.is_some() {
                    Ok(json_response(200, demo_profile()))
                } else {
                    Ok(HttpResponse::new(401, r#"{"error":"unauthorized"}"#))
                }
            })
            .route(HttpMethod::Get, "/billing/plans", |_| {
                Ok(json_response(
                    200,
                    serde_json::json!([
                        { "id": "starter", "name": "Starter", "credits": 100, "priceCents": 499 },
                        { "id": "studio", "name": "Studio", "credits": 1200, "priceCents": 3999 }
                    ]),
                ))
            })
            .route(HttpMethod::Get, "/generations", |_| {
                Ok(json_response(
                    200,
                    serde_json::json!({ "items": [demo_generation()], "page": 1, "totalPages": 1 }),
                ))
            })
            .route(HttpMethod::Post, "/generations", |_| {
                Ok(json_response(201, demo_generation()))
            })
            .route(
                HttpMethod::Get,
                &format!("/generations/{}", DEMO_GENERATION_ID),
                |_| Ok(json_response(200, demo_generation())),
            )
            .route(HttpMethod::Get, "/projects", |_| {
                Ok(json_response(200, serde_json::json!([])))
            });
        transport
    }
}

pub fn json_response(status: u16, body: serde_json::Value) -> HttpResponse {
    HttpResponse::new(status, body.to_string())
}

const DEMO_GENERATION_ID: &str = "0b5c9a8e-2f4d-4e1a-9c3b-7d6e5f4a3b21";

fn demo_generation() -> serde_json::Value {
    serde_json::json!({
        "id": DEMO_GENERATION_ID,
        "prompt": "samurai cat on a rooftop at dawn",
        "status": "completed",
        "imageUrls": ["https://cdn.studio.test/demo/0.png"],
        "creditsSpent": 4,
        "createdAt": "2026-01-01T00:00:00Z",
    })
}

fn demo_profile() -> serde_json::Value {
    serde_json::json!({
        "id": "6f1d3c52-6a2e-4c59-9a57-0d7e1d9b8a11",
        "username": "demo",
        "email": "demo@studio.test",
        "credits": 42,
        "plan": "starter",
    })
}

#[async_trait::async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let matched = {
            let routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
            routes
                .iter()
                .find(|r| r.method == request.method && r.path == bare_path(&request.path))
                .map(|r| (r.delay, r.responder.clone()))
        };

        match matched {
            Some((delay, responder)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                responder(&request)
            }
            None => Ok(HttpResponse::new(
                404,
                format!("no route for {} {}", request.method, request.path),
            )),
        }
    }
}
