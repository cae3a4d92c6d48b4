use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use middleware::{error_reporting::error_reporting_middleware, session::session_middleware};
use state::State;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, decompression::RequestDecompressionLayer,
    trace::TraceLayer,
};

mod middleware;
mod routes;

pub mod auth;
pub mod error;
pub mod state;

pub use axum;
pub use middleware::session::{AppUser, SessionUser};
pub use routes::MutationResponse;

pub fn construct_router(state: Arc<State>) -> Router {
    let router = Router::new()
        .nest("/health", routes::health::routes())
        .nest("/auth", routes::auth::routes())
        .nest("/catalog", routes::catalog::routes())
        .nest("/favorites", routes::favorites::routes())
        .nest("/admin", routes::admin::routes())
        .nest("/sales", routes::sales::routes())
        .with_state(state.clone())
        .route("/version", get(|| async { env!("CARGO_PKG_VERSION") }))
        .layer(from_fn(error_reporting_middleware))
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .layer(CorsLayer::permissive())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestDecompressionLayer::new())
                .layer(CompressionLayer::new()),
        );

    Router::new().nest("/api/v1", router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::LocalIdentity;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::{Value, json};
    use std::time::Duration;
    use tower::ServiceExt;
    use vitrine::user::Role;
    use vitrine_storage::{EntityKind, InMemoryStore, StorageBackend, StorageError, StorageResult};
    use vitrine_types::Record;

    const TEST_HASH_COST: u32 = 4;

    struct TestApp {
        router: Router,
        state: Arc<State>,
    }

    impl TestApp {
        async fn new() -> Self {
            let storage: Arc<dyn StorageBackend> = Arc::new(InMemoryStore::new());
            let identity = LocalIdentity::new(storage.clone(), "router-tests", Duration::from_secs(600))
                .with_hash_cost(TEST_HASH_COST);
            let state = Arc::new(State::new(storage, Arc::new(identity)));
            state
                .auth
                .ensure_admin("admin@loja.com", "admin123")
                .await
                .unwrap();
            state
                .auth
                .register("cliente@loja.com", "cliente123", "Cliente", Role::User)
                .await
                .unwrap();

            Self {
                router: construct_router(state.clone()),
                state,
            }
        }

        async fn call(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut request = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            let request = match body {
                Some(body) => request
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string())),
                None => request.body(Body::empty()),
            }
            .unwrap();

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, value)
        }

        async fn login(&self, email: &str, password: &str) -> String {
            let (status, body) = self
                .call(
                    Method::POST,
                    "/api/v1/auth/login",
                    None,
                    Some(json!({"email": email, "password": password})),
                )
                .await;
            assert_eq!(status, StatusCode::OK, "{body}");
            body["accessToken"].as_str().unwrap().to_string()
        }
    }

    struct BrokenProducts(InMemoryStore);

    #[vitrine_types::async_trait]
    impl StorageBackend for BrokenProducts {
        async fn list(&self, kind: EntityKind) -> StorageResult<Vec<Record>> {
            if kind == EntityKind::Products {
                return Err(StorageError::Transport("connection reset".to_string()));
            }
            self.0.list(kind).await
        }

        async fn create(&self, kind: EntityKind, fields: Record) -> StorageResult<String> {
            self.0.create(kind, fields).await
        }

        async fn update(&self, kind: EntityKind, id: &str, fields: Record) -> StorageResult<()> {
            self.0.update(kind, id, fields).await
        }

        async fn delete(&self, kind: EntityKind, id: &str) -> StorageResult<()> {
            self.0.delete(kind, id).await
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    #[tokio::test]
    async fn storage_failures_are_reported_with_an_id() {
        let storage: Arc<dyn StorageBackend> = Arc::new(BrokenProducts(InMemoryStore::new()));
        let identity = LocalIdentity::new(storage.clone(), "router-tests", Duration::from_secs(600))
            .with_hash_cost(TEST_HASH_COST);
        let router = construct_router(Arc::new(State::new(storage, Arc::new(identity))));

        let request = Request::builder()
            .uri("/api/v1/catalog/products")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.extensions().get::<error::ErrorReport>().is_none());

        let header = response.headers().get("x-error-id").cloned().unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "STORAGE_ERROR");
        assert_eq!(body["error"]["message"], "Erro ao carregar produtos");
        assert_eq!(body["error"]["id"], header.to_str().unwrap());
    }

    #[tokio::test]
    async fn health_reports_backends() {
        let app = TestApp::new().await;
        let (status, body) = app.call(Method::GET, "/api/v1/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["storage"], "memory");
        assert_eq!(body["identity"], "local");
    }

    #[tokio::test]
    async fn login_me_and_logout() {
        let app = TestApp::new().await;

        let (status, body) = app
            .call(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({"email": "admin@loja.com", "password": "wrong"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "E-mail ou senha inválidos");

        let token = app.login("ADMIN@loja.com", "admin123").await;
        let (status, body) = app.call(Method::GET, "/api/v1/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "admin");

        let (status, _) = app
            .call(Method::POST, "/api/v1/auth/logout", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app.call(Method::GET, "/api/v1/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_routes_are_guarded() {
        let app = TestApp::new().await;

        let (status, _) = app.call(Method::GET, "/api/v1/admin/products", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = app.login("cliente@loja.com", "cliente123").await;
        let (status, body) = app
            .call(Method::GET, "/api/v1/admin/products", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");

        let (status, _) = app
            .call(Method::GET, "/api/v1/sales/ranking", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn product_crud_feeds_the_catalog() {
        let app = TestApp::new().await;
        let token = app.login("admin@loja.com", "admin123").await;

        let (status, _) = app
            .call(
                Method::POST,
                "/api/v1/admin/products",
                Some(&token),
                Some(json!({"name": "  ", "price": 10.0})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .call(
                Method::POST,
                "/api/v1/admin/products",
                Some(&token),
                Some(json!({"name": "Café", "price": -1.0})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, created) = app
            .call(
                Method::POST,
                "/api/v1/admin/products",
                Some(&token),
                Some(json!({"name": "Café Especial", "price": 42.5, "code": "CAF-1"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["success"], true);
        let id = created["id"].as_str().unwrap().to_string();

        let (_, page) = app
            .call(Method::GET, "/api/v1/catalog/products?search=cafe", None, None)
            .await;
        assert_eq!(page["total"], 1);
        assert_eq!(page["items"][0]["name"], "Café Especial");

        let (status, _) = app
            .call(
                Method::PUT,
                &format!("/api/v1/admin/products/{id}"),
                Some(&token),
                Some(json!({"name": "Café Especial", "price": 42.5, "active": false})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, page) = app.call(Method::GET, "/api/v1/catalog/products", None, None).await;
        assert_eq!(page["total"], 0);
        let (status, _) = app
            .call(Method::GET, &format!("/api/v1/catalog/products/{id}"), None, None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .call(
                Method::PUT,
                "/api/v1/admin/products/missing",
                Some(&token),
                Some(json!({"name": "X", "price": 1.0})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .call(Method::DELETE, &format!("/api/v1/admin/products/{id}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app
            .call(Method::DELETE, &format!("/api/v1/admin/products/{id}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn product_update_clears_omitted_code() {
        let app = TestApp::new().await;
        let token = app.login("admin@loja.com", "admin123").await;

        let (_, created) = app
            .call(
                Method::POST,
                "/api/v1/admin/products",
                Some(&token),
                Some(json!({"name": "Café", "price": 1.0, "code": "OLD-1"})),
            )
            .await;
        let id = created["id"].as_str().unwrap().to_string();

        let (status, _) = app
            .call(
                Method::PUT,
                &format!("/api/v1/admin/products/{id}"),
                Some(&token),
                Some(json!({"name": "Café", "price": 1.0})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, product) = app
            .call(Method::GET, &format!("/api/v1/catalog/products/{id}"), None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(product["code"], Value::Null);
    }

    #[tokio::test]
    async fn demoted_admin_loses_access_immediately() {
        let app = TestApp::new().await;
        let admin = app.login("admin@loja.com", "admin123").await;

        let (status, created) = app
            .call(
                Method::POST,
                "/api/v1/admin/users",
                Some(&admin),
                Some(json!({
                    "email": "chefe@loja.com",
                    "name": "Chefe",
                    "role": "admin",
                    "password": "chefe123"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let chefe_id = created["id"].as_str().unwrap().to_string();

        let chefe = app.login("chefe@loja.com", "chefe123").await;
        let (status, _) = app
            .call(Method::GET, "/api/v1/admin/users", Some(&chefe), None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app
            .call(
                Method::PUT,
                &format!("/api/v1/admin/users/{chefe_id}"),
                Some(&admin),
                Some(json!({"email": "chefe@loja.com", "name": "Chefe", "role": "user"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app
            .call(Method::GET, "/api/v1/admin/users", Some(&chefe), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app
            .call(Method::DELETE, "/api/v1/admin/users/whatever", Some(&chefe), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn favorites_toggle_and_filter() {
        let app = TestApp::new().await;
        let admin = app.login("admin@loja.com", "admin123").await;
        let (_, created) = app
            .call(
                Method::POST,
                "/api/v1/admin/products",
                Some(&admin),
                Some(json!({"name": "Queijo", "price": 30.0})),
            )
            .await;
        let id = created["id"].as_str().unwrap().to_string();

        let (status, _) = app
            .call(Method::POST, &format!("/api/v1/favorites/{id}"), None, None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = app.login("cliente@loja.com", "cliente123").await;
        let (_, toggled) = app
            .call(Method::POST, &format!("/api/v1/favorites/{id}"), Some(&token), None)
            .await;
        assert_eq!(toggled["favorite"], true);

        let (_, page) = app
            .call(
                Method::GET,
                "/api/v1/catalog/products?favorites_only=true",
                Some(&token),
                None,
            )
            .await;
        assert_eq!(page["total"], 1);

        let (_, toggled) = app
            .call(Method::POST, &format!("/api/v1/favorites/{id}"), Some(&token), None)
            .await;
        assert_eq!(toggled["favorite"], false);

        let (_, favorites) = app.call(Method::GET, "/api/v1/favorites", Some(&token), None).await;
        assert_eq!(favorites["productIds"], json!([]));

        let (status, _) = app
            .call(Method::POST, "/api/v1/favorites/unknown", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn ranking_uses_goals_and_reference_date() {
        let app = TestApp::new().await;
        let token = app.login("admin@loja.com", "admin123").await;

        for (name, goal, realized) in [("Ana", 1000.0, 500.0), ("Bruno", 2000.0, 1900.0)] {
            let (status, _) = app
                .call(
                    Method::POST,
                    "/api/v1/sales/goals",
                    Some(&token),
                    Some(json!({
                        "name": name,
                        "sector": "Consumo",
                        "monthly_goal": goal,
                        "realized_amount": realized
                    })),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = app
            .call(
                Method::GET,
                "/api/v1/sales/ranking?channel=consumo&date=2024-06-01",
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let ranking = &body[0];
        assert_eq!(ranking["channel"], "Consumo");
        assert_eq!(ranking["period"]["days"], 30);
        assert_eq!(ranking["ranking"][0]["name"], "Bruno");
        assert_eq!(ranking["ranking"][0]["percentRealized"], 95.0);
        assert_eq!(ranking["totals"]["realizedAmount"], 2400.0);
        assert_eq!(ranking["totals"]["metaTotal"], 3000.0);
        assert_eq!(ranking["totals"]["percentTotal"], 80.0);

        let (_, all) = app
            .call(Method::GET, "/api/v1/sales/ranking?date=2024-06-01", Some(&token), None)
            .await;
        assert_eq!(all.as_array().map(Vec::len), Some(3));

        let (status, _) = app
            .call(Method::GET, "/api/v1/sales/ranking?channel=atacado", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn ledger_filters_and_summarizes() {
        let app = TestApp::new().await;
        let token = app.login("admin@loja.com", "admin123").await;

        for (date, seller, channel, amount) in [
            ("2024-05-02", "Ana", "Varejo", 100.0),
            ("2024-05-10", "Bruno", "Revenda", 400.0),
            ("2024-04-30", "Ana", "Varejo", 999.0),
        ] {
            let (status, _) = app
                .call(
                    Method::POST,
                    "/api/v1/sales/ledger",
                    Some(&token),
                    Some(json!({
                        "date": date,
                        "seller": seller,
                        "customer": "Padaria",
                        "channel": channel,
                        "amount": amount
                    })),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, sales) = app
            .call(Method::GET, "/api/v1/sales/ledger?month=2024-05", Some(&token), None)
            .await;
        assert_eq!(sales.as_array().map(Vec::len), Some(2));
        assert_eq!(sales[0]["seller"], "Bruno");

        let (_, summary) = app
            .call(
                Method::GET,
                "/api/v1/sales/ledger/summary?month=2024-05",
                Some(&token),
                None,
            )
            .await;
        assert_eq!(summary["totalAmount"], 500.0);
        assert_eq!(summary["count"], 2);
        assert_eq!(summary["bySeller"][0]["seller"], "Bruno");
    }

    #[tokio::test]
    async fn admin_creates_users_and_reads_history() {
        let app = TestApp::new().await;
        let token = app.login("admin@loja.com", "admin123").await;

        let (status, _) = app
            .call(
                Method::POST,
                "/api/v1/admin/users",
                Some(&token),
                Some(json!({"email": "sem-arroba", "name": "X"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .call(
                Method::POST,
                "/api/v1/admin/users",
                Some(&token),
                Some(json!({"email": "nova@loja.com", "name": "Nova", "password": "nova123"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app
            .call(
                Method::POST,
                "/api/v1/admin/users",
                Some(&token),
                Some(json!({"email": "NOVA@loja.com", "name": "Outra"})),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        app.login("nova@loja.com", "nova123").await;

        let (_, history) = app
            .call(Method::GET, "/api/v1/auth/history?limit=1", Some(&token), None)
            .await;
        assert_eq!(history.as_array().map(Vec::len), Some(1));
        assert_eq!(history[0]["user_email"], "nova@loja.com");

        let users = app.state.users.list().await.unwrap();
        assert_eq!(users.len(), 3);
    }
}
