//! Common test utilities and fixtures
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use cadence_core::ordering::RebalancePolicy;
use cadence_server::{api, middleware::USER_ID_HEADER, state::AppState};
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt;

/// Router over a fresh file-backed database
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_url = format!("sqlite://{}", temp_dir.path().join("test.db").display());

        let pool = cadence_storage::create_pool(&db_url, 5)
            .await
            .expect("Failed to create pool");
        cadence_storage::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let app_state = AppState::new(pool.clone(), RebalancePolicy::default(), 3);

        Self {
            router: api::router(app_state),
            pool,
            _temp_dir: temp_dir,
        }
    }

    /// Send a request, optionally as `user` and with a JSON body
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }

    /// Register a user and return its ID
    pub async fn create_user(&self, username: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/users",
                None,
                Some(serde_json::json!({ "username": username })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }

    /// Create songs owned by `user`, returning their IDs in order
    pub async fn create_songs(&self, user: &str, titles: &[&str]) -> Vec<String> {
        let mut ids = Vec::new();
        for title in titles {
            let (status, body) = self
                .request(
                    Method::POST,
                    "/api/songs",
                    Some(user),
                    Some(serde_json::json!({ "title": title })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{body}");
            ids.push(body["id"].as_str().unwrap().to_string());
        }
        ids
    }

    /// Create a container (`albums` or `playlists`) owned by `user`
    pub async fn create_container(&self, kind: &str, user: &str, name: &str) -> String {
        let body = match kind {
            "albums" => serde_json::json!({ "title": name }),
            _ => serde_json::json!({ "name": name }),
        };
        let (status, body) = self
            .request(Method::POST, &format!("/api/{kind}"), Some(user), Some(body))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }
}

/// Titles from an ordered song listing
pub fn titles(listing: &Value) -> Vec<String> {
    listing
        .as_array()
        .expect("listing is an array")
        .iter()
        .map(|song| song["title"].as_str().unwrap().to_string())
        .collect()
}
