#![allow(dead_code)]

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use tower::ServiceExt;

use company_service::{
    build_router,
    common::error::AppError,
    db::MemoryRepository,
    middleware::{
        auth::{Claims, CurrentUser},
        rbac::{Action, PermissionGate, Resource},
    },
    models::branch::BranchUser,
    AppState,
};

pub const JWT_SECRET: &str = "segredo-de-teste";

/// Permite tudo, menos os pares listados.
#[derive(Default)]
pub struct StaticPermissionGate {
    denied: HashSet<(Action, Resource)>,
}

impl StaticPermissionGate {
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn denying(pairs: &[(Action, Resource)]) -> Self {
        Self { denied: pairs.iter().copied().collect() }
    }
}

#[async_trait]
impl PermissionGate for StaticPermissionGate {
    async fn authorize(
        &self,
        _user: &CurrentUser,
        action: Action,
        resource: Resource,
    ) -> Result<bool, AppError> {
        Ok(!self.denied.contains(&(action, resource)))
    }
}

pub struct TestApp {
    pub router: Router,
    pub repo: MemoryRepository,
}

pub fn spawn_app() -> TestApp {
    spawn_app_with_gate(StaticPermissionGate::allow_all())
}

pub fn spawn_app_with_gate(gate: StaticPermissionGate) -> TestApp {
    let repo = MemoryRepository::new();
    let app_state = AppState::new(
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        Arc::new(gate),
        JWT_SECRET.to_string(),
    )
    .expect("estado de teste");

    TestApp { router: build_router(app_state), repo }
}

pub fn token(user_id: i32, company_id: i32) -> String {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims { sub: user_id, empresa_id: company_id, exp: now + 3600, iat: now };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET.as_bytes()))
        .expect("token de teste")
}

pub fn user(id: i32) -> BranchUser {
    BranchUser {
        id,
        first_name: format!("Nome{}", id),
        last_name: "Pérez".into(),
        email: format!("usuario{}@empresa.test", id),
        is_owner: false,
        active: true,
        created_at: Utc::now(),
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.request_with_lang(method, uri, token, body, None).await
    }

    pub async fn request_with_lang(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
        lang: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(lang) = lang {
            builder = builder.header(header::ACCEPT_LANGUAGE, lang);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("requisição de teste");

        let response = self.router.clone().oneshot(request).await.expect("resposta");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("corpo");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}
