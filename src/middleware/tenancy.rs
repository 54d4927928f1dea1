// src/middleware/tenancy.rs

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::auth::{AuthenticatedUser, CurrentUser},
};

/// Empresa (tenant) do usuário autenticado.
///
/// Todo método de repositório exige um `&TenantContext`, então nenhuma
/// consulta roda sem o filtro por empresa. O único jeito de obtê-lo numa
/// requisição é por este extrator, que lê a empresa do token já validado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext(i32);

impl TenantContext {
    pub fn company_id(&self) -> i32 {
        self.0
    }
}

impl From<&CurrentUser> for TenantContext {
    fn from(user: &CurrentUser) -> Self {
        TenantContext(user.company_id)
    }
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;
        Ok(TenantContext::from(&user))
    }
}
