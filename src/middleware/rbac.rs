// src/middleware/rbac.rs

use std::{fmt, marker::PhantomData};

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::{AuthenticatedUser, CurrentUser},
        i18n::Locale,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Branches,
    Warehouses,
    BranchWarehouses,
    UserBranches,
}

impl Resource {
    /// Nome do recurso como o motor de permissões o conhece.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Branches => "sucursales",
            Resource::Warehouses => "almacenes",
            Resource::BranchWarehouses => "sucursales_almacenes",
            Resource::UserBranches => "usuarios_sucursales",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// O colaborador externo que decide `allow`/`deny` para (ação, recurso).
#[async_trait]
pub trait PermissionGate: Send + Sync {
    async fn authorize(
        &self,
        user: &CurrentUser,
        action: Action,
        resource: Resource,
    ) -> Result<bool, AppError>;
}

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn action() -> Action;
    fn resource() -> Resource;
}

/// 2. O Extractor (Guardião)
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_request_parts(parts, state)
            .await
            .unwrap_or_default();

        // A. Extrai Usuário
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;

        // B. Pergunta ao motor de permissões
        let (action, resource) = (T::action(), T::resource());
        let allowed = app_state
            .permission_gate
            .authorize(&user, action, resource)
            .await
            .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

        if !allowed {
            tracing::warn!(
                user_id = user.user_id,
                company_id = user.company_id,
                "Permissão negada: {}:{}",
                action,
                resource
            );
            return Err(AppError::Forbidden(format!("{}:{}", action, resource))
                .to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

macro_rules! permission {
    ($name:ident, $action:ident, $resource:ident) => {
        pub struct $name;
        impl PermissionDef for $name {
            fn action() -> Action { Action::$action }
            fn resource() -> Resource { Resource::$resource }
        }
    };
}

permission!(PermBranchesRead, Read, Branches);
permission!(PermBranchesCreate, Create, Branches);
permission!(PermBranchesUpdate, Update, Branches);
permission!(PermBranchesDelete, Delete, Branches);

permission!(PermWarehousesRead, Read, Warehouses);
permission!(PermWarehousesCreate, Create, Warehouses);
permission!(PermWarehousesUpdate, Update, Warehouses);
permission!(PermWarehousesDelete, Delete, Warehouses);

permission!(PermBranchWarehousesRead, Read, BranchWarehouses);
permission!(PermBranchWarehousesCreate, Create, BranchWarehouses);
permission!(PermBranchWarehousesDelete, Delete, BranchWarehouses);

permission!(PermUserBranchesRead, Read, UserBranches);
permission!(PermUserBranchesCreate, Create, UserBranches);
permission!(PermUserBranchesDelete, Delete, UserBranches);
