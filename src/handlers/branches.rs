// src/handlers/branches.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        payload::{ApiJson, ApiPath},
        rbac::{
            PermBranchWarehousesRead, PermBranchesCreate, PermBranchesDelete, PermBranchesRead,
            PermBranchesUpdate, PermUserBranchesCreate, PermUserBranchesDelete,
            PermUserBranchesRead, RequirePermission,
        },
        tenancy::TenantContext,
    },
    models::branch::{BranchChanges, CreateBranchPayload, NewBranch, UpdateBranchPayload},
};

// ---
// Payload: AssignUserPayload
// ---
#[derive(Debug, Deserialize)]
pub struct AssignUserPayload {
    #[serde(rename = "usuario_id", alias = "usuarios_id_usuario")]
    pub user_id: i32,

    // Se vier no corpo, tem que bater com o id da rota.
    #[serde(rename = "sucursales_id_sucursal", alias = "sucursal_id", default)]
    pub branch_id: Option<i32>,
}

// ---
// Handler: list_branches
// ---
pub async fn list_branches(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermBranchesRead>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let branches = app_state
        .branch_service
        .list(&tenant)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(branches)))
}

// ---
// Handler: get_branch
// ---
pub async fn get_branch(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermBranchesRead>,
    tenant: TenantContext,
    ApiPath(branch_id): ApiPath<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let branch = app_state
        .branch_service
        .get(&tenant, branch_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(branch)))
}

// ---
// Handler: create_branch
// ---
pub async fn create_branch(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermBranchesCreate>,
    tenant: TenantContext,
    ApiJson(payload): ApiJson<CreateBranchPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let warehouse_id = payload.almacen_id;
    let branch = app_state
        .branch_service
        .create(&tenant, NewBranch::from(payload), warehouse_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(branch)))
}

// ---
// Handler: update_branch (PATCH)
// ---
pub async fn update_branch(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermBranchesUpdate>,
    tenant: TenantContext,
    ApiPath(branch_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateBranchPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let branch = app_state
        .branch_service
        .update(&tenant, branch_id, BranchChanges::from(payload))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(branch)))
}

// ---
// Handler: delete_branch (exclusão lógica)
// ---
pub async fn delete_branch(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermBranchesDelete>,
    tenant: TenantContext,
    ApiPath(branch_id): ApiPath<i32>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .branch_service
        .deactivate(&tenant, branch_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Handlers: usuários da sucursal
// ---
pub async fn list_branch_users(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermUserBranchesRead>,
    tenant: TenantContext,
    ApiPath(branch_id): ApiPath<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let users = app_state
        .branch_service
        .list_users(&tenant, branch_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(users)))
}

pub async fn assign_branch_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermUserBranchesCreate>,
    tenant: TenantContext,
    ApiPath(branch_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<AssignUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let link = app_state
        .branch_service
        .assign_user(&tenant, branch_id, payload.user_id, payload.branch_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(link)))
}

pub async fn remove_branch_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermUserBranchesDelete>,
    tenant: TenantContext,
    ApiPath((branch_id, user_id)): ApiPath<(i32, i32)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .branch_service
        .remove_user(&tenant, branch_id, user_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Handler: almacenes da sucursal
// ---
pub async fn list_branch_warehouses(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermBranchWarehousesRead>,
    tenant: TenantContext,
    ApiPath(branch_id): ApiPath<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let warehouses = app_state
        .branch_service
        .list_warehouses(&tenant, branch_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(warehouses)))
}
