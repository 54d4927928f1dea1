// src/handlers/warehouses.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        payload::{ApiJson, ApiPath},
        rbac::{
            PermBranchWarehousesCreate, PermBranchWarehousesDelete, PermBranchWarehousesRead,
            PermWarehousesCreate, PermWarehousesDelete, PermWarehousesRead, PermWarehousesUpdate,
            RequirePermission,
        },
        tenancy::TenantContext,
    },
    models::warehouse::{
        CreateWarehousePayload, LinkBranchPayload, NewWarehouse, UpdateWarehousePayload,
        WarehouseChanges,
    },
};

pub async fn list_warehouses(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermWarehousesRead>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let warehouses = app_state
        .warehouse_service
        .list(&tenant)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(warehouses)))
}

pub async fn get_warehouse(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermWarehousesRead>,
    tenant: TenantContext,
    ApiPath(warehouse_id): ApiPath<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let warehouse = app_state
        .warehouse_service
        .get(&tenant, warehouse_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(warehouse)))
}

// ---
// Handler: create_warehouse
// ---
// Cria o almacén e o vínculo com a sucursal numa única transação.
pub async fn create_warehouse(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermWarehousesCreate>,
    tenant: TenantContext,
    ApiJson(payload): ApiJson<CreateWarehousePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let branch_id = payload
        .sucursal_id
        .ok_or(AppError::BranchNotOwned)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let warehouse = app_state
        .warehouse_service
        .create(&tenant, NewWarehouse::from(payload), branch_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(warehouse)))
}

pub async fn update_warehouse(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermWarehousesUpdate>,
    tenant: TenantContext,
    ApiPath(warehouse_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateWarehousePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let warehouse = app_state
        .warehouse_service
        .update(&tenant, warehouse_id, WarehouseChanges::from(payload))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(warehouse)))
}

pub async fn delete_warehouse(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermWarehousesDelete>,
    tenant: TenantContext,
    ApiPath(warehouse_id): ApiPath<i32>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .warehouse_service
        .deactivate(&tenant, warehouse_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Handlers: vínculos almacén <-> sucursal
// ---
pub async fn list_warehouse_branches(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermBranchWarehousesRead>,
    tenant: TenantContext,
    ApiPath(warehouse_id): ApiPath<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let branches = app_state
        .warehouse_service
        .list_branches(&tenant, warehouse_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(branches)))
}

pub async fn link_warehouse_branch(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermBranchWarehousesCreate>,
    tenant: TenantContext,
    ApiPath(warehouse_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<LinkBranchPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let link = app_state
        .warehouse_service
        .link_branch(&tenant, warehouse_id, payload.sucursal_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(link)))
}

pub async fn unlink_warehouse_branch(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermBranchWarehousesDelete>,
    tenant: TenantContext,
    ApiPath((warehouse_id, branch_id)): ApiPath<(i32, i32)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .warehouse_service
        .unlink_branch(&tenant, warehouse_id, branch_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
