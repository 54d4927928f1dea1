// src/db/repositories.rs
//
// Portas de persistência. Todo método recebe o `TenantContext`: não existe
// consulta sem filtro por empresa.

use async_trait::async_trait;

use crate::{
    common::error::AppError,
    middleware::tenancy::TenantContext,
    models::{
        branch::{Branch, BranchChanges, BranchUser, NewBranch, UserBranchLink},
        warehouse::{BranchWarehouseLink, NewWarehouse, Warehouse, WarehouseChanges},
    },
};

#[async_trait]
pub trait BranchRepository: Send + Sync {
    async fn list(&self, tenant: &TenantContext) -> Result<Vec<Branch>, AppError>;

    async fn find(&self, tenant: &TenantContext, branch_id: i32) -> Result<Option<Branch>, AppError>;

    async fn create(&self, tenant: &TenantContext, new_branch: &NewBranch) -> Result<Branch, AppError>;

    async fn update(
        &self,
        tenant: &TenantContext,
        branch_id: i32,
        changes: &BranchChanges,
    ) -> Result<Option<Branch>, AppError>;

    /// Exclusão lógica (`estado = false`). Retorna `false` se a linha não existe na empresa.
    async fn deactivate(&self, tenant: &TenantContext, branch_id: i32) -> Result<bool, AppError>;

    /// Falha com `AssignmentAlreadyExists` se o par já existe.
    async fn assign_user(
        &self,
        tenant: &TenantContext,
        branch_id: i32,
        user_id: i32,
    ) -> Result<UserBranchLink, AppError>;

    async fn remove_user(
        &self,
        tenant: &TenantContext,
        branch_id: i32,
        user_id: i32,
    ) -> Result<bool, AppError>;

    async fn list_warehouses(
        &self,
        tenant: &TenantContext,
        branch_id: i32,
    ) -> Result<Vec<Warehouse>, AppError>;
}

#[async_trait]
pub trait WarehouseRepository: Send + Sync {
    async fn list(&self, tenant: &TenantContext) -> Result<Vec<Warehouse>, AppError>;

    async fn find(
        &self,
        tenant: &TenantContext,
        warehouse_id: i32,
    ) -> Result<Option<Warehouse>, AppError>;

    /// Cria o almacén e o vínculo com a sucursal na mesma unidade de trabalho.
    async fn create_linked(
        &self,
        tenant: &TenantContext,
        new_warehouse: &NewWarehouse,
        branch_id: i32,
    ) -> Result<Warehouse, AppError>;

    async fn update(
        &self,
        tenant: &TenantContext,
        warehouse_id: i32,
        changes: &WarehouseChanges,
    ) -> Result<Option<Warehouse>, AppError>;

    async fn deactivate(&self, tenant: &TenantContext, warehouse_id: i32) -> Result<bool, AppError>;

    /// Falha com `LinkAlreadyExists` se o par já existe.
    async fn link_branch(
        &self,
        tenant: &TenantContext,
        warehouse_id: i32,
        branch_id: i32,
    ) -> Result<BranchWarehouseLink, AppError>;

    async fn unlink_branch(
        &self,
        tenant: &TenantContext,
        warehouse_id: i32,
        branch_id: i32,
    ) -> Result<bool, AppError>;

    async fn list_branches(
        &self,
        tenant: &TenantContext,
        warehouse_id: i32,
    ) -> Result<Vec<Branch>, AppError>;
}

/// Leitura da tabela `usuarios`, que pertence a outro serviço.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn exists_in_company(&self, tenant: &TenantContext, user_id: i32) -> Result<bool, AppError>;

    async fn list_by_branch(
        &self,
        tenant: &TenantContext,
        branch_id: i32,
    ) -> Result<Vec<BranchUser>, AppError>;
}
