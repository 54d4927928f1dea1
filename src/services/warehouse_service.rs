// src/services/warehouse_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::repositories::{BranchRepository, WarehouseRepository},
    middleware::tenancy::TenantContext,
    models::{
        branch::Branch,
        warehouse::{BranchWarehouseLink, NewWarehouse, Warehouse, WarehouseChanges},
    },
};

#[derive(Clone)]
pub struct WarehouseService {
    warehouse_repo: Arc<dyn WarehouseRepository>,
    branch_repo: Arc<dyn BranchRepository>,
}

impl WarehouseService {
    pub fn new(
        warehouse_repo: Arc<dyn WarehouseRepository>,
        branch_repo: Arc<dyn BranchRepository>,
    ) -> Self {
        Self { warehouse_repo, branch_repo }
    }

    pub async fn list(&self, tenant: &TenantContext) -> Result<Vec<Warehouse>, AppError> {
        self.warehouse_repo.list(tenant).await
    }

    pub async fn get(&self, tenant: &TenantContext, warehouse_id: i32) -> Result<Warehouse, AppError> {
        self.warehouse_repo
            .find(tenant, warehouse_id)
            .await?
            .ok_or(AppError::WarehouseNotFound)
    }

    /// LÓGICA DE NEGÓCIO: cria o almacén já vinculado à sucursal que ele atende.
    /// Se a sucursal não é da empresa, nenhuma linha é gravada.
    pub async fn create(
        &self,
        tenant: &TenantContext,
        new_warehouse: NewWarehouse,
        branch_id: i32,
    ) -> Result<Warehouse, AppError> {
        // 1. Sucursal precisa pertencer à empresa
        if self.branch_repo.find(tenant, branch_id).await?.is_none() {
            return Err(AppError::BranchNotOwned);
        }

        // 2. Almacén + vínculo, atomicamente
        let warehouse = self
            .warehouse_repo
            .create_linked(tenant, &new_warehouse, branch_id)
            .await?;

        tracing::info!(
            company_id = tenant.company_id(),
            warehouse_id = warehouse.id,
            branch_id,
            "Almacén criado e vinculado"
        );
        Ok(warehouse)
    }

    pub async fn update(
        &self,
        tenant: &TenantContext,
        warehouse_id: i32,
        changes: WarehouseChanges,
    ) -> Result<Warehouse, AppError> {
        self.warehouse_repo
            .update(tenant, warehouse_id, &changes)
            .await?
            .ok_or(AppError::WarehouseNotFound)
    }

    pub async fn deactivate(&self, tenant: &TenantContext, warehouse_id: i32) -> Result<(), AppError> {
        if !self.warehouse_repo.deactivate(tenant, warehouse_id).await? {
            return Err(AppError::WarehouseNotFound);
        }
        tracing::info!(company_id = tenant.company_id(), warehouse_id, "Almacén desativado");
        Ok(())
    }

    pub async fn list_branches(
        &self,
        tenant: &TenantContext,
        warehouse_id: i32,
    ) -> Result<Vec<Branch>, AppError> {
        if self.warehouse_repo.find(tenant, warehouse_id).await?.is_none() {
            return Err(AppError::WarehouseNotFoundInCompany);
        }
        self.warehouse_repo.list_branches(tenant, warehouse_id).await
    }

    pub async fn link_branch(
        &self,
        tenant: &TenantContext,
        warehouse_id: i32,
        branch_id: i32,
    ) -> Result<BranchWarehouseLink, AppError> {
        // Aqui os dois ids são referências do chamador: ausência vira 400.
        if self.warehouse_repo.find(tenant, warehouse_id).await?.is_none() {
            return Err(AppError::WarehouseNotOwned);
        }
        if self.branch_repo.find(tenant, branch_id).await?.is_none() {
            return Err(AppError::BranchNotOwned);
        }

        let link = self
            .warehouse_repo
            .link_branch(tenant, warehouse_id, branch_id)
            .await?;
        tracing::info!(company_id = tenant.company_id(), warehouse_id, branch_id, "Vínculo criado");
        Ok(link)
    }

    pub async fn unlink_branch(
        &self,
        tenant: &TenantContext,
        warehouse_id: i32,
        branch_id: i32,
    ) -> Result<(), AppError> {
        if self.warehouse_repo.find(tenant, warehouse_id).await?.is_none() {
            return Err(AppError::WarehouseNotFoundInCompany);
        }
        if !self
            .warehouse_repo
            .unlink_branch(tenant, warehouse_id, branch_id)
            .await?
        {
            return Err(AppError::LinkNotFound);
        }
        tracing::info!(company_id = tenant.company_id(), warehouse_id, branch_id, "Vínculo removido");
        Ok(())
    }
}
