// src/services/branch_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::repositories::{BranchRepository, UserRepository},
    middleware::tenancy::TenantContext,
    models::{
        branch::{Branch, BranchChanges, BranchUser, NewBranch, UserBranchLink},
        warehouse::Warehouse,
    },
};

#[derive(Clone)]
pub struct BranchService {
    branch_repo: Arc<dyn BranchRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl BranchService {
    pub fn new(branch_repo: Arc<dyn BranchRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        Self { branch_repo, user_repo }
    }

    pub async fn list(&self, tenant: &TenantContext) -> Result<Vec<Branch>, AppError> {
        self.branch_repo.list(tenant).await
    }

    pub async fn get(&self, tenant: &TenantContext, branch_id: i32) -> Result<Branch, AppError> {
        self.branch_repo
            .find(tenant, branch_id)
            .await?
            .ok_or(AppError::BranchNotFound)
    }

    pub async fn create(
        &self,
        tenant: &TenantContext,
        new_branch: NewBranch,
        warehouse_id: Option<i32>,
    ) -> Result<Branch, AppError> {
        if let Some(warehouse_id) = warehouse_id {
            // `almacen_id` é aceito mas não vincula nada; fica só o aviso no log.
            tracing::warn!(
                company_id = tenant.company_id(),
                warehouse_id,
                "almacen_id recebido na criação de sucursal e ignorado"
            );
        }

        let branch = self.branch_repo.create(tenant, &new_branch).await?;
        tracing::info!(company_id = tenant.company_id(), branch_id = branch.id, "Sucursal criada");
        Ok(branch)
    }

    pub async fn update(
        &self,
        tenant: &TenantContext,
        branch_id: i32,
        changes: BranchChanges,
    ) -> Result<Branch, AppError> {
        self.branch_repo
            .update(tenant, branch_id, &changes)
            .await?
            .ok_or(AppError::BranchNotFound)
    }

    /// LÓGICA DE NEGÓCIO: exclusão lógica. Repetir a chamada continua dando certo.
    pub async fn deactivate(&self, tenant: &TenantContext, branch_id: i32) -> Result<(), AppError> {
        if !self.branch_repo.deactivate(tenant, branch_id).await? {
            return Err(AppError::BranchNotFound);
        }
        tracing::info!(company_id = tenant.company_id(), branch_id, "Sucursal desativada");
        Ok(())
    }

    pub async fn list_users(
        &self,
        tenant: &TenantContext,
        branch_id: i32,
    ) -> Result<Vec<BranchUser>, AppError> {
        self.ensure_in_company(tenant, branch_id).await?;
        self.user_repo.list_by_branch(tenant, branch_id).await
    }

    /// Atribui um usuário à sucursal; os dois precisam ser da empresa do chamador.
    pub async fn assign_user(
        &self,
        tenant: &TenantContext,
        branch_id: i32,
        user_id: i32,
        body_branch_id: Option<i32>,
    ) -> Result<UserBranchLink, AppError> {
        if body_branch_id.is_some_and(|id| id != branch_id) {
            return Err(AppError::BranchPathMismatch);
        }

        // 1. Sucursal da empresa (400, não 404: é uma referência do payload)
        if self.branch_repo.find(tenant, branch_id).await?.is_none() {
            return Err(AppError::BranchNotOwned);
        }

        // 2. Usuário da mesma empresa
        if !self.user_repo.exists_in_company(tenant, user_id).await? {
            return Err(AppError::UserNotOwned);
        }

        // 3. Cria a atribuição
        let link = self.branch_repo.assign_user(tenant, branch_id, user_id).await?;
        tracing::info!(company_id = tenant.company_id(), branch_id, user_id, "Usuário atribuído à sucursal");
        Ok(link)
    }

    pub async fn remove_user(
        &self,
        tenant: &TenantContext,
        branch_id: i32,
        user_id: i32,
    ) -> Result<(), AppError> {
        self.ensure_in_company(tenant, branch_id).await?;

        if !self.branch_repo.remove_user(tenant, branch_id, user_id).await? {
            return Err(AppError::AssignmentNotFound);
        }
        tracing::info!(company_id = tenant.company_id(), branch_id, user_id, "Atribuição removida");
        Ok(())
    }

    pub async fn list_warehouses(
        &self,
        tenant: &TenantContext,
        branch_id: i32,
    ) -> Result<Vec<Warehouse>, AppError> {
        self.ensure_in_company(tenant, branch_id).await?;
        self.branch_repo.list_warehouses(tenant, branch_id).await
    }

    async fn ensure_in_company(&self, tenant: &TenantContext, branch_id: i32) -> Result<(), AppError> {
        match self.branch_repo.find(tenant, branch_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::BranchNotFoundInCompany),
        }
    }
}
