//! Repositório em memória para testes determinísticos.
//!
//! Implementa as três portas (`BranchRepository`, `WarehouseRepository`,
//! `UserRepository`) com as mesmas regras de empresa das consultas SQL, sem
//! precisar de um Postgres rodando. Clones compartilham o mesmo estado.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    common::error::AppError,
    db::repositories::{BranchRepository, UserRepository, WarehouseRepository},
    middleware::tenancy::TenantContext,
    models::{
        branch::{Branch, BranchChanges, BranchUser, NewBranch, UserBranchLink},
        warehouse::{BranchWarehouseLink, NewWarehouse, Warehouse, WarehouseChanges},
    },
};

#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_branch_id: i32,
    last_warehouse_id: i32,
    branches: BTreeMap<i32, Branch>,
    warehouses: BTreeMap<i32, Warehouse>,
    // id do usuário -> (empresa, usuário)
    users: BTreeMap<i32, (i32, BranchUser)>,
    user_links: BTreeSet<UserBranchLink>,
    warehouse_links: BTreeSet<BranchWarehouseLink>,
}

impl MemoryState {
    fn branch_in(&self, tenant: &TenantContext, branch_id: i32) -> Option<&Branch> {
        self.branches
            .get(&branch_id)
            .filter(|b| b.company_id == tenant.company_id())
    }

    fn warehouse_in(&self, tenant: &TenantContext, warehouse_id: i32) -> Option<&Warehouse> {
        self.warehouses
            .get(&warehouse_id)
            .filter(|w| w.company_id == tenant.company_id())
    }
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cadastra um usuário "externo" numa empresa.
    pub fn add_user(&self, company_id: i32, user: BranchUser) {
        self.state().users.insert(user.id, (company_id, user));
    }

    /// Total de almacenes de todas as empresas.
    pub fn warehouse_count(&self) -> usize {
        self.state().warehouses.len()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        // Um teste que entrou em pânico segurando o lock não invalida o estado.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl BranchRepository for MemoryRepository {
    async fn list(&self, tenant: &TenantContext) -> Result<Vec<Branch>, AppError> {
        let state = self.state();
        Ok(state
            .branches
            .values()
            .filter(|b| b.company_id == tenant.company_id())
            .cloned()
            .collect())
    }

    async fn find(&self, tenant: &TenantContext, branch_id: i32) -> Result<Option<Branch>, AppError> {
        Ok(self.state().branch_in(tenant, branch_id).cloned())
    }

    async fn create(&self, tenant: &TenantContext, new_branch: &NewBranch) -> Result<Branch, AppError> {
        let mut state = self.state();
        state.last_branch_id += 1;
        let branch = Branch {
            id: state.last_branch_id,
            name: new_branch.name.clone(),
            address: new_branch.address.clone(),
            phone: new_branch.phone.clone(),
            active: new_branch.active,
            created_at: Utc::now(),
            company_id: tenant.company_id(),
        };
        state.branches.insert(branch.id, branch.clone());
        Ok(branch)
    }

    async fn update(
        &self,
        tenant: &TenantContext,
        branch_id: i32,
        changes: &BranchChanges,
    ) -> Result<Option<Branch>, AppError> {
        let mut state = self.state();
        let branch = state
            .branches
            .get_mut(&branch_id)
            .filter(|b| b.company_id == tenant.company_id());
        Ok(branch.map(|b| {
            changes.apply_to(b);
            b.clone()
        }))
    }

    async fn deactivate(&self, tenant: &TenantContext, branch_id: i32) -> Result<bool, AppError> {
        let mut state = self.state();
        match state
            .branches
            .get_mut(&branch_id)
            .filter(|b| b.company_id == tenant.company_id())
        {
            Some(branch) => {
                branch.active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn assign_user(
        &self,
        tenant: &TenantContext,
        branch_id: i32,
        user_id: i32,
    ) -> Result<UserBranchLink, AppError> {
        let mut state = self.state();
        if state.branch_in(tenant, branch_id).is_none() {
            return Err(AppError::BranchNotOwned);
        }
        let link = UserBranchLink { user_id, branch_id };
        if !state.user_links.insert(link) {
            return Err(AppError::AssignmentAlreadyExists);
        }
        Ok(link)
    }

    async fn remove_user(
        &self,
        tenant: &TenantContext,
        branch_id: i32,
        user_id: i32,
    ) -> Result<bool, AppError> {
        let mut state = self.state();
        if state.branch_in(tenant, branch_id).is_none() {
            return Ok(false);
        }
        Ok(state.user_links.remove(&UserBranchLink { user_id, branch_id }))
    }

    async fn list_warehouses(
        &self,
        tenant: &TenantContext,
        branch_id: i32,
    ) -> Result<Vec<Warehouse>, AppError> {
        let state = self.state();
        let mut warehouses: Vec<Warehouse> = state
            .warehouse_links
            .iter()
            .filter(|link| link.branch_id == branch_id)
            .filter_map(|link| state.warehouse_in(tenant, link.warehouse_id).cloned())
            .collect();
        warehouses.sort_by_key(|w| w.id);
        Ok(warehouses)
    }
}

#[async_trait]
impl WarehouseRepository for MemoryRepository {
    async fn list(&self, tenant: &TenantContext) -> Result<Vec<Warehouse>, AppError> {
        let state = self.state();
        Ok(state
            .warehouses
            .values()
            .filter(|w| w.company_id == tenant.company_id())
            .cloned()
            .collect())
    }

    async fn find(
        &self,
        tenant: &TenantContext,
        warehouse_id: i32,
    ) -> Result<Option<Warehouse>, AppError> {
        Ok(self.state().warehouse_in(tenant, warehouse_id).cloned())
    }

    async fn create_linked(
        &self,
        tenant: &TenantContext,
        new_warehouse: &NewWarehouse,
        branch_id: i32,
    ) -> Result<Warehouse, AppError> {
        let mut state = self.state();
        // Mesma regra da transação: sem sucursal da empresa, nada é gravado.
        if state.branch_in(tenant, branch_id).is_none() {
            return Err(AppError::BranchNotOwned);
        }

        state.last_warehouse_id += 1;
        let warehouse = Warehouse {
            id: state.last_warehouse_id,
            name: new_warehouse.name.clone(),
            description: new_warehouse.description.clone(),
            is_primary: new_warehouse.is_primary,
            active: new_warehouse.active,
            created_at: Utc::now(),
            company_id: tenant.company_id(),
        };
        state.warehouses.insert(warehouse.id, warehouse.clone());
        state.warehouse_links.insert(BranchWarehouseLink {
            branch_id,
            warehouse_id: warehouse.id,
        });
        Ok(warehouse)
    }

    async fn update(
        &self,
        tenant: &TenantContext,
        warehouse_id: i32,
        changes: &WarehouseChanges,
    ) -> Result<Option<Warehouse>, AppError> {
        let mut state = self.state();
        let warehouse = state
            .warehouses
            .get_mut(&warehouse_id)
            .filter(|w| w.company_id == tenant.company_id());
        Ok(warehouse.map(|w| {
            changes.apply_to(w);
            w.clone()
        }))
    }

    async fn deactivate(&self, tenant: &TenantContext, warehouse_id: i32) -> Result<bool, AppError> {
        let mut state = self.state();
        match state
            .warehouses
            .get_mut(&warehouse_id)
            .filter(|w| w.company_id == tenant.company_id())
        {
            Some(warehouse) => {
                warehouse.active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn link_branch(
        &self,
        tenant: &TenantContext,
        warehouse_id: i32,
        branch_id: i32,
    ) -> Result<BranchWarehouseLink, AppError> {
        let mut state = self.state();
        if state.warehouse_in(tenant, warehouse_id).is_none()
            || state.branch_in(tenant, branch_id).is_none()
        {
            return Err(AppError::BranchNotOwned);
        }
        let link = BranchWarehouseLink { branch_id, warehouse_id };
        if !state.warehouse_links.insert(link) {
            return Err(AppError::LinkAlreadyExists);
        }
        Ok(link)
    }

    async fn unlink_branch(
        &self,
        tenant: &TenantContext,
        warehouse_id: i32,
        branch_id: i32,
    ) -> Result<bool, AppError> {
        let mut state = self.state();
        if state.warehouse_in(tenant, warehouse_id).is_none() {
            return Ok(false);
        }
        Ok(state
            .warehouse_links
            .remove(&BranchWarehouseLink { branch_id, warehouse_id }))
    }

    async fn list_branches(
        &self,
        tenant: &TenantContext,
        warehouse_id: i32,
    ) -> Result<Vec<Branch>, AppError> {
        let state = self.state();
        let mut branches: Vec<Branch> = state
            .warehouse_links
            .iter()
            .filter(|link| link.warehouse_id == warehouse_id)
            .filter_map(|link| state.branch_in(tenant, link.branch_id).cloned())
            .collect();
        branches.sort_by_key(|b| b.id);
        Ok(branches)
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn exists_in_company(&self, tenant: &TenantContext, user_id: i32) -> Result<bool, AppError> {
        Ok(self
            .state()
            .users
            .get(&user_id)
            .is_some_and(|(company_id, _)| *company_id == tenant.company_id()))
    }

    async fn list_by_branch(
        &self,
        tenant: &TenantContext,
        branch_id: i32,
    ) -> Result<Vec<BranchUser>, AppError> {
        let state = self.state();
        let mut users: Vec<BranchUser> = state
            .user_links
            .iter()
            .filter(|link| link.branch_id == branch_id)
            .filter_map(|link| state.users.get(&link.user_id))
            .filter(|(company_id, _)| *company_id == tenant.company_id())
            .map(|(_, user)| user.clone())
            .collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::CurrentUser;

    fn tenant(company_id: i32) -> TenantContext {
        TenantContext::from(&CurrentUser { user_id: 1, company_id })
    }

    fn new_branch(name: &str) -> NewBranch {
        NewBranch { name: name.into(), address: "Calle 1".into(), phone: None, active: true }
    }

    #[tokio::test]
    async fn lookups_never_cross_companies() {
        let repo = MemoryRepository::new();
        let branch = BranchRepository::create(&repo, &tenant(1), &new_branch("Centro"))
            .await
            .unwrap();

        assert!(BranchRepository::find(&repo, &tenant(2), branch.id).await.unwrap().is_none());
        assert!(BranchRepository::list(&repo, &tenant(2)).await.unwrap().is_empty());
        assert!(!BranchRepository::deactivate(&repo, &tenant(2), branch.id).await.unwrap());
    }

    #[tokio::test]
    async fn create_linked_writes_nothing_for_a_foreign_branch() {
        let repo = MemoryRepository::new();
        let branch = BranchRepository::create(&repo, &tenant(1), &new_branch("Centro"))
            .await
            .unwrap();
        let new_warehouse = NewWarehouse {
            name: "Bodega".into(),
            description: None,
            is_primary: false,
            active: true,
        };

        let err = repo
            .create_linked(&tenant(2), &new_warehouse, branch.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BranchNotOwned));
        assert_eq!(repo.warehouse_count(), 0);
    }
}
