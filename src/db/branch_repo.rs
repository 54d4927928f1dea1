// src/db/branch_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::repositories::BranchRepository,
    middleware::tenancy::TenantContext,
    models::{
        branch::{Branch, BranchChanges, NewBranch, UserBranchLink},
        warehouse::Warehouse,
    },
};

// Colunas em espanhol -> campos do model
const BRANCH_COLUMNS: &str = "id_sucursal AS id, nombre AS name, direccion AS address, \
     telefono AS phone, estado AS active, fecha_creacion AS created_at, \
     empresas_id_empresa AS company_id";

#[derive(Clone)]
pub struct PgBranchRepository {
    pool: PgPool,
}

impl PgBranchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BranchRepository for PgBranchRepository {
    async fn list(&self, tenant: &TenantContext) -> Result<Vec<Branch>, AppError> {
        let sql = format!(
            "SELECT {} FROM sucursales WHERE empresas_id_empresa = $1 ORDER BY id_sucursal",
            BRANCH_COLUMNS
        );
        let branches = sqlx::query_as::<_, Branch>(&sql)
            .bind(tenant.company_id())
            .fetch_all(&self.pool)
            .await?;
        Ok(branches)
    }

    async fn find(&self, tenant: &TenantContext, branch_id: i32) -> Result<Option<Branch>, AppError> {
        let sql = format!(
            "SELECT {} FROM sucursales WHERE id_sucursal = $1 AND empresas_id_empresa = $2",
            BRANCH_COLUMNS
        );
        let branch = sqlx::query_as::<_, Branch>(&sql)
            .bind(branch_id)
            .bind(tenant.company_id())
            .fetch_optional(&self.pool)
            .await?;
        Ok(branch)
    }

    async fn create(&self, tenant: &TenantContext, new_branch: &NewBranch) -> Result<Branch, AppError> {
        let sql = format!(
            r#"
            INSERT INTO sucursales (nombre, direccion, telefono, estado, empresas_id_empresa)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            BRANCH_COLUMNS
        );
        let branch = sqlx::query_as::<_, Branch>(&sql)
            .bind(&new_branch.name)
            .bind(&new_branch.address)
            .bind(new_branch.phone.as_deref())
            .bind(new_branch.active)
            .bind(tenant.company_id())
            .fetch_one(&self.pool)
            .await?;
        Ok(branch)
    }

    async fn update(
        &self,
        tenant: &TenantContext,
        branch_id: i32,
        changes: &BranchChanges,
    ) -> Result<Option<Branch>, AppError> {
        // COALESCE mantém o valor atual quando o campo não foi enviado.
        // O telefone é anulável, então usa uma flag explícita de "veio no payload".
        let sql = format!(
            r#"
            UPDATE sucursales SET
                nombre = COALESCE($3, nombre),
                direccion = COALESCE($4, direccion),
                telefono = CASE WHEN $5 THEN $6 ELSE telefono END,
                estado = COALESCE($7, estado)
            WHERE id_sucursal = $1 AND empresas_id_empresa = $2
            RETURNING {}
            "#,
            BRANCH_COLUMNS
        );
        let branch = sqlx::query_as::<_, Branch>(&sql)
            .bind(branch_id)
            .bind(tenant.company_id())
            .bind(changes.name.as_deref())
            .bind(changes.address.as_deref())
            .bind(changes.phone.is_some())
            .bind(changes.phone.clone().flatten())
            .bind(changes.active)
            .fetch_optional(&self.pool)
            .await?;
        Ok(branch)
    }

    async fn deactivate(&self, tenant: &TenantContext, branch_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE sucursales SET estado = false WHERE id_sucursal = $1 AND empresas_id_empresa = $2",
        )
        .bind(branch_id)
        .bind(tenant.company_id())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn assign_user(
        &self,
        tenant: &TenantContext,
        branch_id: i32,
        user_id: i32,
    ) -> Result<UserBranchLink, AppError> {
        // O SELECT só devolve linha se a sucursal é da empresa.
        let result = sqlx::query(
            r#"
            INSERT INTO usuarios_sucursales (usuarios_id_usuario, sucursales_id_sucursal)
            SELECT $1, s.id_sucursal
            FROM sucursales s
            WHERE s.id_sucursal = $2 AND s.empresas_id_empresa = $3
            "#,
        )
        .bind(user_id)
        .bind(branch_id)
        .bind(tenant.company_id())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::AssignmentAlreadyExists;
                }
            }
            AppError::DatabaseError(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::BranchNotOwned);
        }
        Ok(UserBranchLink { user_id, branch_id })
    }

    async fn remove_user(
        &self,
        tenant: &TenantContext,
        branch_id: i32,
        user_id: i32,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM usuarios_sucursales us
            USING sucursales s
            WHERE s.id_sucursal = us.sucursales_id_sucursal
              AND s.empresas_id_empresa = $3
              AND us.sucursales_id_sucursal = $1
              AND us.usuarios_id_usuario = $2
            "#,
        )
        .bind(branch_id)
        .bind(user_id)
        .bind(tenant.company_id())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_warehouses(
        &self,
        tenant: &TenantContext,
        branch_id: i32,
    ) -> Result<Vec<Warehouse>, AppError> {
        let warehouses = sqlx::query_as::<_, Warehouse>(
            r#"
            SELECT
                a.id_almacen AS id,
                a.nombre AS name,
                a.descripcion AS description,
                a.es_principal AS is_primary,
                a.estado AS active,
                a.fecha_creacion AS created_at,
                a.empresas_id_empresa AS company_id
            FROM sucursales_almacenes sa
            JOIN almacenes a
              ON a.id_almacen = sa.almacenes_id_almacen
            WHERE sa.sucursales_id_sucursal = $1
              AND a.empresas_id_empresa = $2
            ORDER BY a.id_almacen
            "#,
        )
        .bind(branch_id)
        .bind(tenant.company_id())
        .fetch_all(&self.pool)
        .await?;
        Ok(warehouses)
    }
}
