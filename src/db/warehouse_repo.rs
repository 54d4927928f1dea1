// src/db/warehouse_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::repositories::WarehouseRepository,
    middleware::tenancy::TenantContext,
    models::{
        branch::Branch,
        warehouse::{BranchWarehouseLink, NewWarehouse, Warehouse, WarehouseChanges},
    },
};

const WAREHOUSE_COLUMNS: &str = "id_almacen AS id, nombre AS name, descripcion AS description, \
     es_principal AS is_primary, estado AS active, fecha_creacion AS created_at, \
     empresas_id_empresa AS company_id";

#[derive(Clone)]
pub struct PgWarehouseRepository {
    pool: PgPool,
}

impl PgWarehouseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn link_conflict(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::LinkAlreadyExists;
        }
    }
    AppError::DatabaseError(e)
}

#[async_trait]
impl WarehouseRepository for PgWarehouseRepository {
    async fn list(&self, tenant: &TenantContext) -> Result<Vec<Warehouse>, AppError> {
        let sql = format!(
            "SELECT {} FROM almacenes WHERE empresas_id_empresa = $1 ORDER BY id_almacen",
            WAREHOUSE_COLUMNS
        );
        let warehouses = sqlx::query_as::<_, Warehouse>(&sql)
            .bind(tenant.company_id())
            .fetch_all(&self.pool)
            .await?;
        Ok(warehouses)
    }

    async fn find(
        &self,
        tenant: &TenantContext,
        warehouse_id: i32,
    ) -> Result<Option<Warehouse>, AppError> {
        let sql = format!(
            "SELECT {} FROM almacenes WHERE id_almacen = $1 AND empresas_id_empresa = $2",
            WAREHOUSE_COLUMNS
        );
        let warehouse = sqlx::query_as::<_, Warehouse>(&sql)
            .bind(warehouse_id)
            .bind(tenant.company_id())
            .fetch_optional(&self.pool)
            .await?;
        Ok(warehouse)
    }

    async fn create_linked(
        &self,
        tenant: &TenantContext,
        new_warehouse: &NewWarehouse,
        branch_id: i32,
    ) -> Result<Warehouse, AppError> {
        // 1. Inicia a transação
        // Se o vínculo falhar, o almacén criado acima é desfeito no drop do `tx`.
        let mut tx = self.pool.begin().await?;

        // 2. Cria o almacén
        let sql = format!(
            r#"
            INSERT INTO almacenes (nombre, descripcion, es_principal, estado, empresas_id_empresa)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            WAREHOUSE_COLUMNS
        );
        let warehouse = sqlx::query_as::<_, Warehouse>(&sql)
            .bind(&new_warehouse.name)
            .bind(new_warehouse.description.as_deref())
            .bind(new_warehouse.is_primary)
            .bind(new_warehouse.active)
            .bind(tenant.company_id())
            .fetch_one(&mut *tx)
            .await?;

        // 3. Cria o vínculo, conferindo de novo a empresa da sucursal dentro da transação
        let linked = sqlx::query(
            r#"
            INSERT INTO sucursales_almacenes (sucursales_id_sucursal, almacenes_id_almacen)
            SELECT s.id_sucursal, $2
            FROM sucursales s
            WHERE s.id_sucursal = $1 AND s.empresas_id_empresa = $3
            "#,
        )
        .bind(branch_id)
        .bind(warehouse.id)
        .bind(tenant.company_id())
        .execute(&mut *tx)
        .await
        .map_err(link_conflict)?;

        if linked.rows_affected() == 0 {
            return Err(AppError::BranchNotOwned);
        }

        // 4. Commit
        tx.commit().await?;
        Ok(warehouse)
    }

    async fn update(
        &self,
        tenant: &TenantContext,
        warehouse_id: i32,
        changes: &WarehouseChanges,
    ) -> Result<Option<Warehouse>, AppError> {
        let sql = format!(
            r#"
            UPDATE almacenes SET
                nombre = COALESCE($3, nombre),
                descripcion = CASE WHEN $4 THEN $5 ELSE descripcion END,
                es_principal = COALESCE($6, es_principal),
                estado = COALESCE($7, estado)
            WHERE id_almacen = $1 AND empresas_id_empresa = $2
            RETURNING {}
            "#,
            WAREHOUSE_COLUMNS
        );
        let warehouse = sqlx::query_as::<_, Warehouse>(&sql)
            .bind(warehouse_id)
            .bind(tenant.company_id())
            .bind(changes.name.as_deref())
            .bind(changes.description.is_some())
            .bind(changes.description.clone().flatten())
            .bind(changes.is_primary)
            .bind(changes.active)
            .fetch_optional(&self.pool)
            .await?;
        Ok(warehouse)
    }

    async fn deactivate(&self, tenant: &TenantContext, warehouse_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE almacenes SET estado = false WHERE id_almacen = $1 AND empresas_id_empresa = $2",
        )
        .bind(warehouse_id)
        .bind(tenant.company_id())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn link_branch(
        &self,
        tenant: &TenantContext,
        warehouse_id: i32,
        branch_id: i32,
    ) -> Result<BranchWarehouseLink, AppError> {
        // Os dois lados precisam ser da empresa; sem isso o SELECT não devolve linha.
        let result = sqlx::query(
            r#"
            INSERT INTO sucursales_almacenes (sucursales_id_sucursal, almacenes_id_almacen)
            SELECT s.id_sucursal, a.id_almacen
            FROM sucursales s
            JOIN almacenes a ON a.empresas_id_empresa = s.empresas_id_empresa
            WHERE s.id_sucursal = $1
              AND a.id_almacen = $2
              AND s.empresas_id_empresa = $3
            "#,
        )
        .bind(branch_id)
        .bind(warehouse_id)
        .bind(tenant.company_id())
        .execute(&self.pool)
        .await
        .map_err(link_conflict)?;

        if result.rows_affected() == 0 {
            return Err(AppError::BranchNotOwned);
        }
        Ok(BranchWarehouseLink { branch_id, warehouse_id })
    }

    async fn unlink_branch(
        &self,
        tenant: &TenantContext,
        warehouse_id: i32,
        branch_id: i32,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM sucursales_almacenes sa
            USING almacenes a
            WHERE a.id_almacen = sa.almacenes_id_almacen
              AND a.empresas_id_empresa = $3
              AND sa.almacenes_id_almacen = $1
              AND sa.sucursales_id_sucursal = $2
            "#,
        )
        .bind(warehouse_id)
        .bind(branch_id)
        .bind(tenant.company_id())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_branches(
        &self,
        tenant: &TenantContext,
        warehouse_id: i32,
    ) -> Result<Vec<Branch>, AppError> {
        let branches = sqlx::query_as::<_, Branch>(
            r#"
            SELECT
                s.id_sucursal AS id,
                s.nombre AS name,
                s.direccion AS address,
                s.telefono AS phone,
                s.estado AS active,
                s.fecha_creacion AS created_at,
                s.empresas_id_empresa AS company_id
            FROM sucursales_almacenes sa
            JOIN sucursales s
              ON s.id_sucursal = sa.sucursales_id_sucursal
            WHERE sa.almacenes_id_almacen = $1
              AND s.empresas_id_empresa = $2
            ORDER BY s.id_sucursal
            "#,
        )
        .bind(warehouse_id)
        .bind(tenant.company_id())
        .fetch_all(&self.pool)
        .await?;
        Ok(branches)
    }
}
