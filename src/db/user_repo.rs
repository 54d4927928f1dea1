// src/db/user_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::repositories::UserRepository,
    middleware::tenancy::TenantContext,
    models::branch::BranchUser,
};

// Só leitura: a tabela `usuarios` é mantida pelo serviço de usuários.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn exists_in_company(&self, tenant: &TenantContext, user_id: i32) -> Result<bool, AppError> {
        // SELECT EXISTS: só queremos saber se a linha existe.
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM usuarios
                WHERE id_usuario = $1 AND empresas_id_empresa = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(tenant.company_id())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn list_by_branch(
        &self,
        tenant: &TenantContext,
        branch_id: i32,
    ) -> Result<Vec<BranchUser>, AppError> {
        let users = sqlx::query_as::<_, BranchUser>(
            r#"
            SELECT
                u.id_usuario AS id,
                u.nombre AS first_name,
                u.apellido AS last_name,
                u.email,
                u.es_dueno AS is_owner,
                u.estado AS active,
                u.fecha_creacion AS created_at
            FROM usuarios_sucursales us
            JOIN usuarios u
              ON u.id_usuario = us.usuarios_id_usuario
            WHERE us.sucursales_id_sucursal = $1
              AND u.empresas_id_empresa = $2
            ORDER BY u.id_usuario
            "#,
        )
        .bind(branch_id)
        .bind(tenant.company_id())
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}
