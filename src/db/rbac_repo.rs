// src/db/rbac_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    middleware::{
        auth::CurrentUser,
        rbac::{Action, PermissionGate, Resource},
    },
};

/// Consulta o motor de permissões externo pela view que ele publica.
#[derive(Clone)]
pub struct RbacRepository {
    pool: PgPool,
}

impl RbacRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionGate for RbacRepository {
    async fn authorize(
        &self,
        user: &CurrentUser,
        action: Action,
        resource: Resource,
    ) -> Result<bool, AppError> {
        let allowed: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM v_permisos_usuario p
                WHERE p.usuario_id = $1
                  AND p.accion = $2
                  AND p.recurso = $3
            )
            "#,
        )
        .bind(user.user_id)
        .bind(action.as_str())
        .bind(resource.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(allowed)
    }
}
