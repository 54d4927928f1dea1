use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Erros de domínio. A tradução para HTTP acontece em `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Corpo da requisição inválido: {0}")]
    InvalidBody(String),

    #[error("Parâmetro de rota inválido: {0}")]
    InvalidPath(String),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Permissão negada: {0}")]
    Forbidden(String),

    #[error("Sucursal não encontrada")]
    BranchNotFound,

    #[error("Sucursal não encontrada na empresa")]
    BranchNotFoundInCompany,

    #[error("Sucursal não pertence à empresa")]
    BranchNotOwned,

    #[error("Sucursal do corpo diferente da rota")]
    BranchPathMismatch,

    #[error("Almacén não encontrado")]
    WarehouseNotFound,

    #[error("Almacén não encontrado na empresa")]
    WarehouseNotFoundInCompany,

    #[error("Almacén não pertence à empresa")]
    WarehouseNotOwned,

    #[error("Usuário não pertence à empresa")]
    UserNotOwned,

    #[error("Atribuição usuário-sucursal não encontrada")]
    AssignmentNotFound,

    #[error("Usuário já atribuído à sucursal")]
    AssignmentAlreadyExists,

    #[error("Vínculo sucursal-almacén não encontrado")]
    LinkNotFound,

    #[error("Vínculo sucursal-almacén já existe")]
    LinkAlreadyExists,

    // Variante para erros de banco de dados (exemplo com sqlx)
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

}

/// O erro que efetivamente vai para o cliente.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    fn status_and_key(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "errors.validation"),
            AppError::InvalidBody(_) => (StatusCode::BAD_REQUEST, "errors.invalid_body"),
            AppError::InvalidPath(_) => (StatusCode::BAD_REQUEST, "errors.invalid_path"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "errors.invalid_token"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "errors.forbidden"),
            AppError::BranchNotFound => (StatusCode::NOT_FOUND, "errors.branch_not_found"),
            AppError::BranchNotFoundInCompany => {
                (StatusCode::NOT_FOUND, "errors.branch_not_found_in_company")
            }
            AppError::BranchNotOwned => (StatusCode::BAD_REQUEST, "errors.branch_not_owned"),
            AppError::BranchPathMismatch => {
                (StatusCode::BAD_REQUEST, "errors.branch_path_mismatch")
            }
            AppError::WarehouseNotFound => (StatusCode::NOT_FOUND, "errors.warehouse_not_found"),
            AppError::WarehouseNotFoundInCompany => {
                (StatusCode::NOT_FOUND, "errors.warehouse_not_found_in_company")
            }
            AppError::WarehouseNotOwned => (StatusCode::BAD_REQUEST, "errors.warehouse_not_owned"),
            AppError::UserNotOwned => (StatusCode::BAD_REQUEST, "errors.user_not_owned"),
            AppError::AssignmentNotFound => (StatusCode::NOT_FOUND, "errors.assignment_not_found"),
            AppError::AssignmentAlreadyExists => {
                (StatusCode::CONFLICT, "errors.assignment_already_exists")
            }
            AppError::LinkNotFound => (StatusCode::NOT_FOUND, "errors.link_not_found"),
            AppError::LinkAlreadyExists => (StatusCode::CONFLICT, "errors.link_already_exists"),
            AppError::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "errors.internal"),
        }
    }

    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let (status, key) = self.status_and_key();
        let lang = locale.0.as_str();

        match self {
            AppError::ValidationError(errors) => {
                // Retorna todos os detalhes da validação, já traduzidos.
                let mut details = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            let code_key = format!("validation.{}", e.code);
                            if store.has_key(lang, &code_key) || store.has_key("en", &code_key) {
                                store.translate(lang, &code_key)
                            } else {
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            }
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                ApiError {
                    status,
                    error: store.translate(lang, key),
                    details: Some(json!(details)),
                }
            }
            // O texto do serde vai em `details`, no formato dos erros de validação.
            AppError::InvalidBody(reason) => ApiError {
                status,
                error: store.translate(lang, key),
                details: Some(json!({ "body": [reason] })),
            },
            AppError::InvalidPath(reason) => ApiError {
                status,
                error: store.translate(lang, key),
                details: Some(json!({ "path": [reason] })),
            },
            AppError::Forbidden(permission) => ApiError {
                status,
                error: store.translate_with(lang, key, &[("permission", permission.as_str())]),
                details: None,
            },
            AppError::DatabaseError(e) => {
                // O detalhe fica no log; o cliente recebe só a mensagem genérica.
                tracing::error!("Erro Interno do Servidor: {}", e);
                ApiError {
                    status,
                    error: store.translate(lang, key),
                    details: None,
                }
            }
            _ => ApiError {
                status,
                error: store.translate(lang, key),
                details: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> I18nStore {
        I18nStore::load().unwrap()
    }

    #[test]
    fn tenant_errors_map_to_the_expected_status() {
        let store = store();
        let en = Locale("en".into());

        assert_eq!(AppError::BranchNotFound.to_api_error(&en, &store).status, StatusCode::NOT_FOUND);
        assert_eq!(AppError::BranchNotOwned.to_api_error(&en, &store).status, StatusCode::BAD_REQUEST);
        assert_eq!(AppError::LinkAlreadyExists.to_api_error(&en, &store).status, StatusCode::CONFLICT);
        assert_eq!(
            AppError::Forbidden("delete:almacenes".into()).to_api_error(&en, &store).status,
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn rejected_bodies_and_paths_are_bad_requests() {
        let store = store();
        let en = Locale("en".into());

        let api = AppError::InvalidBody("missing field `sucursal_id`".into()).to_api_error(&en, &store);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.details, Some(json!({ "body": ["missing field `sucursal_id`"] })));

        let api = AppError::InvalidPath("Cannot parse `abc`".into()).to_api_error(&en, &store);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.error, "Invalid path parameter.");
    }

    #[test]
    fn messages_follow_the_locale() {
        let store = store();
        let api = AppError::WarehouseNotFound.to_api_error(&Locale("es".into()), &store);
        assert_eq!(api.error, "Almacén no encontrado");
    }

    #[test]
    fn database_errors_hide_the_cause() {
        let store = store();
        let api = AppError::DatabaseError(sqlx::Error::PoolTimedOut)
            .to_api_error(&Locale("en".into()), &store);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "An unexpected error occurred.");
    }
}
