// src/middleware/payload.rs

use axum::{
    extract::{FromRef, FromRequest, FromRequestParts, Path, Request},
    http::{header, request::Parts},
    Json,
};
use serde::de::DeserializeOwned;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
};

// Extratores de corpo e rota: a rejeição do axum vira o mesmo `{error, details}`
// 400 dos erros de validação, traduzido.

pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // O corpo é consumido pelo Json, então o idioma é lido antes.
        let locale = req
            .headers()
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                let app_state = AppState::from_ref(state);
                tracing::debug!("Corpo rejeitado: {}", rejection.body_text());
                Err(AppError::InvalidBody(rejection.body_text())
                    .to_api_error(&locale, &app_state.i18n_store))
            }
        }
    }
}

pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ApiPath(value)),
            Err(rejection) => {
                let app_state = AppState::from_ref(state);
                let locale = Locale::from_request_parts(parts, state)
                    .await
                    .unwrap_or_default();
                Err(AppError::InvalidPath(rejection.body_text())
                    .to_api_error(&locale, &app_state.i18n_store))
            }
        }
    }
}
