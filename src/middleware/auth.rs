use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
};

// Estrutura de dados ("claims") dentro do JWT emitido pelo serviço de autenticação
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,        // Subject (ID do usuário)
    pub empresa_id: i32, // Empresa (tenant) do usuário
    pub exp: usize,      // Expiration time
    pub iat: usize,      // Issued At
}

/// Quem está chamando. Só é criado a partir de um token válido.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: i32,
    pub company_id: i32,
}

pub fn verify_token(token: &str, jwt_secret: &str) -> Result<CurrentUser, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidToken)?;

    Ok(CurrentUser {
        user_id: token_data.claims.sub,
        company_id: token_data.claims.empresa_id,
    })
}

// O middleware em si
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer
        .map_err(|_| AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))?;

    let user = verify_token(bearer.token(), &app_state.jwt_secret)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Insere o usuário nos "extensions" da requisição
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
pub struct AuthenticatedUser(pub CurrentUser);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(AuthenticatedUser(user.clone()));
        }

        // Rota montada sem o auth_guard
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_request_parts(parts, state)
            .await
            .unwrap_or_default();
        Err(AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, exp: usize) -> String {
        let claims = Claims { sub: 12, empresa_id: 3, exp, iat: 0 };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn in_one_hour() -> usize {
        (chrono::Utc::now().timestamp() + 3600) as usize
    }

    #[test]
    fn valid_token_yields_user_and_company() {
        let user = verify_token(&token("segredo", in_one_hour()), "segredo").unwrap();
        assert_eq!(user, CurrentUser { user_id: 12, company_id: 3 });
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let err = verify_token(&token("outro", in_one_hour()), "segredo").unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn expired_token_is_rejected() {
        let err = verify_token(&token("segredo", 1_000), "segredo").unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }
}
