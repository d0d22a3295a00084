use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRef, FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::jwt::JwtKeys;
use crate::error::AuthError;

/// Json body extractor that reports failures (malformed JSON, missing or
/// mistyped fields) as the enveloped 400 the rest of the API speaks,
/// instead of axum's plain-text 422 rejection.
#[derive(Debug)]
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AuthError::validation("body", e.body_text()))?;
        Ok(Self(value))
    }
}

/// Authorization gate for protected routes: extracts the bearer token,
/// verifies it as a session token and yields the subject identifier.
/// Expired tokens are rejected distinctly so clients know to re-login.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::InvalidToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or(AuthError::InvalidToken)?;

        let claims = keys.verify_session(token).map_err(|e| {
            warn!("bearer token rejected: {e}");
            e
        })?;

        Ok(AuthUser(claims.sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::dto::RegisterRequest;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    fn json_request(body: &'static str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/api/auth/register")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn missing_required_field_is_an_enveloped_400() {
        let req = json_request(r#"{"email": "ann@gmail.com"}"#);
        let err = AppJson::<RegisterRequest>::from_request(req, &())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation { field: "body", .. }));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("application/json"));
    }

    #[tokio::test]
    async fn malformed_json_is_an_enveloped_400() {
        let req = json_request("not json at all");
        let err = AppJson::<RegisterRequest>::from_request(req, &())
            .await
            .unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn well_formed_body_deserializes() {
        let req = json_request(
            r#"{
                "firstName": "Ann",
                "lastName": "Lee",
                "email": "ann@gmail.com",
                "mobile": "9876543210",
                "age": 25,
                "password": "Abcd123!",
                "confirmPassword": "Abcd123!",
                "termsAccepted": true
            }"#,
        );
        let AppJson(parsed) = AppJson::<RegisterRequest>::from_request(req, &())
            .await
            .expect("valid body");
        assert_eq!(parsed.first_name, "Ann");
        assert!(parsed.terms_accepted);
    }
}
