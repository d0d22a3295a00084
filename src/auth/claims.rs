use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Purpose of a token: a plain login session or a short-lived password
/// reset. A reset token must never be accepted where a session is required.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Session,
    PasswordReset,
}

/// JWT payload. Tokens are self-contained and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,            // user ID
    pub iat: usize,           // issued at (unix timestamp)
    pub exp: usize,           // expires at (unix timestamp)
    pub purpose: TokenPurpose // session or password_reset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purpose_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TokenPurpose::PasswordReset).unwrap(),
            "\"password_reset\""
        );
        assert_eq!(
            serde_json::to_string(&TokenPurpose::Session).unwrap(),
            "\"session\""
        );
    }
}
