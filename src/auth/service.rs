//! The account service: orchestrates registration, login, profile and
//! password flows over the record store, the hasher and the token keys.
//! All business invariants are enforced here; handlers only translate.

use axum::extract::FromRef;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::dto::{
    AuthResponse, ChangePasswordRequest, CheckEmailResponse, ForgotPasswordResponse,
    LoginRequest, ProfileResponse, RegisterRequest, ResetPasswordRequest, UpdateProfileRequest,
};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo_types::{NewUser, ProfilePatch, User};
use crate::auth::validate::{
    require_present, validate_age, validate_email, validate_mobile, validate_name,
    validate_password_pair, validate_terms,
};
use crate::error::AuthError;
use crate::state::AppState;

/// Registration input after fail-fast validation: normalized names, email
/// and mobile, ready to hash and persist.
#[derive(Debug)]
pub struct ValidatedRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: String,
    pub age: i32,
}

/// Applies the registration rules in order, stopping at the first
/// violation: presence of every required field, then terms, then the
/// per-field format rules. Pure; the uniqueness checks stay with the store.
pub fn validate_registration(
    req: &RegisterRequest,
    allowed_domain: Option<&str>,
) -> Result<ValidatedRegistration, AuthError> {
    require_present("firstName", &req.first_name)?;
    require_present("lastName", &req.last_name)?;
    require_present("email", &req.email)?;
    require_present("mobile", &req.mobile)?;
    require_present("password", &req.password)?;
    require_present("confirmPassword", &req.confirm_password)?;
    validate_terms(req.terms_accepted)?;
    validate_age(req.age)?;
    let email = validate_email(&req.email, allowed_domain)?;
    let mobile = validate_mobile(&req.mobile)?;
    let first_name = validate_name("firstName", &req.first_name)?;
    let last_name = validate_name("lastName", &req.last_name)?;
    validate_password_pair(&req.password, &req.confirm_password)?;
    Ok(ValidatedRegistration {
        first_name,
        last_name,
        email,
        mobile,
        age: req.age,
    })
}

pub async fn register(state: &AppState, req: RegisterRequest) -> Result<AuthResponse, AuthError> {
    let validated = validate_registration(&req, state.config.allowed_email_domain.as_deref())?;

    // Courtesy pre-checks for friendlier errors. The unique indexes remain
    // authoritative: a concurrent insert that slips past these still fails
    // with a duplicate error at create time.
    if User::find_by_email(&state.db, &validated.email).await?.is_some() {
        return Err(AuthError::Duplicate("email"));
    }
    if User::find_by_mobile(&state.db, &validated.mobile).await?.is_some() {
        return Err(AuthError::Duplicate("mobile"));
    }

    let password_hash = hash_password(&req.password)?;
    let candidate = NewUser {
        first_name: validated.first_name,
        last_name: validated.last_name,
        email: validated.email,
        mobile: validated.mobile,
        age: validated.age,
        password_hash,
    };
    let user = User::create(&state.db, &candidate).await?;

    let keys = JwtKeys::from_ref(state);
    let token = keys.sign_session(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(AuthResponse {
        success: true,
        message: "User registered successfully".into(),
        token,
        user: user.into(),
    })
}

pub async fn login(state: &AppState, req: LoginRequest) -> Result<AuthResponse, AuthError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AuthError::validation("email", "email and password are required"));
    }

    // Unknown email and wrong password produce the same error value so the
    // response never reveals which accounts exist.
    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    // Best effort; a failed stamp must not fail the login.
    if let Err(e) = User::touch_last_login(&state.db, user.id).await {
        warn!(error = %e, user_id = %user.id, "failed to stamp last login");
    }

    let keys = JwtKeys::from_ref(state);
    let token = keys.sign_session(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(AuthResponse {
        success: true,
        message: "Login successful".into(),
        token,
        user: user.into(),
    })
}

/// Pure read; no auth required and no side effects.
pub async fn check_email(state: &AppState, raw: &str) -> Result<CheckEmailResponse, AuthError> {
    let email = validate_email(raw, None)?;
    let exists = User::find_by_email(&state.db, &email).await?.is_some();
    Ok(CheckEmailResponse {
        success: true,
        exists,
        message: if exists {
            "Email already registered".into()
        } else {
            "Email is available".into()
        },
    })
}

/// The identifier has already been verified by the bearer-token gate.
pub async fn get_profile(state: &AppState, user_id: Uuid) -> Result<ProfileResponse, AuthError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(AuthError::NotFound)?;
    Ok(ProfileResponse {
        success: true,
        user: user.into(),
    })
}

/// Issues the reset token once the account lookup has resolved; a miss is
/// the not-found path.
fn issue_reset_token(
    keys: &JwtKeys,
    user: Option<User>,
) -> Result<ForgotPasswordResponse, AuthError> {
    let user = user.ok_or(AuthError::NotFound)?;
    let reset_token = keys.sign_reset(user.id)?;

    info!(user_id = %user.id, "password reset token issued");
    Ok(ForgotPasswordResponse {
        success: true,
        message: "Password reset token issued".into(),
        reset_token,
    })
}

/// Issues a short-lived reset token for an existing account. The token is
/// returned directly instead of emailed (deliberate scope limitation).
pub async fn forgot_password(
    state: &AppState,
    raw_email: &str,
) -> Result<ForgotPasswordResponse, AuthError> {
    let email = validate_email(raw_email, None)?;
    let keys = JwtKeys::from_ref(state);
    issue_reset_token(&keys, User::find_by_email(&state.db, &email).await?)
}

pub async fn reset_password(
    state: &AppState,
    req: ResetPasswordRequest,
) -> Result<(), AuthError> {
    let keys = JwtKeys::from_ref(state);
    let claims = keys.verify_reset(&req.token)?;

    validate_password_pair(&req.new_password, &req.confirm_password)?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or(AuthError::NotFound)?;

    let password_hash = hash_password(&req.new_password)?;
    User::set_password_hash(&state.db, user.id, &password_hash).await?;

    info!(user_id = %user.id, "password reset");
    Ok(())
}

pub async fn change_password(
    state: &AppState,
    user_id: Uuid,
    req: ChangePasswordRequest,
) -> Result<(), AuthError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(AuthError::NotFound)?;

    if !verify_password(&req.current_password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials);
    }
    if req.new_password == req.current_password {
        return Err(AuthError::validation(
            "newPassword",
            "must differ from the current password",
        ));
    }
    validate_password_pair(&req.new_password, &req.confirm_password)?;

    let password_hash = hash_password(&req.new_password)?;
    User::set_password_hash(&state.db, user.id, &password_hash).await?;

    info!(user_id = %user.id, "password changed");
    Ok(())
}

/// Revalidates each present field with the registration rules and leaves
/// absent fields untouched.
pub fn validate_profile_patch(req: &UpdateProfileRequest) -> Result<ProfilePatch, AuthError> {
    let mut patch = ProfilePatch::default();
    if let Some(first_name) = &req.first_name {
        patch.first_name = Some(validate_name("firstName", first_name)?);
    }
    if let Some(last_name) = &req.last_name {
        patch.last_name = Some(validate_name("lastName", last_name)?);
    }
    if let Some(age) = req.age {
        validate_age(age)?;
        patch.age = Some(age);
    }
    if let Some(url) = &req.profile_picture_url {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(AuthError::validation("profilePictureUrl", "must not be empty"));
        }
        patch.profile_picture_url = Some(trimmed.to_string());
    }
    Ok(patch)
}

pub async fn update_profile(
    state: &AppState,
    user_id: Uuid,
    req: UpdateProfileRequest,
) -> Result<ProfileResponse, AuthError> {
    let patch = validate_profile_patch(&req)?;
    let user = User::update_profile(&state.db, user_id, &patch).await?;
    info!(user_id = %user.id, "profile updated");
    Ok(ProfileResponse {
        success: true,
        user: user.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            email: "ann@gmail.com".into(),
            mobile: "9876543210".into(),
            age: 25,
            password_hash: "$argon2id$secret".into(),
            profile_picture_url: None,
            status: "active".into(),
            is_verified: false,
            terms_accepted: true,
            last_login_at: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    fn sample_register() -> RegisterRequest {
        RegisterRequest {
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            email: "ann@gmail.com".into(),
            mobile: "9876543210".into(),
            age: 25,
            password: "Abcd123!".into(),
            confirm_password: "Abcd123!".into(),
            terms_accepted: true,
        }
    }

    #[test]
    fn valid_registration_passes_and_normalizes() {
        let mut req = sample_register();
        req.email = " Ann@GMail.com ".into();
        req.mobile = "(987) 654-3210".into();
        req.first_name = "ann".into();
        let v = validate_registration(&req, None).expect("valid input");
        assert_eq!(v.email, "ann@gmail.com");
        assert_eq!(v.mobile, "9876543210");
        assert_eq!(v.first_name, "Ann");
        assert_eq!(v.last_name, "Lee");
        assert_eq!(v.age, 25);
    }

    #[test]
    fn underage_registration_is_rejected() {
        let mut req = sample_register();
        req.age = 10;
        let err = validate_registration(&req, None).unwrap_err();
        match err {
            AuthError::Validation { field, reason } => {
                assert_eq!(field, "age");
                assert_eq!(reason, "must be between 13 and 120");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn terms_must_be_accepted_before_other_rules_run() {
        let mut req = sample_register();
        req.terms_accepted = false;
        req.age = 10; // later rule; must not be the one reported
        let err = validate_registration(&req, None).unwrap_err();
        match err {
            AuthError::Validation { field, .. } => assert_eq!(field, "termsAccepted"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn absent_field_is_reported_before_terms() {
        let mut req = sample_register();
        req.first_name = "  ".into();
        req.terms_accepted = false;
        let err = validate_registration(&req, None).unwrap_err();
        match err {
            AuthError::Validation { field, reason } => {
                assert_eq!(field, "firstName");
                assert_eq!(reason, "is required");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn terms_precede_format_rules_for_present_fields() {
        let mut req = sample_register();
        req.first_name = "ann3".into(); // present but invalid
        req.terms_accepted = false;
        let err = validate_registration(&req, None).unwrap_err();
        match err {
            AuthError::Validation { field, .. } => assert_eq!(field, "termsAccepted"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn mismatched_confirmation_is_rejected() {
        let mut req = sample_register();
        req.confirm_password = "Abcd124!".into();
        let err = validate_registration(&req, None).unwrap_err();
        match err {
            AuthError::Validation { field, .. } => assert_eq!(field, "confirmPassword"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn domain_policy_applies_to_registration() {
        let mut req = sample_register();
        req.email = "ann@other.com".into();
        assert!(validate_registration(&req, Some("gmail.com")).is_err());
        assert!(validate_registration(&sample_register(), Some("gmail.com")).is_ok());
    }

    #[tokio::test]
    async fn forgot_password_for_unknown_email_is_not_found() {
        let keys = JwtKeys::from_ref(&AppState::fake());
        let err = issue_reset_token(&keys, None).unwrap_err();
        assert!(matches!(err, AuthError::NotFound));
    }

    #[tokio::test]
    async fn forgot_password_issues_a_reset_token_bound_to_the_account() {
        let keys = JwtKeys::from_ref(&AppState::fake());
        let user = sample_user();
        let user_id = user.id;
        let response = issue_reset_token(&keys, Some(user)).expect("token issued");
        assert!(response.success);
        let claims = keys.verify_reset(&response.reset_token).expect("reset token");
        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn patch_revalidates_present_fields_only() {
        let req = UpdateProfileRequest {
            first_name: Some("bob".into()),
            last_name: None,
            age: Some(30),
            profile_picture_url: Some(" https://cdn.example/pic.png ".into()),
        };
        let patch = validate_profile_patch(&req).expect("valid patch");
        assert_eq!(patch.first_name.as_deref(), Some("Bob"));
        assert!(patch.last_name.is_none());
        assert_eq!(patch.age, Some(30));
        assert_eq!(
            patch.profile_picture_url.as_deref(),
            Some("https://cdn.example/pic.png")
        );
    }

    #[test]
    fn patch_rejects_invalid_present_field() {
        let req = UpdateProfileRequest {
            age: Some(200),
            ..Default::default()
        };
        assert!(validate_profile_patch(&req).is_err());

        let req = UpdateProfileRequest {
            first_name: Some("x".into()),
            ..Default::default()
        };
        assert!(validate_profile_patch(&req).is_err());
    }

    #[test]
    fn empty_patch_is_a_no_op_patch() {
        let patch = validate_profile_patch(&UpdateProfileRequest::default()).unwrap();
        assert!(patch.first_name.is_none());
        assert!(patch.last_name.is_none());
        assert!(patch.age.is_none());
        assert!(patch.profile_picture_url.is_none());
    }
}
