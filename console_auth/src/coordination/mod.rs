//! Request-level operations
//!
//! Each function here is what one HTTP endpoint does, minus the HTTP. They
//! combine the passkey ceremony, the token issuer and the user directory, and
//! turn component errors into [`CoordinationError`].
//!
//! - `errors`: the error taxonomy the HTTP layer maps onto status codes
//! - `passkey`: registration, login and credential management
//! - `token`: bearer verification, refresh and logout

mod errors;
mod passkey;
mod token;

pub use errors::CoordinationError;

pub use passkey::{
    AuthenticationStartRequest, LoginResponse, delete_passkey_credential_core,
    handle_finish_authentication_core, handle_finish_registration_core,
    handle_start_authentication_core, handle_start_registration_core, list_credentials_core,
};

pub use token::{
    AuthenticatedUser, RefreshTokenRequest, issue_token_pair, refresh_token_core,
    revoke_token_core, verify_access_token_core,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings;
    use crate::passkey::SoftAuthenticator;
    use crate::test_utils::{get_test_origin, init_test_environment, unique_username};
    use crate::token::{RevocationLedger, TokenClaims, TokenIssuer, TokenType, sign};
    use crate::userdb::{Role, UserDirectory, UserRecord, UserStatus};

    fn rp_id() -> String {
        settings().unwrap().rp_id.clone()
    }

    async fn directory_user(prefix: &str, status: UserStatus, role: Role) -> AuthenticatedUser {
        let username = unique_username(prefix);
        UserDirectory::upsert_user(UserRecord::new(&username, status, role))
            .await
            .unwrap();
        AuthenticatedUser { username, role }
    }

    async fn enroll(user: &AuthenticatedUser) -> SoftAuthenticator {
        let authenticator = SoftAuthenticator::new();
        let options = handle_start_registration_core(user).await.unwrap();
        let credential =
            authenticator.register(options.challenge(), &get_test_origin(), &rp_id());
        handle_finish_registration_core(user, credential)
            .await
            .unwrap();
        authenticator
    }

    fn start_request(username: &str) -> AuthenticationStartRequest {
        AuthenticationStartRequest {
            username: Some(username.to_string()),
        }
    }

    fn refresh_request(token: &str) -> RefreshTokenRequest {
        RefreshTokenRequest {
            refresh_token: Some(token.to_string()),
        }
    }

    #[tokio::test]
    async fn test_console_login_scenario() {
        init_test_environment().await;
        let bob = directory_user("bob", UserStatus::Active, Role::Admin).await;

        // No credentials yet
        assert!(matches!(
            handle_start_authentication_core(start_request(&bob.username)).await,
            Err(CoordinationError::NotFound(_))
        ));

        let mut authenticator = enroll(&bob).await;

        let options = handle_start_authentication_core(start_request(&bob.username))
            .await
            .unwrap();

        // A challenge that was never minted
        let forged = authenticator.assert("bmV2ZXItbWludGVk", &get_test_origin(), &rp_id());
        assert_eq!(
            handle_finish_authentication_core(forged).await.unwrap_err(),
            CoordinationError::Verification
        );

        let assertion = authenticator.assert(options.challenge(), &get_test_origin(), &rp_id());
        let login = handle_finish_authentication_core(assertion).await.unwrap();
        assert_eq!(login.username, bob.username);
        assert_eq!(login.role, Role::Admin);

        let caller = verify_access_token_core(&login.access_token).unwrap();
        assert_eq!(caller, bob);

        let refreshed = refresh_token_core(refresh_request(&login.refresh_token))
            .await
            .unwrap();
        assert_eq!(
            verify_access_token_core(&refreshed.access_token).unwrap(),
            bob
        );

        // Logout
        revoke_token_core(refresh_request(&login.refresh_token))
            .await
            .unwrap();
        assert!(matches!(
            refresh_token_core(refresh_request(&login.refresh_token)).await,
            Err(CoordinationError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn test_revoked_identifier_fails_refresh() {
        init_test_environment().await;
        let carol = directory_user("carol", UserStatus::Active, Role::Viewer).await;

        let now = chrono::Utc::now().timestamp();
        let token = sign(&TokenClaims {
            sub: carol.username.clone(),
            role: carol.role,
            iat: now,
            exp: now + 3600,
            token_type: TokenType::Refresh,
            jti: Some("rt-42".to_string()),
        })
        .unwrap();
        RevocationLedger::revoke("rt-42", now + 3600).await.unwrap();

        assert!(matches!(
            refresh_token_core(refresh_request(&token)).await,
            Err(CoordinationError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn test_registration_binds_to_caller() {
        init_test_environment().await;
        let alice = directory_user("alice", UserStatus::Active, Role::Admin).await;
        let mallory = directory_user("mallory", UserStatus::Active, Role::Viewer).await;

        let authenticator = SoftAuthenticator::new();
        let options = handle_start_registration_core(&alice).await.unwrap();
        let credential =
            authenticator.register(options.challenge(), &get_test_origin(), &rp_id());

        assert_eq!(
            handle_finish_registration_core(&mallory, credential)
                .await
                .unwrap_err(),
            CoordinationError::Verification
        );
        assert!(list_credentials_core(&mallory).await.unwrap().is_empty());
        assert!(list_credentials_core(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pending_user_cannot_log_in() {
        init_test_environment().await;
        let pending = directory_user("pending", UserStatus::Pending, Role::Admin).await;
        let mut authenticator = enroll(&pending).await;

        let options = handle_start_authentication_core(start_request(&pending.username))
            .await
            .unwrap();
        let assertion = authenticator.assert(options.challenge(), &get_test_origin(), &rp_id());
        assert_eq!(
            handle_finish_authentication_core(assertion).await.unwrap_err(),
            CoordinationError::Verification
        );
    }

    #[tokio::test]
    async fn test_superuser_logs_in_without_directory_record() {
        init_test_environment().await;
        let superuser = AuthenticatedUser {
            username: settings().unwrap().superuser.clone(),
            role: Role::Superuser,
        };
        let mut authenticator = enroll(&superuser).await;

        let options = handle_start_authentication_core(start_request(&superuser.username))
            .await
            .unwrap();
        let assertion = authenticator.assert(options.challenge(), &get_test_origin(), &rp_id());
        let login = handle_finish_authentication_core(assertion).await.unwrap();
        assert_eq!(login.role, Role::Superuser);
    }

    #[tokio::test]
    async fn test_start_authentication_requires_username() {
        init_test_environment().await;

        for body in [
            AuthenticationStartRequest { username: None },
            start_request(""),
            start_request("   "),
        ] {
            assert!(matches!(
                handle_start_authentication_core(body).await,
                Err(CoordinationError::Validation(_))
            ));
        }
        assert!(matches!(
            handle_start_authentication_core(start_request("two words")).await,
            Err(CoordinationError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_credential_deletion() {
        init_test_environment().await;
        let dave = directory_user("dave", UserStatus::Active, Role::Admin).await;
        let authenticator = enroll(&dave).await;

        let listed = list_credentials_core(&dave).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, authenticator.credential_id_b64());

        assert!(matches!(
            delete_passkey_credential_core(&dave, "unknown-id").await,
            Err(CoordinationError::NotFound(_))
        ));
        assert_eq!(list_credentials_core(&dave).await.unwrap(), listed);

        delete_passkey_credential_core(&dave, &listed[0].id)
            .await
            .unwrap();
        assert!(matches!(
            delete_passkey_credential_core(&dave, &listed[0].id).await,
            Err(CoordinationError::NotFound(_))
        ));
        assert!(list_credentials_core(&dave).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bearer_must_be_an_access_token() {
        init_test_environment().await;

        let pair = issue_token_pair("erin", Role::Viewer).unwrap();
        assert_eq!(
            verify_access_token_core(&pair.access_token).unwrap().username,
            "erin"
        );
        assert!(matches!(
            verify_access_token_core(&pair.refresh_token),
            Err(CoordinationError::Authentication(_))
        ));
        assert!(matches!(
            verify_access_token_core("garbage"),
            Err(CoordinationError::Authentication(_))
        ));

        // And the other way around
        assert!(matches!(
            refresh_token_core(refresh_request(&pair.access_token)).await,
            Err(CoordinationError::Authentication(_))
        ));
        assert!(TokenIssuer::verify(&pair.refresh_token).is_ok());
    }

    #[tokio::test]
    async fn test_token_requests_require_a_token() {
        init_test_environment().await;

        assert!(matches!(
            refresh_token_core(RefreshTokenRequest::default()).await,
            Err(CoordinationError::Validation(_))
        ));
        assert!(matches!(
            revoke_token_core(refresh_request("")).await,
            Err(CoordinationError::Validation(_))
        ));
        assert!(matches!(
            revoke_token_core(refresh_request("not.a.token")).await,
            Err(CoordinationError::Authentication(_))
        ));
    }
}
