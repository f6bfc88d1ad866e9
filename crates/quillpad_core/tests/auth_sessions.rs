use quillpad_core::{
    CoreConfig, CoreError, CoreService, MemorySnapshotStore, ProfilePatch, TokenError,
};

fn open_service() -> CoreService {
    CoreService::open(
        CoreConfig::new("integration-secret"),
        Box::new(MemorySnapshotStore::new()),
    )
    .unwrap()
}

#[test]
fn register_then_login_yields_same_user_id() {
    let mut service = open_service();
    let registered = service.register("alice", "pw1-secret").unwrap();

    let session = service.login("alice", "pw1-secret").unwrap();
    assert_eq!(session.user.id, registered.id);
    assert!(!session.token.is_empty());
}

#[test]
fn second_registration_with_same_username_fails() {
    let mut service = open_service();
    service.register("alice", "pw1-secret").unwrap();

    let second = service.register("alice", "pw2-secret");
    assert!(matches!(second, Err(CoreError::DuplicateUsername(_))));
    // First account stays authenticatable.
    assert!(service.login("alice", "pw1-secret").is_ok());
}

#[test]
fn login_token_authorizes_calls() {
    let mut service = open_service();
    let registered = service.register("alice", "pw1-secret").unwrap();
    let session = service.login("alice", "pw1-secret").unwrap();

    let identity = service.authorize(&session.token).unwrap();
    assert_eq!(identity.user_id, registered.id);
    assert_eq!(identity.username, "alice");
}

#[test]
fn logout_revokes_the_token_before_natural_expiry() {
    let mut service = open_service();
    service.register("alice", "pw1-secret").unwrap();
    let session = service.login("alice", "pw1-secret").unwrap();

    service.logout(&session.token).unwrap();
    let denied = service.authorize(&session.token).unwrap_err();
    assert!(matches!(denied, CoreError::Token(TokenError::Revoked)));
}

#[test]
fn garbage_token_is_rejected_without_authenticating() {
    let service = open_service();
    assert!(matches!(
        service.authorize("not-a-token").unwrap_err(),
        CoreError::Token(TokenError::Malformed)
    ));
}

#[test]
fn tampered_token_fails_signature_even_when_revoked() {
    let mut service = open_service();
    service.register("alice", "pw1-secret").unwrap();
    let session = service.login("alice", "pw1-secret").unwrap();
    service.logout(&session.token).unwrap();

    let tampered = format!("{}x", session.token);
    assert!(matches!(
        service.authorize(&tampered).unwrap_err(),
        CoreError::Token(TokenError::BadSignature)
    ));
}

#[test]
fn profile_update_keeps_login_consistent() {
    let mut service = open_service();
    let user = service.register("alice", "pw1-secret").unwrap();

    let updated = service
        .update_profile(
            user.id,
            ProfilePatch {
                username: Some("alice2".to_string()),
                password: Some("pw2-rotated".to_string()),
            },
        )
        .unwrap();
    assert_eq!(updated.username, "alice2");

    assert!(matches!(
        service.login("alice", "pw1-secret").unwrap_err(),
        CoreError::InvalidCredentials
    ));
    assert!(service.login("alice2", "pw2-rotated").is_ok());
}

#[test]
fn profile_update_rejects_collision_with_other_account() {
    let mut service = open_service();
    service.register("alice", "pw1-secret").unwrap();
    let bob = service.register("bob", "pw2-secret").unwrap();

    let collision = service.update_profile(
        bob.id,
        ProfilePatch {
            username: Some("alice".to_string()),
            password: None,
        },
    );
    assert!(matches!(collision, Err(CoreError::DuplicateUsername(_))));

    // Updating to one's own current username is not a collision.
    assert!(service
        .update_profile(
            bob.id,
            ProfilePatch {
                username: Some("bob".to_string()),
                password: None,
            },
        )
        .is_ok());
}

#[test]
fn purge_reports_zero_when_nothing_expired() {
    let mut service = open_service();
    service.register("alice", "pw1-secret").unwrap();
    let session = service.login("alice", "pw1-secret").unwrap();
    service.logout(&session.token).unwrap();

    // The revocation entry is far from expiry under the default 24h TTL.
    assert_eq!(service.purge_expired_revocations(), 0);
    assert!(matches!(
        service.authorize(&session.token).unwrap_err(),
        CoreError::Token(TokenError::Revoked)
    ));
}
