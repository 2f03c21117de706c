use super::helpers::*;
use crate::*;
use turnstile_audit::{DecisionReason, Factor, Outcome};
use turnstile_credentials::CredentialLifecycle;
use turnstile_identity::ErrorKind;

#[tokio::test]
async fn test_enroll_issue_and_verify_both_factors() {
    let ctx = create_test_context().await;
    let alice = enroll(&ctx, "alice@example.com", &FACE_A).await;
    let q1 = ctx.credentials.issue(alice, Some(DAY)).await.unwrap();

    assert_eq!(
        ctx.engine.check_credential(&q1.token).await.unwrap(),
        CredentialCheck::Resolved(alice)
    );
    assert_eq!(
        ctx.engine.check_biometric(alice, &face(&FACE_A_FRESH)).await.unwrap(),
        BiometricCheck::Granted
    );
    assert_eq!(
        ctx.engine.check_biometric(alice, &face(&FACE_B)).await.unwrap(),
        BiometricCheck::Denied
    );
    assert_eq!(
        ctx.engine.check_credential("bogus-token").await.unwrap(),
        CredentialCheck::Rejected(DecisionReason::NotFound)
    );

    let records = audit_records(&ctx).await;
    let trail: Vec<_> = records
        .iter()
        .map(|r| (r.identity_id, r.factor, r.outcome, r.reason))
        .collect();
    assert_eq!(
        trail,
        vec![
            (Some(alice), Factor::Credential, Outcome::Granted, None),
            (Some(alice), Factor::Biometric, Outcome::Granted, None),
            (
                Some(alice),
                Factor::Biometric,
                Outcome::Denied,
                Some(DecisionReason::Mismatch)
            ),
            (
                None,
                Factor::Credential,
                Outcome::Denied,
                Some(DecisionReason::NotFound)
            ),
        ]
    );
}

#[tokio::test]
async fn test_token_whitespace_is_trimmed() {
    let ctx = create_test_context().await;
    let alice = enroll(&ctx, "alice@example.com", &FACE_A).await;
    let credential = ctx.credentials.issue(alice, Some(DAY)).await.unwrap();

    let scanned = format!("  {}\n", credential.token);
    assert_eq!(
        ctx.engine.check_credential(&scanned).await.unwrap(),
        CredentialCheck::Resolved(alice)
    );
}

#[tokio::test]
async fn test_empty_token_is_invalid_and_not_audited() {
    let ctx = create_test_context().await;

    let err = ctx.engine.check_credential("   ").await.unwrap_err();
    assert!(matches!(err, VerificationError::InvalidRequest(_)));
    assert_eq!(err.kind(), ErrorKind::Invalid);
    assert!(audit_records(&ctx).await.is_empty());
}

#[tokio::test]
async fn test_revoked_credential_is_rejected() {
    let ctx = create_test_context().await;
    let alice = enroll(&ctx, "alice@example.com", &FACE_A).await;
    let credential = ctx.credentials.issue(alice, Some(DAY)).await.unwrap();
    ctx.credentials.revoke(alice).await.unwrap();

    assert_eq!(
        ctx.engine.check_credential(&credential.token).await.unwrap(),
        CredentialCheck::Rejected(DecisionReason::Inactive)
    );

    let records = audit_records(&ctx).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].identity_id, None);
    assert_eq!(records[0].reason, Some(DecisionReason::Inactive));
}

#[tokio::test]
async fn test_rotated_out_credential_is_rejected() {
    let ctx = create_test_context().await;
    let alice = enroll(&ctx, "alice@example.com", &FACE_A).await;
    let old = ctx.credentials.issue(alice, Some(DAY)).await.unwrap();
    let rotation = ctx.credentials.rotate(alice, Some(DAY)).await.unwrap();

    assert_eq!(
        ctx.engine.check_credential(&old.token).await.unwrap(),
        CredentialCheck::Rejected(DecisionReason::Inactive)
    );
    assert_eq!(
        ctx.engine
            .check_credential(&rotation.credential.token)
            .await
            .unwrap(),
        CredentialCheck::Resolved(alice)
    );
}

#[tokio::test]
async fn test_credential_for_missing_identity_is_denied() {
    let ctx = create_test_context().await;
    let alice = enroll(&ctx, "alice@example.com", &FACE_A).await;
    let credential = ctx.credentials.issue(alice, Some(DAY)).await.unwrap();
    orphan_identity(&ctx, alice).await;

    assert_eq!(
        ctx.engine.check_credential(&credential.token).await.unwrap(),
        CredentialCheck::Rejected(DecisionReason::IdentityMissing)
    );

    let records = audit_records(&ctx).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].identity_id, Some(alice));
    assert_eq!(records[0].outcome, Outcome::Denied);
    assert_eq!(records[0].reason, Some(DecisionReason::IdentityMissing));
}

#[tokio::test]
async fn test_missing_template_is_denied_and_audited() {
    let ctx = create_test_context().await;
    let alice = enroll(&ctx, "alice@example.com", &FACE_A).await;
    drop_template(&ctx, alice).await;

    assert_eq!(
        ctx.engine.check_biometric(alice, &face(&FACE_A)).await.unwrap(),
        BiometricCheck::NoTemplate
    );

    let records = audit_records(&ctx).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].factor, Factor::Biometric);
    assert_eq!(records[0].outcome, Outcome::Denied);
    assert_eq!(records[0].reason, Some(DecisionReason::NoTemplate));
}

#[tokio::test]
async fn test_verify_access_grants_with_both_factors() {
    let ctx = create_test_context().await;
    let alice = enroll(&ctx, "alice@example.com", &FACE_A).await;
    let credential = ctx.credentials.issue(alice, None).await.unwrap();

    let decision = ctx
        .engine
        .verify_access(&credential.token, &face(&FACE_A_FRESH))
        .await
        .unwrap();

    assert_eq!(decision, AccessDecision::Granted(alice));
    assert!(decision.is_granted());
    assert_eq!(audit_records(&ctx).await.len(), 2);
}

#[tokio::test]
async fn test_verify_access_stops_at_rejected_credential() {
    let ctx = create_test_context().await;
    enroll(&ctx, "alice@example.com", &FACE_A).await;

    let decision = ctx
        .engine
        .verify_access("not-a-credential", &face(&FACE_A))
        .await
        .unwrap();

    assert_eq!(decision, AccessDecision::Denied);

    let records = audit_records(&ctx).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].factor, Factor::Credential);
}

#[tokio::test]
async fn test_verify_access_denies_someone_else_with_a_valid_badge() {
    let ctx = create_test_context().await;
    let alice = enroll(&ctx, "alice@example.com", &FACE_A).await;
    enroll(&ctx, "bob@example.com", &FACE_B).await;
    let credential = ctx.credentials.issue(alice, Some(DAY)).await.unwrap();

    let decision = ctx
        .engine
        .verify_access(&credential.token, &face(&FACE_B))
        .await
        .unwrap();

    assert_eq!(decision, AccessDecision::Denied);
    assert!(!decision.is_granted());
}
