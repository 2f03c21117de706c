use super::helpers::*;
use crate::*;
use std::sync::Arc;
use turnstile_audit::{AuditLog, DailyStats, DecisionReason, Factor, Outcome, ReportFilter};
use turnstile_credentials::CredentialLifecycle;
use turnstile_identity::ErrorKind;

#[tokio::test]
async fn test_one_record_per_decided_attempt() {
    let ctx = create_test_context().await;
    let alice = enroll(&ctx, "alice@example.com", &FACE_A).await;
    let credential = ctx.credentials.issue(alice, Some(DAY)).await.unwrap();

    let attempts = [
        (credential.token.as_str(), FACE_A_FRESH),
        ("bogus-1", FACE_A),
        (credential.token.as_str(), FACE_B),
        ("bogus-2", FACE_B),
        (credential.token.as_str(), FACE_A),
    ];
    let mut stage_two = 0;
    for (token, features) in attempts {
        if let CredentialCheck::Resolved(identity_id) =
            ctx.engine.check_credential(token).await.unwrap()
        {
            ctx.engine
                .check_biometric(identity_id, &face(&features))
                .await
                .unwrap();
            stage_two += 1;
        }
    }

    let records = audit_records(&ctx).await;
    let count = |factor: Factor, outcome: Outcome| {
        records
            .iter()
            .filter(|r| r.factor == factor && r.outcome == outcome)
            .count()
    };

    assert_eq!(count(Factor::Credential, Outcome::Granted), 3);
    assert_eq!(count(Factor::Credential, Outcome::Denied), 2);
    assert_eq!(count(Factor::Biometric, Outcome::Granted), 2);
    assert_eq!(count(Factor::Biometric, Outcome::Denied), 1);
    assert_eq!(records.len(), attempts.len() + stage_two);
    assert!(records
        .windows(2)
        .all(|pair| pair[0].attempt_id < pair[1].attempt_id));
}

#[tokio::test]
async fn test_store_fault_is_not_a_denial() {
    let ctx = create_test_context().await;
    let engine = engine_over(
        Arc::new(OfflineCredentials),
        &ctx.identities,
        Arc::clone(&ctx.audit),
    );

    let err = engine.check_credential("some-token").await.unwrap_err();
    assert!(matches!(err, VerificationError::Credential(_)));
    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert!(err.is_retryable());

    let err = engine
        .verify_access("some-token", &face(&FACE_A))
        .await
        .unwrap_err();
    assert!(err.is_retryable());

    assert!(audit_records(&ctx).await.is_empty());
    assert_eq!(ctx.audit.daily_stats(0).await.unwrap(), DailyStats::default());
}

#[tokio::test]
async fn test_no_face_is_not_audited() {
    let ctx = create_test_context().await;
    let alice = enroll(&ctx, "alice@example.com", &FACE_A).await;

    assert_eq!(
        ctx.engine.check_biometric(alice, &sample("noface")).await.unwrap(),
        BiometricCheck::NoFaceDetected
    );
    assert!(audit_records(&ctx).await.is_empty());
}

#[tokio::test]
async fn test_verify_access_without_face_keeps_only_credential_record() {
    let ctx = create_test_context().await;
    let alice = enroll(&ctx, "alice@example.com", &FACE_A).await;
    let credential = ctx.credentials.issue(alice, Some(DAY)).await.unwrap();

    let decision = ctx
        .engine
        .verify_access(&credential.token, &sample("noface"))
        .await
        .unwrap();

    assert_eq!(decision, AccessDecision::NoFaceDetected);
    assert!(!decision.is_granted());

    let records = audit_records(&ctx).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].factor, Factor::Credential);
}

#[tokio::test]
async fn test_processing_fault_is_retryable_and_not_audited() {
    let ctx = create_test_context().await;
    let alice = enroll(&ctx, "alice@example.com", &FACE_A).await;

    let err = ctx
        .engine
        .check_biometric(alice, &sample("corrupt"))
        .await
        .unwrap_err();

    assert!(matches!(err, VerificationError::ProcessingFault(_)));
    assert!(err.is_retryable());
    assert!(audit_records(&ctx).await.is_empty());
}

#[tokio::test]
async fn test_extraction_timeout_is_retryable_and_not_audited() {
    let ctx = create_test_context().await;
    let alice = enroll(&ctx, "alice@example.com", &FACE_A).await;

    let err = ctx
        .engine
        .check_biometric(alice, &sample("slow"))
        .await
        .unwrap_err();

    assert!(matches!(err, VerificationError::ExtractionTimeout(_)));
    assert!(err.is_retryable());
    assert_eq!(err.kind(), ErrorKind::ProcessingFault);
    assert!(audit_records(&ctx).await.is_empty());
}

#[tokio::test]
async fn test_audit_failure_refuses_entry() {
    let ctx = create_test_context().await;
    let alice = enroll(&ctx, "alice@example.com", &FACE_A).await;
    let credential = ctx.credentials.issue(alice, Some(DAY)).await.unwrap();
    let engine = build_engine(&ctx.credentials, &ctx.identities, Arc::new(OfflineAudit));

    let err = engine
        .verify_access(&credential.token, &face(&FACE_A))
        .await
        .unwrap_err();

    assert!(matches!(err, VerificationError::AuditUnavailable(_)));
    assert!(err.is_retryable());
    assert_eq!(err.public_message(), RETRY_MESSAGE);
}

#[tokio::test]
async fn test_audit_failure_on_match_is_not_a_grant() {
    let ctx = create_test_context().await;
    let alice = enroll(&ctx, "alice@example.com", &FACE_A).await;
    let engine = build_engine(&ctx.credentials, &ctx.identities, Arc::new(OfflineAudit));

    let result = engine.check_biometric(alice, &face(&FACE_A)).await;

    assert!(matches!(result, Err(VerificationError::AuditUnavailable(_))));
}

#[tokio::test]
async fn test_manual_decision_is_recorded() {
    let ctx = create_test_context().await;
    let alice = enroll(&ctx, "alice@example.com", &FACE_A).await;

    let attempt_id = ctx
        .engine
        .record_manual_decision(Some(alice), Factor::Biometric, Outcome::Granted)
        .await
        .unwrap();
    ctx.engine
        .record_manual_decision(None, Factor::Credential, Outcome::Denied)
        .await
        .unwrap();

    let records = audit_records(&ctx).await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].attempt_id, attempt_id);
    assert_eq!(records[0].identity_id, Some(alice));
    assert_eq!(records[0].reason, Some(DecisionReason::Manual));
    assert_eq!(records[1].identity_id, None);
    assert_eq!(records[1].outcome, Outcome::Denied);
}

#[tokio::test]
async fn test_manual_decision_for_unknown_identity() {
    let ctx = create_test_context().await;

    let err = ctx
        .engine
        .record_manual_decision(Some(404), Factor::Biometric, Outcome::Granted)
        .await
        .unwrap_err();

    assert!(matches!(err, VerificationError::IdentityNotFound(404)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(audit_records(&ctx).await.is_empty());
}

#[tokio::test]
async fn test_report_shows_one_identity_attempts() {
    let ctx = create_test_context().await;
    let alice = enroll(&ctx, "alice@example.com", &FACE_A).await;
    let bob = enroll(&ctx, "bob@example.com", &FACE_B).await;

    ctx.engine.check_biometric(alice, &face(&FACE_A)).await.unwrap();
    ctx.engine.check_biometric(bob, &face(&FACE_A)).await.unwrap();
    ctx.engine.check_biometric(alice, &face(&FACE_B)).await.unwrap();

    let report = ctx
        .audit
        .report(ReportFilter {
            identity_id: Some(alice),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(report.len(), 2);
    assert_eq!(report[0].outcome, Outcome::Denied);
    assert_eq!(report[1].outcome, Outcome::Granted);
}
