use chrono::Utc;
use clinic_application::{
    AuditEvent, AuditRepository, ClinicRepository, MembershipRepository, RecordRepository,
    UserRepository,
};
use clinic_core::{AppError, GlobalRole, UserId};
use clinic_domain::{
    AuditAction, Clinic, ClinicMembership, ClinicRecord, RecordPayload, Resource, UserAccount,
};
use serde_json::json;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::PostgresRecordRepository;
use crate::{
    PostgresAuditRepository, PostgresClinicRepository, PostgresMembershipRepository,
    PostgresUserRepository,
};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres record tests: {error}");
    }

    Some(pool)
}

async fn create_clinic(pool: &PgPool) -> Clinic {
    let code = format!("c-{}", &Uuid::new_v4().simple().to_string()[..12]);
    let clinic = Clinic::new("Test Clinic", code).unwrap_or_else(|_| panic!("valid clinic"));
    let created = PostgresClinicRepository::new(pool.clone())
        .create_clinic(clinic.clone())
        .await;
    assert!(created.is_ok());
    clinic
}

fn record(clinic: &Clinic, resource: Resource, payload: serde_json::Value) -> ClinicRecord {
    ClinicRecord::new(
        clinic.clinic_id(),
        resource,
        RecordPayload::new(payload).unwrap_or_else(|_| panic!("valid payload")),
        UserId::new(),
        Utc::now(),
    )
    .unwrap_or_else(|_| panic!("valid record"))
}

#[tokio::test]
async fn records_never_leak_across_clinics() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRecordRepository::new(pool.clone());
    let north = create_clinic(&pool).await;
    let south = create_clinic(&pool).await;

    let chart = record(&north, Resource::Patients, json!({ "name": "Ana" }));
    assert!(repository.insert_record(chart.clone()).await.is_ok());

    let found = repository
        .find_record(north.clinic_id(), Resource::Patients, chart.record_id())
        .await
        .ok()
        .flatten();
    assert_eq!(found, Some(chart.clone()));

    let leaked = repository
        .find_record(south.clinic_id(), Resource::Patients, chart.record_id())
        .await
        .ok()
        .flatten();
    assert!(leaked.is_none());
    assert!(
        repository
            .list_records(south.clinic_id(), Resource::Patients)
            .await
            .unwrap_or_default()
            .is_empty()
    );

    assert!(
        repository
            .delete_record(south.clinic_id(), Resource::Patients, chart.record_id())
            .await
            .is_ok()
    );
    assert_eq!(
        repository
            .list_records(north.clinic_id(), Resource::Patients)
            .await
            .unwrap_or_default()
            .len(),
        1
    );
}

#[tokio::test]
async fn clinic_reference_cannot_be_rewritten_in_storage() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRecordRepository::new(pool.clone());
    let north = create_clinic(&pool).await;
    let south = create_clinic(&pool).await;

    let visit = record(&north, Resource::Appointments, json!({ "slot": "09:00" }));
    assert!(repository.insert_record(visit.clone()).await.is_ok());

    let moved = sqlx::query("UPDATE clinic_records SET clinic_id = $2 WHERE id = $1")
        .bind(visit.record_id())
        .bind(south.clinic_id().as_uuid())
        .execute(&pool)
        .await;
    assert!(moved.is_err());
}

#[tokio::test]
async fn user_email_is_unique_and_memberships_upsert() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let users = PostgresUserRepository::new(pool.clone());
    let memberships = PostgresMembershipRepository::new(pool.clone());
    let clinic = create_clinic(&pool).await;

    let email = format!("{}@clinic.test", Uuid::new_v4().simple());
    let account = UserAccount::new(email.as_str(), "Dana", GlobalRole::Nurse)
        .unwrap_or_else(|_| panic!("valid account"));
    assert!(users.create_user(account.clone(), "hash").await.is_ok());

    let twin = UserAccount::new(email.as_str(), "Dana Twin", GlobalRole::Staff)
        .unwrap_or_else(|_| panic!("valid account"));
    assert!(matches!(
        users.create_user(twin, "hash").await,
        Err(AppError::Conflict(_))
    ));

    let membership = ClinicMembership::new(
        account.user_id(),
        clinic.clinic_id(),
        "nurse",
        Vec::new(),
        Utc::now(),
    )
    .unwrap_or_else(|_| panic!("valid membership"));
    assert!(memberships.save_membership(membership.clone()).await.is_ok());
    assert!(memberships.save_membership(membership.deactivated()).await.is_ok());

    let stored = memberships
        .find_membership(account.user_id(), clinic.clinic_id())
        .await
        .ok()
        .flatten();
    assert!(stored.is_some_and(|membership| !membership.is_active()));
    assert_eq!(
        memberships
            .list_clinic_memberships(clinic.clinic_id())
            .await
            .unwrap_or_default()
            .len(),
        1
    );

    let audit = PostgresAuditRepository::new(pool.clone());
    let appended = audit
        .append_event(AuditEvent {
            clinic_id: Some(clinic.clinic_id()),
            actor: account.user_id(),
            action: AuditAction::MembershipDeactivated,
            resource_type: "clinic_membership".to_owned(),
            resource_id: account.user_id().to_string(),
            detail: None,
        })
        .await;
    assert!(appended.is_ok());
}
