//! Process-local store backing every repository port.
//!
//! Used for development and tests when no database is configured. All state
//! is lost on restart.

mod access;
mod directory;
mod records;


use std::collections::HashMap;

use clinic_application::{AuditEvent, UserRecord};
use clinic_core::{ClinicId, UserId};
use clinic_domain::{Clinic, ClinicMembership, ClinicRecord, RoleDefinition};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory implementation of the role, membership, directory, record,
/// settings and audit ports.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    roles: RwLock<HashMap<String, RoleDefinition>>,
    memberships: RwLock<HashMap<(UserId, ClinicId), ClinicMembership>>,
    users: RwLock<HashMap<UserId, UserRecord>>,
    clinics: RwLock<HashMap<ClinicId, Clinic>>,
    records: RwLock<HashMap<(ClinicId, Uuid), ClinicRecord>>,
    settings: RwLock<Option<Value>>,
    audit_events: RwLock<Vec<AuditEvent>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of appended audit events, oldest first.
    pub async fn audit_events(&self) -> Vec<AuditEvent> {
        self.audit_events.read().await.clone()
    }
}
