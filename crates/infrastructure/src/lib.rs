//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod in_memory_store;
mod jwt_token_codec;
mod postgres_audit_repository;
mod postgres_clinic_repository;
mod postgres_membership_repository;
mod postgres_record_repository;
mod postgres_role_repository;
mod postgres_user_repository;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use in_memory_store::InMemoryStore;
pub use jwt_token_codec::{JwtTokenCodec, MIN_TOKEN_SECRET_LENGTH};
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_clinic_repository::PostgresClinicRepository;
pub use postgres_membership_repository::PostgresMembershipRepository;
pub use postgres_record_repository::PostgresRecordRepository;
pub use postgres_role_repository::PostgresRoleRepository;
pub use postgres_user_repository::PostgresUserRepository;
