pub mod auth;
pub mod clinics;
pub mod health;
pub mod records;
pub mod roles;
pub mod session;
pub mod settings;
pub mod staff;
pub mod users;
