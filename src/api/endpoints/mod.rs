//! API endpoint handlers, one module per feature area.

pub mod admin;
pub mod auth;
pub mod care_plans;
pub mod chat;
pub mod doctor;
pub mod health;
pub mod symptoms;
pub mod vitals;
