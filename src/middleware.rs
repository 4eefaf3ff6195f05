pub mod auth;
pub mod rbac;
pub mod tenancy;
pub mod trace;
