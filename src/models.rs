pub mod auth;
pub mod dashboard;
pub mod invitation;
pub mod onboarding;
pub mod tenancy;
