pub mod account;
pub mod dashboard;
pub mod invitation;
pub mod onboarding;
pub mod session;
