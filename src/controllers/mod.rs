pub mod auth;
pub mod home;
pub mod me;
pub mod notifications;
pub mod progress;
pub mod publishers;
pub mod titles;
