mod auth;
mod me;
mod notifications;
mod publishers;
mod titles;
