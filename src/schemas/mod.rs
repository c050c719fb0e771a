pub mod auth;
pub mod invite;
