//! Clients for the services the lottery talks to.

pub mod auth;
pub mod catalog;
pub mod mail;

pub use auth::{HttpTokenValidator, TokenValidator};
pub use catalog::{FileCardCatalog, HttpCardCatalog, NameCatalog};
pub use mail::{LogMailer, Mailer};
#[cfg(feature = "ses")]
pub use mail::SesMailer;
