//! Storefront services: authentication, media upload, settings reads.

pub mod auth;
pub mod media;
pub mod settings;
