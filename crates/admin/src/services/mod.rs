//! Admin services: media host client, chunked bulk upload, email.

pub mod bulk;
pub mod email;
pub mod media;
