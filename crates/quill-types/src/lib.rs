//! Types shared by the Quill crates: domain models and the typed form
//! payloads each endpoint accepts.

pub mod api;
pub mod models;
