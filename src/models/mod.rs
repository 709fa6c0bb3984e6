//! Core data models for the image-hosting service.
//!
//! Gateway event shapes carried between the HTTP adapter and the stateless
//! handlers, and the metadata record stored per uploaded image. The record
//! maps to its database table via `sqlx::FromRow` and serializes naturally
//! as JSON via `serde`.

pub mod gateway;
pub mod image;
