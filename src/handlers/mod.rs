//! Request handlers.
//!
//! The image handlers are stateless: each consumes a gateway event plus the
//! store clients and produces a gateway response, never a panic. The file
//! and health handlers speak plain HTTP since they are service-level
//! surfaces, not gateway operations.

pub mod file_handlers;
pub mod health_handlers;
pub mod image_handlers;
pub mod upload_handlers;
