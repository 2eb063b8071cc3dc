//! Axum HTTP front end: request translation, routing, and middleware.
//!
//! # Request pipeline
//!
//! 1. [`media`] classifies the body by content type (415 / 400 short-circuit).
//! 2. [`normalize`] builds the canonical request.
//! 3. [`resolve`] derives the per-request configuration.
//! 4. [`translate`] invokes the processor and folds the outcome into a
//!    [`reply::ReplyChannel`], using [`serialize`] for success bodies.

pub mod handlers;
pub mod media;
pub mod middleware;
pub mod normalize;
pub mod reply;
pub mod resolve;
pub mod router;
pub mod serialize;
pub mod state;
pub mod translate;
