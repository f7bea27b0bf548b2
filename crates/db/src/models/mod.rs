//! Row models and DTOs, one submodule per table family.

pub mod badge;
pub mod comment;
pub mod post;
pub mod user;
