//! Data models
//!
//! Database entities and the inputs used to create and update them.

mod category;
mod post;

pub use category::{Category, CreateCategoryInput, UpdateCategoryInput};
pub use post::{CreatePostInput, Post, UpdatePostInput};
