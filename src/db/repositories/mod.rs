//! Database repositories
//!
//! One repository per entity, each a trait plus its SQLx implementation.

pub mod category;
pub mod post;

pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use post::{PostRepository, SqlxPostRepository};
