//! Services layer - Business logic
//!
//! Services sit between the HTTP handlers and the repositories. They own
//! validation, slug handling and the error taxonomy the API maps to status
//! codes.

pub mod category;
pub mod post;
pub mod post_query;
pub mod slug;

pub use category::{CategoryService, CategoryServiceError};
pub use post::{PostService, PostServiceError};
pub use post_query::{PostListing, PostQuery};
pub use slug::{generate_slug, validate_slug};
