//! Post listing query
//!
//! Turns the optional `category` and `search` request parameters into an
//! ordered list of predicates and applies them to a post collection.
//!
//! The collection is always ordered newest first (ties broken by the higher
//! ID). Filters then run in a fixed order: category slug, then search term.
//! Every predicate must accept a post for it to be kept.

use crate::models::Post;
use std::cmp::Ordering;

/// A single filter step over posts
pub type PostPredicate<'q> = Box<dyn Fn(&Post) -> bool + Send + Sync + 'q>;

/// Filter parameters for the post listing.
///
/// Empty strings are treated the same as absent parameters. The search term
/// is otherwise used exactly as given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    category: Option<String>,
    search: Option<String>,
}

impl PostQuery {
    pub fn new(category: Option<String>, search: Option<String>) -> Self {
        Self {
            category: category.filter(|c| !c.is_empty()),
            search: search.filter(|s| !s.is_empty()),
        }
    }

    /// A query that keeps every post
    pub fn all() -> Self {
        Self::default()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Build the filter chain in application order.
    pub fn predicates(&self) -> Vec<PostPredicate<'_>> {
        let mut predicates: Vec<PostPredicate<'_>> = Vec::with_capacity(2);

        if let Some(slug) = self.category.as_deref() {
            predicates.push(Box::new(move |post: &Post| post.category_slug() == Some(slug)));
        }

        if let Some(term) = self.search.as_deref() {
            let needle = term.to_lowercase();
            predicates.push(Box::new(move |post: &Post| {
                post.title.to_lowercase().contains(&needle)
                    || post.content.to_lowercase().contains(&needle)
            }));
        }

        predicates
    }

    /// Order `posts` newest first and attach this query's filters.
    ///
    /// Nothing is filtered until the listing is iterated.
    pub fn apply<'a>(&'a self, posts: &'a [Post]) -> PostListing<'a> {
        let mut ordered: Vec<&Post> = posts.iter().collect();
        ordered.sort_by(|a, b| newest_first(a, b));

        PostListing {
            ordered,
            predicates: self.predicates(),
        }
    }
}

/// `created_at` descending, then `id` descending
pub fn newest_first(a: &Post, b: &Post) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

/// Filtered, ordered view over a post collection.
///
/// [`PostListing::iter`] can be called any number of times; each call
/// starts again from the newest post.
pub struct PostListing<'a> {
    ordered: Vec<&'a Post>,
    predicates: Vec<PostPredicate<'a>>,
}

impl<'a> PostListing<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a Post> + '_ {
        self.ordered
            .iter()
            .copied()
            .filter(move |post| self.predicates.iter().all(|keep| keep(*post)))
    }

    /// Collect the matching posts into owned values
    pub fn to_vec(&self) -> Vec<Post> {
        self.iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}
