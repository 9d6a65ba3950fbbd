//! Read side of the catalog, as consumed by the browser.
//!
//! The browser receives a [`ResourceStore`] explicitly instead of reaching for a
//! global client, so traversal can run against the SQLite store or any other
//! implementation (tests use an in-memory map).

use anyhow::Result;
use uuid::Uuid;

use crate::db::{Database, DEFAULT_SEARCH_LIMIT};
use crate::models::ResourceNode;

pub trait ResourceStore {
    /// The resource with `id`, or `None`. Not-found is not an error.
    fn get(&self, id: Uuid) -> Result<Option<ResourceNode>>;

    /// Direct children of `parent_id` (roots when `None`), ascending by `order`.
    fn list_children(&self, parent_id: Option<Uuid>) -> Result<Vec<ResourceNode>>;

    /// Resources whose name matches `term`, most relevant first.
    fn search(&self, term: &str) -> Result<Vec<ResourceNode>>;
}

impl ResourceStore for Database {
    fn get(&self, id: Uuid) -> Result<Option<ResourceNode>> {
        self.get_resource(id)
    }

    fn list_children(&self, parent_id: Option<Uuid>) -> Result<Vec<ResourceNode>> {
        Database::list_children(self, parent_id)
    }

    fn search(&self, term: &str) -> Result<Vec<ResourceNode>> {
        self.search_resources(term, DEFAULT_SEARCH_LIMIT)
    }
}
