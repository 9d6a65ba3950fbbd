//! Domain models for the resource catalog.
//!
//! # Core Concepts
//!
//! - [`ResourceNode`]: one catalog entry. Nodes form a forest through
//!   `parent_id`; categories group children, every other [`ResourceKind`] is a
//!   leaf pointing at an external url.
//! - [`ResourceTreeNode`] / [`BrowseView`]: what the browser produces, either
//!   the nested hierarchy or a flat list of search hits.
//! - [`SeedRun`]: version marker for an applied seed dataset, so seeding runs
//!   like a migration instead of a freely repeatable mutation.

mod resource;
mod seed_run;

pub use resource::*;
pub use seed_run::*;
