//! Tree browser: turns the catalog into what a reader sees.
//!
//! With no search term the browser walks the hierarchy from the roots and
//! produces nested [`ResourceTreeNode`]s; with a term it skips the hierarchy
//! and returns the store's search hits as a flat list.

mod render;

use std::collections::HashSet;

use anyhow::Result;
use uuid::Uuid;

use crate::catalog::ResourceStore;
use crate::models::*;

pub use render::{render_results, render_tree, render_view};

/// Categories nested deeper than this are shown without their children.
pub const DEFAULT_MAX_DEPTH: usize = 16;

#[derive(Debug, Clone)]
pub struct Browser {
    search: String,
    max_depth: usize,
}

impl Default for Browser {
    fn default() -> Self {
        Self::new()
    }
}

impl Browser {
    pub fn new() -> Self {
        Self {
            search: String::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// The current view: search hits when a term is set, the full tree otherwise.
    pub fn view<S: ResourceStore + ?Sized>(&self, store: &S) -> Result<BrowseView> {
        let term = self.search.trim();
        if term.is_empty() {
            Ok(BrowseView::Tree {
                roots: build_tree(store, self.max_depth)?,
            })
        } else {
            Ok(BrowseView::Search {
                term: term.to_string(),
                results: store.search(term)?,
            })
        }
    }
}

/// Grid when more than half of the children are simulations.
pub fn layout_for(children: &[ResourceNode]) -> Layout {
    let simulations = children
        .iter()
        .filter(|c| c.kind == ResourceKind::Simulation)
        .count();
    if simulations * 2 > children.len() {
        Layout::Grid
    } else {
        Layout::List
    }
}

struct Slot {
    resource: ResourceNode,
    layout: Option<Layout>,
    children: Vec<usize>,
}

/// Walk the forest from its roots without recursion.
///
/// Each resource is visited at most once; a resource reached a second time
/// (a cycle or a shared child in malformed data) is skipped. Categories at
/// `max_depth` keep their layout-less node but are not expanded.
pub fn build_tree<S: ResourceStore + ?Sized>(
    store: &S,
    max_depth: usize,
) -> Result<Vec<ResourceTreeNode>> {
    let mut slots: Vec<Slot> = Vec::new();
    let mut roots: Vec<usize> = Vec::new();
    let mut visited: HashSet<Uuid> = HashSet::new();

    // (parent slot, resource, depth); pushed in reverse so siblings pop in order
    let mut stack: Vec<(Option<usize>, ResourceNode, usize)> = store
        .list_children(None)?
        .into_iter()
        .rev()
        .map(|r| (None, r, 0))
        .collect();

    while let Some((parent, resource, depth)) = stack.pop() {
        if !visited.insert(resource.id) {
            tracing::warn!(
                "Resource {} ('{}') reached twice, skipping",
                resource.id,
                resource.name
            );
            continue;
        }

        let index = slots.len();
        let mut layout = None;

        if resource.kind == ResourceKind::Category {
            if depth >= max_depth {
                tracing::warn!(
                    "Category {} ('{}') exceeds depth {}, not expanding",
                    resource.id,
                    resource.name,
                    max_depth
                );
            } else {
                let children = store.list_children(Some(resource.id))?;
                layout = Some(layout_for(&children));
                stack.extend(
                    children
                        .into_iter()
                        .rev()
                        .map(|child| (Some(index), child, depth + 1)),
                );
            }
        }

        slots.push(Slot {
            resource,
            layout,
            children: Vec::new(),
        });
        match parent {
            Some(p) => slots[p].children.push(index),
            None => roots.push(index),
        }
    }

    // Children always sit at higher indices than their parent, so building
    // from the back means every child is finished before its parent needs it.
    let mut built: Vec<Option<ResourceTreeNode>> = Vec::with_capacity(slots.len());
    built.resize_with(slots.len(), || None);
    for (index, slot) in slots.into_iter().enumerate().rev() {
        let children = slot
            .children
            .iter()
            .filter_map(|c| built[*c].take())
            .collect();
        built[index] = Some(ResourceTreeNode {
            resource: slot.resource,
            layout: slot.layout,
            children,
        });
    }

    Ok(roots.iter().filter_map(|r| built[*r].take()).collect())
}
