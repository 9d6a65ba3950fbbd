use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry in the resource catalog.
///
/// Resources form a forest via `parent_id`: categories group other resources,
/// while guide sheets, videos, links and simulations are leaves pointing at an
/// external `url`. Siblings are ordered by `order` ascending.
///
/// Resources are written only by seeding and are never updated in place; a
/// reseed deletes one `source`'s rows and inserts them again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceNode {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub url: Option<String>,
    /// Thumbnail, only present on simulations.
    pub image_url: Option<String>,
    pub order: i64,
    /// Dataset that inserted this resource (e.g. `Khan Academy`).
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The closed set of resource variants.
///
/// - `Category`: groups children, carries no url
/// - `Guidesheet`: reading material or notes
/// - `Video`: lecture or walkthrough
/// - `Link`: any other external page (practice sets, quizzes)
/// - `Simulation`: interactive simulation, may carry a thumbnail
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Category,
    Guidesheet,
    Video,
    Link,
    Simulation,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Guidesheet => "guidesheet",
            Self::Video => "video",
            Self::Link => "link",
            Self::Simulation => "simulation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "category" => Some(Self::Category),
            "guidesheet" => Some(Self::Guidesheet),
            "video" => Some(Self::Video),
            "link" => Some(Self::Link),
            "simulation" => Some(Self::Simulation),
            _ => None,
        }
    }

    /// Leaf kinds point at an external resource and have no children.
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Self::Category)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for inserting a resource. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewResource {
    /// Parent category. `None` creates a root.
    pub parent_id: Option<Uuid>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub order: i64,
    pub source: Option<String>,
}

impl NewResource {
    pub fn category(parent_id: Option<Uuid>, name: impl Into<String>, order: i64) -> Self {
        Self {
            parent_id,
            name: name.into(),
            kind: ResourceKind::Category,
            url: None,
            image_url: None,
            order,
            source: None,
        }
    }

    pub fn leaf(
        parent_id: Option<Uuid>,
        kind: ResourceKind,
        name: impl Into<String>,
        url: impl Into<String>,
        order: i64,
    ) -> Self {
        Self {
            parent_id,
            name: name.into(),
            kind,
            url: Some(url.into()),
            image_url: None,
            order,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

/// Which resources a bulk delete removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteFilter {
    All,
    Source(String),
}

/// How a category's children are laid out when browsing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    List,
    Grid,
}

/// A resource with its nested children, used for browse responses.
///
/// The `resource` fields are flattened into the JSON response. Categories carry
/// a `layout`; leaves omit it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceTreeNode {
    #[serde(flatten)]
    pub resource: ResourceNode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    #[serde(default)]
    pub children: Vec<ResourceTreeNode>,
}

impl ResourceTreeNode {
    /// Number of resources in this subtree, including itself.
    pub fn subtree_size(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(ResourceTreeNode::subtree_size)
            .sum::<usize>()
    }
}

/// What the browser shows: the full hierarchy, or a flat list of search hits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BrowseView {
    Tree { roots: Vec<ResourceTreeNode> },
    Search { term: String, results: Vec<ResourceNode> },
}
