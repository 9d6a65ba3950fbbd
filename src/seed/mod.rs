//! Seeding the catalog from embedded datasets.
//!
//! Each [`Dataset`] owns every resource tagged with its `source`. Applying a
//! dataset deletes that source's rows, reinserts the full tree and records a
//! [`SeedRun`] marker, all in one transaction. [`seed_all`] only applies
//! datasets whose marker is missing or older than the embedded version, so it
//! behaves like a migration: run it at startup, as often as you like.

pub mod curated;
pub mod khan;

use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, Database};
use crate::models::*;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("unknown seed source '{0}'")]
    UnknownSource(String),
}

/// A resource to insert, with its children. Order among siblings is positional.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedNode {
    pub name: String,
    pub kind: ResourceKind,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub children: Vec<SeedNode>,
}

impl SeedNode {
    pub fn category(name: impl Into<String>, children: Vec<SeedNode>) -> Self {
        Self {
            name: name.into(),
            kind: ResourceKind::Category,
            url: None,
            image_url: None,
            children,
        }
    }

    pub fn leaf(kind: ResourceKind, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            url: Some(url.into()),
            image_url: None,
            children: Vec::new(),
        }
    }

    pub fn simulation(
        name: impl Into<String>,
        url: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            image_url: Some(image_url.into()),
            ..Self::leaf(ResourceKind::Simulation, name, url)
        }
    }

    pub fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(SeedNode::subtree_size).sum::<usize>()
    }
}

/// A fixed, versioned set of resources identified by its `source` marker.
///
/// Bump `version` whenever the embedded data changes so existing stores pick
/// the new rows up on their next [`seed_all`].
#[derive(Debug, Clone, Copy)]
pub struct Dataset {
    pub source: &'static str,
    pub version: u32,
    build: fn() -> Vec<SeedNode>,
}

impl Dataset {
    pub const fn new(source: &'static str, version: u32, build: fn() -> Vec<SeedNode>) -> Self {
        Self {
            source,
            version,
            build,
        }
    }

    pub fn nodes(&self) -> Vec<SeedNode> {
        (self.build)()
    }
}

pub const DATASETS: &[Dataset] = &[
    Dataset::new(curated::GUIDES_SOURCE, 1, curated::guide_sheets),
    Dataset::new(curated::VIDEOS_SOURCE, 1, curated::video_lectures),
    Dataset::new(khan::SOURCE, 1, khan::nodes),
    Dataset::new(curated::PHET_SOURCE, 1, curated::phet_simulations),
];

pub fn find_dataset(source: &str) -> Option<&'static Dataset> {
    DATASETS.iter().find(|d| d.source.eq_ignore_ascii_case(source))
}

/// Apply every built-in dataset that is missing or outdated.
pub fn seed_all(db: &Database) -> Result<Vec<SeedReport>> {
    apply_all(db, false)
}

/// Reapply every built-in dataset regardless of recorded versions.
pub fn seed_all_forced(db: &Database) -> Result<Vec<SeedReport>> {
    apply_all(db, true)
}

fn apply_all(db: &Database, force: bool) -> Result<Vec<SeedReport>> {
    DATASETS
        .iter()
        .enumerate()
        .map(|(i, dataset)| apply(db, dataset, i as i64 + 1, force))
        .collect()
}

/// Apply one dataset by source name (case-insensitive).
pub fn seed_source(db: &Database, source: &str, force: bool) -> Result<SeedReport> {
    let (position, dataset) = DATASETS
        .iter()
        .enumerate()
        .find(|(_, d)| d.source.eq_ignore_ascii_case(source))
        .ok_or_else(|| SeedError::UnknownSource(source.to_string()))?;
    apply(db, dataset, position as i64 + 1, force)
}

/// Reapply one dataset regardless of its recorded version.
pub fn reseed(db: &Database, source: &str) -> Result<SeedReport> {
    seed_source(db, source, true)
}

/// Drop every resource and marker, then apply all datasets from scratch.
pub fn reset(db: &Database) -> Result<Vec<SeedReport>> {
    let removed = db.transaction(|conn| {
        let removed = db::delete_resources_in(conn, &DeleteFilter::All)?;
        db::clear_seed_runs_in(conn)?;
        Ok(removed)
    })?;
    tracing::info!("Reset catalog, removed {} resources", removed);

    seed_all(db)
}

/// Apply `dataset` with its root resources placed at `root_order`.
pub fn apply(db: &Database, dataset: &Dataset, root_order: i64, force: bool) -> Result<SeedReport> {
    let report = db.transaction(|conn| {
        let existing = db::get_seed_run_in(conn, dataset.source)?;
        if let Some(run) = existing.filter(|r| !force && r.version >= dataset.version) {
            return Ok(SeedReport {
                source: dataset.source.to_string(),
                version: run.version,
                status: SeedStatus::UpToDate,
                node_count: run.node_count,
                removed: 0,
            });
        }

        let removed =
            db::delete_resources_in(conn, &DeleteFilter::Source(dataset.source.to_string()))?;

        let mut inserted = 0;
        for (i, node) in dataset.nodes().iter().enumerate() {
            inserted += insert_tree(conn, dataset.source, None, node, root_order + i as i64)?;
        }

        db::record_seed_run_in(
            conn,
            &SeedRun {
                source: dataset.source.to_string(),
                version: dataset.version,
                node_count: inserted,
                applied_at: Utc::now(),
            },
        )?;

        Ok(SeedReport {
            source: dataset.source.to_string(),
            version: dataset.version,
            status: SeedStatus::Applied,
            node_count: inserted,
            removed,
        })
    })?;

    match report.status {
        SeedStatus::Applied => tracing::info!(
            "Seeded {} v{}: {} resources ({} removed)",
            report.source,
            report.version,
            report.node_count,
            report.removed
        ),
        SeedStatus::UpToDate => tracing::debug!(
            "Seed {} already at v{}, skipping",
            report.source,
            report.version
        ),
    }

    Ok(report)
}

fn insert_tree(
    conn: &Connection,
    source: &str,
    parent_id: Option<Uuid>,
    node: &SeedNode,
    order: i64,
) -> Result<usize> {
    let resource = db::insert_resource_in(
        conn,
        NewResource {
            parent_id,
            name: node.name.clone(),
            kind: node.kind,
            url: node.url.clone(),
            image_url: node.image_url.clone(),
            order,
            source: Some(source.to_string()),
        },
    )?;

    let mut inserted = 1;
    for (i, child) in node.children.iter().enumerate() {
        inserted += insert_tree(conn, source, Some(resource.id), child, i as i64 + 1)?;
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_sources_are_unique() {
        for (i, a) in DATASETS.iter().enumerate() {
            for b in &DATASETS[i + 1..] {
                assert_ne!(a.source, b.source);
            }
        }
    }

    #[test]
    fn every_dataset_has_a_single_root_named_after_its_source() {
        for dataset in DATASETS {
            let nodes = dataset.nodes();
            assert_eq!(nodes.len(), 1, "{}", dataset.source);
            assert_eq!(nodes[0].name, dataset.source);
            assert_eq!(nodes[0].kind, ResourceKind::Category);
        }
    }

    #[test]
    fn find_dataset_ignores_case() {
        assert_eq!(
            find_dataset("khan academy").map(|d| d.source),
            Some(khan::SOURCE)
        );
        assert!(find_dataset("Wikipedia").is_none());
    }

    #[test]
    fn simulation_builder_keeps_leaf_fields() {
        let sim = SeedNode::simulation("Pendulum Lab", "https://x/p.html", "https://x/p.png");
        assert_eq!(sim.kind, ResourceKind::Simulation);
        assert_eq!(sim.url.as_deref(), Some("https://x/p.html"));
        assert_eq!(sim.image_url.as_deref(), Some("https://x/p.png"));
        assert!(sim.children.is_empty());
    }
}
