mod schema;
mod validate;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior};
use uuid::Uuid;

use crate::models::*;

pub use validate::{validate_shape, ValidationError};

/// Default cap on search hits.
pub const DEFAULT_SEARCH_LIMIT: usize = 50;
/// Upper bound accepted from callers.
pub const MAX_SEARCH_LIMIT: usize = 200;

const RESOURCE_COLUMNS: &str =
    "r.id, r.parent_id, r.name, r.kind, r.url, r.image_url, r.sort_order, r.source, r.created_at";

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    /// Run `f` inside one immediate transaction while holding the connection lock.
    ///
    /// Other callers on this handle block until it commits or rolls back, and
    /// other processes are held off by SQLite's write lock.
    pub fn transaction<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    // ============================================================
    // Resource reads
    // ============================================================

    pub fn get_resource(&self, id: Uuid) -> Result<Option<ResourceNode>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        get_resource_in(&conn, id)
    }

    pub fn get_root_resources(&self) -> Result<Vec<ResourceNode>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources r
             WHERE r.parent_id IS NULL ORDER BY r.sort_order, r.seq"
        ))?;

        let resources = stmt
            .query_map([], row_to_resource)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(resources)
    }

    pub fn get_children(&self, parent_id: Uuid) -> Result<Vec<ResourceNode>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources r
             WHERE r.parent_id = ? ORDER BY r.sort_order, r.seq"
        ))?;

        let resources = stmt
            .query_map([parent_id.to_string()], row_to_resource)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(resources)
    }

    /// Children of `parent_id`, or the roots when it is `None`, ascending by order.
    pub fn list_children(&self, parent_id: Option<Uuid>) -> Result<Vec<ResourceNode>> {
        match parent_id {
            Some(id) => self.get_children(id),
            None => self.get_root_resources(),
        }
    }

    /// Relevance search over resource names.
    ///
    /// Every word of `term` must prefix-match a word of the name. Results are
    /// ranked by the full-text index, best first. A term with no searchable
    /// words returns nothing.
    pub fn search_resources(&self, term: &str, limit: usize) -> Result<Vec<ResourceNode>> {
        let Some(query) = fts_query(term) else {
            return Ok(Vec::new());
        };
        let limit = limit.clamp(1, MAX_SEARCH_LIMIT) as i64;

        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources_fts
             JOIN resources r ON r.seq = resources_fts.rowid
             WHERE resources_fts MATCH ?1
             ORDER BY resources_fts.rank, r.seq
             LIMIT ?2"
        ))?;

        let resources = stmt
            .query_map((query, limit), row_to_resource)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(resources)
    }

    pub fn count_resources(&self, source: Option<&str>) -> Result<usize> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let count: i64 = match source {
            Some(source) => conn.query_row(
                "SELECT COUNT(*) FROM resources WHERE source = ?",
                [source],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM resources", [], |row| row.get(0))?,
        };
        Ok(count as usize)
    }

    // ============================================================
    // Resource writes
    // ============================================================

    pub fn insert_resource(&self, input: NewResource) -> Result<ResourceNode> {
        let conn = self.conn.lock().expect("database lock poisoned");
        insert_resource_in(&conn, input)
    }

    /// Remove every resource matching `filter`, returning how many matched.
    pub fn delete_resources(&self, filter: &DeleteFilter) -> Result<usize> {
        let conn = self.conn.lock().expect("database lock poisoned");
        delete_resources_in(&conn, filter)
    }

    // ============================================================
    // Seed markers
    // ============================================================

    pub fn get_seed_runs(&self) -> Result<Vec<SeedRun>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT source, version, node_count, applied_at FROM seed_runs ORDER BY source",
        )?;

        let runs = stmt
            .query_map([], row_to_seed_run)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(runs)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

/// Platform data directory location of the catalog database.
pub fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "physics-catalog")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("catalog.db"))
}

// ============================================================
// Connection-level operations, shared by the locked methods above
// and by callers running inside `Database::transaction`.
// ============================================================

pub fn get_resource_in(conn: &Connection, id: Uuid) -> Result<Option<ResourceNode>> {
    let resource = conn
        .query_row(
            &format!("SELECT {RESOURCE_COLUMNS} FROM resources r WHERE r.id = ?"),
            [id.to_string()],
            row_to_resource,
        )
        .optional()?;
    Ok(resource)
}

pub fn insert_resource_in(conn: &Connection, input: NewResource) -> Result<ResourceNode> {
    validate_shape(&input)?;

    if let Some(parent_id) = input.parent_id {
        let parent = get_resource_in(conn, parent_id)?
            .ok_or(ValidationError::ParentNotFound(parent_id))?;
        if parent.kind != ResourceKind::Category {
            return Err(ValidationError::ParentNotCategory(parent_id).into());
        }
    }

    let id = Uuid::new_v4();
    let now = Utc::now();

    conn.execute(
        "INSERT INTO resources (id, parent_id, name, kind, url, image_url, sort_order, source, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            id.to_string(),
            input.parent_id.map(|u| u.to_string()),
            &input.name,
            input.kind.as_str(),
            &input.url,
            &input.image_url,
            input.order,
            &input.source,
            now.to_rfc3339(),
        ),
    )
    .with_context(|| format!("Failed to insert resource '{}'", input.name))?;

    Ok(ResourceNode {
        id,
        parent_id: input.parent_id,
        name: input.name,
        kind: input.kind,
        url: input.url,
        image_url: input.image_url,
        order: input.order,
        source: input.source,
        created_at: now,
    })
}

/// Rows removed by cascade are not reported by SQLite, so the matched rows and
/// their descendants are counted first.
pub fn delete_resources_in(conn: &Connection, filter: &DeleteFilter) -> Result<usize> {
    let matched: i64 = match filter {
        DeleteFilter::All => {
            let n = conn.query_row("SELECT COUNT(*) FROM resources", [], |row| row.get(0))?;
            conn.execute("DELETE FROM resources", [])?;
            n
        }
        DeleteFilter::Source(source) => {
            let n = conn.query_row(
                "WITH RECURSIVE doomed(id) AS (
                     SELECT id FROM resources WHERE source = ?1
                     UNION
                     SELECT r.id FROM resources r JOIN doomed d ON r.parent_id = d.id
                 )
                 SELECT COUNT(*) FROM doomed",
                [source],
                |row| row.get(0),
            )?;
            conn.execute("DELETE FROM resources WHERE source = ?", [source])?;
            n
        }
    };
    Ok(matched as usize)
}

pub fn get_seed_run_in(conn: &Connection, source: &str) -> Result<Option<SeedRun>> {
    let run = conn
        .query_row(
            "SELECT source, version, node_count, applied_at FROM seed_runs WHERE source = ?",
            [source],
            row_to_seed_run,
        )
        .optional()?;
    Ok(run)
}

pub fn record_seed_run_in(conn: &Connection, run: &SeedRun) -> Result<()> {
    conn.execute(
        "INSERT INTO seed_runs (source, version, node_count, applied_at) VALUES (?, ?, ?, ?)
         ON CONFLICT(source) DO UPDATE SET
             version = excluded.version,
             node_count = excluded.node_count,
             applied_at = excluded.applied_at",
        (
            &run.source,
            run.version,
            run.node_count as i64,
            run.applied_at.to_rfc3339(),
        ),
    )?;
    Ok(())
}

pub fn clear_seed_runs_in(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM seed_runs", [])?)
}

fn row_to_resource(row: &Row<'_>) -> rusqlite::Result<ResourceNode> {
    let kind: String = row.get(3)?;
    let kind = ResourceKind::parse(&kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown resource kind '{}'", kind).into(),
        )
    })?;

    Ok(ResourceNode {
        id: parse_uuid(row.get::<_, String>(0)?),
        parent_id: row.get::<_, Option<String>>(1)?.map(parse_uuid),
        name: row.get(2)?,
        kind,
        url: row.get(4)?,
        image_url: row.get(5)?,
        order: row.get(6)?,
        source: row.get(7)?,
        created_at: parse_datetime(row.get::<_, String>(8)?),
    })
}

fn row_to_seed_run(row: &Row<'_>) -> rusqlite::Result<SeedRun> {
    Ok(SeedRun {
        source: row.get(0)?,
        version: row.get(1)?,
        node_count: row.get::<_, i64>(2)? as usize,
        applied_at: parse_datetime(row.get::<_, String>(3)?),
    })
}

/// Turn free text into an FTS5 prefix query: `"rot"* "motion"*`.
///
/// Only alphanumeric runs survive, so the query can never contain FTS syntax.
fn fts_query(term: &str) -> Option<String> {
    let tokens: Vec<String> = term
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| format!("\"{}\"*", t.to_lowercase()))
        .collect();

    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
