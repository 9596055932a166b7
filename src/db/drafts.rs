// src/db/drafts.rs

use crate::domain::{DayEntry, TimeOfDay};
use crate::errors::{AdminError, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

/// Drafts older than this are thrown away instead of restored.
pub const DRAFT_MAX_AGE_MS: i64 = 24 * 60 * 60 * 1000;

/// An unsaved sale form, autosaved so a reload doesn't lose it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    /// Set when the form was editing an existing listing.
    #[serde(default)]
    pub object_id: Option<i64>,
    pub address: String,
    pub details: String,
    pub date_start: String,
    pub date_end: String,
    pub multi_day: bool,
    pub days: Vec<DayEntry>,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub saved_at_ms: i64,
}

impl Draft {
    pub fn is_blank(&self) -> bool {
        self.address.trim().is_empty()
            && self.details.trim().is_empty()
            && self.date_start.is_empty()
            && self.date_end.is_empty()
            && self.days.is_empty()
    }
}

pub fn save_draft(conn: &Connection, draft: &Draft) -> Result<()> {
    let payload = serde_json::to_string(draft)
        .map_err(|e| AdminError::Db(format!("Failed to encode draft: {e}")))?;

    conn.execute(
        "INSERT INTO drafts (id, payload, saved_at_ms) VALUES (1, ?1, ?2)
         ON CONFLICT(id) DO UPDATE SET payload = excluded.payload, saved_at_ms = excluded.saved_at_ms",
        params![payload, draft.saved_at_ms],
    )?;
    Ok(())
}

/// The stored draft, unless it is older than [`DRAFT_MAX_AGE_MS`] at `now_ms`
/// (an expired draft is deleted).
pub fn load_draft(conn: &Connection, now_ms: i64) -> Result<Option<Draft>> {
    let row: Option<(String, i64)> = conn
        .query_row(
            "SELECT payload, saved_at_ms FROM drafts WHERE id = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((payload, saved_at_ms)) = row else {
        return Ok(None);
    };

    if now_ms - saved_at_ms > DRAFT_MAX_AGE_MS {
        clear_draft(conn)?;
        return Ok(None);
    }

    match serde_json::from_str(&payload) {
        Ok(draft) => Ok(Some(draft)),
        Err(e) => {
            tracing::warn!("⚠️ Discarding unreadable draft: {e}");
            clear_draft(conn)?;
            Ok(None)
        }
    }
}

pub fn clear_draft(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM drafts", [])?;
    Ok(())
}
