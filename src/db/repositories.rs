use anyhow::{Context, Result};
use log::info;
use rusqlite::{params, OptionalExtension, Row};

use super::{
    connection::Database,
    helpers::{from_json, parse_datetime, to_json},
    models::LastReading,
};

fn row_to_last_reading(row: &Row) -> Result<LastReading> {
    let birth: String = row.get("birth_json")?;
    let chart: String = row.get("chart_json")?;
    let fortune: String = row.get("fortune_json")?;
    let saved_at: String = row.get("saved_at")?;

    Ok(LastReading {
        id: row.get("id")?,
        birth: from_json(&birth, "birth_json")?,
        chart: from_json(&chart, "chart_json")?,
        fortune: from_json(&fortune, "fortune_json")?,
        saved_at: parse_datetime(&saved_at, "saved_at")?,
    })
}

impl Database {
    /// Replace the cached reading. There is only ever one.
    pub async fn save_last_reading(&self, reading: &LastReading) -> Result<()> {
        let record = reading.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO last_reading (slot, id, birth_json, chart_json, fortune_json, saved_at)
                 VALUES (1, ?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(slot) DO UPDATE SET
                     id = excluded.id,
                     birth_json = excluded.birth_json,
                     chart_json = excluded.chart_json,
                     fortune_json = excluded.fortune_json,
                     saved_at = excluded.saved_at",
                params![
                    record.id,
                    to_json(&record.birth, "birth")?,
                    to_json(&record.chart, "chart")?,
                    to_json(&record.fortune, "fortune")?,
                    record.saved_at.to_rfc3339(),
                ],
            )
            .context("failed to save last reading")?;
            info!("Cached reading {} for {}", record.id, record.birth.date_label());
            Ok(())
        })
        .await
    }

    pub async fn load_last_reading(&self) -> Result<Option<LastReading>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, birth_json, chart_json, fortune_json, saved_at
                 FROM last_reading
                 WHERE slot = 1",
            )?;
            let row = stmt
                .query_row([], |row| Ok(row_to_last_reading(row)))
                .optional()
                .context("failed to load last reading")?;
            row.transpose()
        })
        .await
    }

    /// Returns whether a reading was removed.
    pub async fn clear_last_reading(&self) -> Result<bool> {
        self.execute(|conn| {
            let removed = conn
                .execute("DELETE FROM last_reading", [])
                .context("failed to clear last reading")?;
            Ok(removed > 0)
        })
        .await
    }
}
