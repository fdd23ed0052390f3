//! Report persistence. Append-only.

use geowolf_core::error::GameError;
use geowolf_core::model::Report;

use crate::rows::ReportRow;
use crate::store::SessionStore;

impl SessionStore {
    /// Append a report. Naming a player is optional metadata.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn insert_report(
        &self,
        reporter_id: i64,
        reported_id: Option<i64>,
    ) -> Result<i64, GameError> {
        let result = sqlx::query("INSERT INTO reports (reporter_id, reported_id) VALUES (?, ?)")
            .bind(reporter_id)
            .bind(reported_id)
            .execute(self.pool())
            .await
            .map_err(GameError::storage)?;
        Ok(result.last_insert_rowid())
    }

    /// Report history, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn all_reports(&self) -> Result<Vec<Report>, GameError> {
        let rows = sqlx::query_as::<_, ReportRow>(
            "SELECT r.id, reporter.name AS reporter_name, reported.name AS reported_name,
                    r.timestamp
             FROM reports r
             JOIN players reporter ON r.reporter_id = reporter.id
             LEFT JOIN players reported ON r.reported_id = reported.id
             ORDER BY r.timestamp DESC, r.id DESC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(GameError::storage)?;
        Ok(rows.into_iter().map(Report::from).collect())
    }
}
