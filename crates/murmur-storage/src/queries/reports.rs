// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-filed report CRUD.

use murmur_core::{MurmurError, Report, ReportReason, ReportStatus};
use rusqlite::params;

use crate::database::{Database, format_ts, map_tr_err, parse_ts};

const REPORT_COLUMNS: &str =
    "id, message_id, reporter_id, reason, description, status, created_at, updated_at";

/// Insert a new report.
pub async fn insert_report(db: &Database, report: &Report) -> Result<(), MurmurError> {
    let report = report.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO reports (id, message_id, reporter_id, reason, description,
                     status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    report.id,
                    report.message_id,
                    report.reporter_id,
                    report.reason.as_str(),
                    report.description,
                    report.status.as_str(),
                    format_ts(report.created_at),
                    format_ts(report.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Open reports across all messages, oldest first, for the review UI.
pub async fn list_open(db: &Database, limit: usize) -> Result<Vec<Report>, MurmurError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REPORT_COLUMNS} FROM reports
                 WHERE status = 'open' ORDER BY created_at ASC LIMIT ?1"
            ))?;
            let reports = stmt
                .query_map(params![limit as i64], row_to_report)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(reports)
        })
        .await
        .map_err(map_tr_err)
}

/// Reports filed against one message.
pub async fn reports_for_message(
    db: &Database,
    message_id: &str,
) -> Result<Vec<Report>, MurmurError> {
    let message_id = message_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REPORT_COLUMNS} FROM reports
                 WHERE message_id = ?1 ORDER BY created_at ASC"
            ))?;
            let reports = stmt
                .query_map(params![message_id], row_to_report)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(reports)
        })
        .await
        .map_err(map_tr_err)
}

/// Mark all open reports against a message resolved (called when a human
/// review decision lands). Returns the number resolved.
pub async fn resolve_for_message(db: &Database, message_id: &str) -> Result<usize, MurmurError> {
    let message_id = message_id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE reports
                 SET status = 'resolved', updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE message_id = ?1 AND status = 'open'",
                params![message_id],
            )?;
            Ok(changed)
        })
        .await
        .map_err(map_tr_err)
}

fn ts_err(idx: usize, e: chrono::ParseError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

fn row_to_report(row: &rusqlite::Row) -> rusqlite::Result<Report> {
    let reason: String = row.get(3)?;
    let status: String = row.get(5)?;
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;

    Ok(Report {
        id: row.get(0)?,
        message_id: row.get(1)?,
        reporter_id: row.get(2)?,
        reason: ReportReason::from_str_value(&reason),
        description: row.get(4)?,
        status: ReportStatus::from_str_value(&status),
        created_at: parse_ts(&created_at).map_err(|e| ts_err(6, e))?,
        updated_at: parse_ts(&updated_at).map_err(|e| ts_err(7, e))?,
    })
}
