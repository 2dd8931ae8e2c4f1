//! Daily CSV export
//!
//! A background loop that sleeps until the configured hour (UTC) and
//! then writes the orders created in the last 24 hours to
//! `<export_dir>/daily_sales_YYYYMMDD.csv`. When there are no orders,
//! no file is written.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::ServiceResult;
use crate::state::AppState;

const CSV_HEADER: &str = "Order ID,Customer Email,Items Count,Total Amount,Status,Created At";

#[derive(Debug, sqlx::FromRow)]
struct ExportRow {
    id: i64,
    customer_email: String,
    items_count: i64,
    total_amount: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

/// Spawn the daily export loop
pub fn spawn_daily_export(state: AppState, export_dir: PathBuf, hour_utc: u32) {
    tokio::spawn(async move {
        loop {
            let wait = duration_until_hour(Utc::now(), hour_utc);
            tokio::time::sleep(wait).await;

            match export_last_24h(&state.pool, &export_dir, Utc::now()).await {
                Ok(Some(path)) => {
                    tracing::info!(path = %path.display(), "Daily orders export written");
                }
                Ok(None) => {
                    tracing::info!("No orders in the last 24 hours, export skipped");
                }
                Err(e) => {
                    tracing::warn!(error = ?e, "Daily orders export failed");
                }
            }
        }
    });
}

/// Time remaining until the next occurrence of `hour:00` UTC
fn duration_until_hour(now: DateTime<Utc>, hour: u32) -> std::time::Duration {
    let run_time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
    let today_run = now.date_naive().and_time(run_time).and_utc();
    let next = if today_run > now {
        today_run
    } else {
        today_run + Duration::days(1)
    };
    (next - now).to_std().unwrap_or_default()
}

/// Export orders created in the last 24 hours; returns the written path,
/// or None when there was nothing to export
pub async fn export_last_24h(
    pool: &PgPool,
    export_dir: &Path,
    now: DateTime<Utc>,
) -> ServiceResult<Option<PathBuf>> {
    let since = now - Duration::hours(24);

    let rows: Vec<ExportRow> = sqlx::query_as(
        r#"
        SELECT o.id, c.email AS customer_email,
               COUNT(i.id) AS items_count,
               COALESCE(SUM(i.unit_price * i.quantity), 0) AS total_amount,
               o.status, o.created_at
        FROM orders o
        JOIN customers c ON c.id = o.customer_id
        LEFT JOIN order_items i ON i.order_id = o.id
        WHERE o.created_at >= $1 AND o.created_at <= $2
        GROUP BY o.id, c.email
        ORDER BY o.created_at
        "#,
    )
    .bind(since)
    .bind(now)
    .fetch_all(pool)
    .await?;

    if rows.is_empty() {
        return Ok(None);
    }

    let contents = render_csv(&rows);
    let path = export_dir.join(format!("daily_sales_{}.csv", now.format("%Y%m%d")));
    tokio::fs::write(&path, contents)
        .await
        .map_err(|e| crate::error::ServiceError::Db(e.into()))?;
    Ok(Some(path))
}

fn render_csv(rows: &[ExportRow]) -> String {
    let mut out = String::with_capacity(64 * (rows.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');
    for row in rows {
        let fields = [
            row.id.to_string(),
            row.customer_email.clone(),
            row.items_count.to_string(),
            row.total_amount.to_string(),
            row.status.clone(),
            row.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ];
        let line: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

/// Quote a CSV field when it contains a comma, quote or newline
fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_render_csv_shape() {
        let rows = vec![ExportRow {
            id: 3,
            customer_email: "jane@example.com".to_string(),
            items_count: 2,
            total_amount: "250".parse().unwrap(),
            status: "PENDING".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap(),
        }];
        let csv = render_csv(&rows);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Order ID,Customer Email,Items Count,Total Amount,Status,Created At")
        );
        assert_eq!(
            lines.next(),
            Some("3,jane@example.com,2,250,PENDING,2025-06-01 12:30:00")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_duration_until_hour() {
        let before = Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0).unwrap();
        assert_eq!(
            duration_until_hour(before, 22),
            std::time::Duration::from_secs(2 * 3600)
        );

        // already past today's run, schedule for tomorrow
        let after = Utc.with_ymd_and_hms(2025, 6, 1, 23, 0, 0).unwrap();
        assert_eq!(
            duration_until_hour(after, 22),
            std::time::Duration::from_secs(23 * 3600)
        );
    }

    #[tokio::test]
    async fn test_written_file_lands_in_export_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daily_sales_20250601.csv");
        tokio::fs::write(&path, render_csv(&[])).await.unwrap();
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(contents.starts_with("Order ID,"));
    }
}
