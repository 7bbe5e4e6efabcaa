//! Daily summary persistence.

use chrono::SecondsFormat;
use sqlx::SqlitePool;
use summary_core::{Summary, SummaryDate, SummaryItem, SummaryPage};

use crate::models::{SummaryItemRow, SummaryRow};
use crate::Result;

/// Replace the summary for a date with `items`, in order.
///
/// Runs in one transaction: the document header is created or touched, the
/// previous items are removed and the new ones inserted. Rebuilding a date
/// never appends.
pub async fn upsert_summary(pool: &SqlitePool, date: &SummaryDate, items: &[SummaryItem]) -> Result<()> {
    let key = date.to_string();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO summaries (date)
        VALUES (?)
        ON CONFLICT(date) DO UPDATE SET
            updated_at = datetime('now')
        "#,
    )
    .bind(&key)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        DELETE FROM summary_items
        WHERE date = ?
        "#,
    )
    .bind(&key)
    .execute(&mut *tx)
    .await?;

    for (position, item) in items.iter().enumerate() {
        let received_at = item
            .received_at
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true));

        sqlx::query(
            r#"
            INSERT INTO summary_items
                (date, position, client_name, problem, solution, status, subject, message_id, received_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&key)
        .bind(position as i64)
        .bind(&item.client_name)
        .bind(&item.problem)
        .bind(&item.solution)
        .bind(item.status.as_str())
        .bind(&item.subject)
        .bind(&item.message_id)
        .bind(received_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::debug!(date = %key, count = items.len(), "Summary replaced");
    Ok(())
}

/// Get the full summary document for a date.
pub async fn get_summary(pool: &SqlitePool, date: &SummaryDate) -> Result<Option<Summary>> {
    let key = date.to_string();

    let header = sqlx::query_as::<_, SummaryRow>(
        r#"
        SELECT date, created_at, updated_at
        FROM summaries
        WHERE date = ?
        "#,
    )
    .bind(&key)
    .fetch_optional(pool)
    .await?;

    let Some(header) = header else {
        return Ok(None);
    };

    let rows = sqlx::query_as::<_, SummaryItemRow>(
        r#"
        SELECT client_name, problem, solution, status, subject, message_id, received_at
        FROM summary_items
        WHERE date = ?
        ORDER BY position ASC
        "#,
    )
    .bind(&key)
    .fetch_all(pool)
    .await?;

    Ok(Some(Summary {
        date: *date,
        items: rows.into_iter().map(SummaryItem::from).collect(),
        created_at: header.created_at,
        updated_at: header.updated_at,
    }))
}

/// Get one page of a date's items and the date's total item count.
///
/// `page` is 1-based. A date without a document, or a page past the end,
/// yields no items.
pub async fn get_summary_page(
    pool: &SqlitePool,
    date: &SummaryDate,
    page: u32,
    page_size: u32,
) -> Result<SummaryPage> {
    let key = date.to_string();
    let offset = i64::from(page.saturating_sub(1)) * i64::from(page_size);

    let (total,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM summary_items
        WHERE date = ?
        "#,
    )
    .bind(&key)
    .fetch_one(pool)
    .await?;

    if total == 0 || offset >= total {
        return Ok(SummaryPage {
            items: Vec::new(),
            total,
        });
    }

    let rows = sqlx::query_as::<_, SummaryItemRow>(
        r#"
        SELECT client_name, problem, solution, status, subject, message_id, received_at
        FROM summary_items
        WHERE date = ?
        ORDER BY position ASC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(&key)
    .bind(i64::from(page_size))
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(SummaryPage {
        items: rows.into_iter().map(SummaryItem::from).collect(),
        total,
    })
}
