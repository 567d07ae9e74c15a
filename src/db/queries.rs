use crate::db::records::{to_records, MappingRecord, UnmappedRecord};
use crate::error::{GlosaError, Result};
use crate::models::MappingResult;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::{Duration, Instant};

const INSERT_TIMEOUT_SECS: u64 = 30;
const CHUNK_SIZE: usize = 1000;

/// 保存一次匹配结果: 匹配与未匹配在同一事务中写入
pub async fn insert_mapping_result(pool: &PgPool, review_id: i64, result: &MappingResult) -> Result<()> {
    let (mappings, unmapped) = to_records(review_id, result)?;
    tracing::debug!(
        "Persisting review {}: {} mappings, {} unmapped",
        review_id,
        mappings.len(),
        unmapped.len()
    );

    let start = Instant::now();
    let write = async {
        let mut tx = pool.begin().await?;
        for chunk in mappings.chunks(CHUNK_SIZE) {
            insert_mappings(&mut tx, chunk).await?;
        }
        for chunk in unmapped.chunks(CHUNK_SIZE) {
            insert_unmapped(&mut tx, chunk).await?;
        }
        tx.commit().await?;
        Ok::<(), sqlx::Error>(())
    };

    match tokio::time::timeout(Duration::from_secs(INSERT_TIMEOUT_SECS), write).await {
        Ok(Ok(())) => {
            tracing::info!(
                "✓ review {} persisted: {} mappings, {} unmapped, took {:?}",
                review_id,
                mappings.len(),
                unmapped.len(),
                start.elapsed()
            );
            Ok(())
        }
        Ok(Err(e)) => {
            tracing::error!("✗ persisting review {} failed after {:?}: {:?}", review_id, start.elapsed(), e);
            Err(e.into())
        }
        Err(_) => {
            tracing::error!("✗ persisting review {} timed out (>{}s)", review_id, INSERT_TIMEOUT_SECS);
            Err(GlosaError::DatabaseTimeout {
                seconds: INSERT_TIMEOUT_SECS,
            })
        }
    }
}

async fn insert_mappings(tx: &mut Transaction<'_, Postgres>, rows: &[MappingRecord]) -> std::result::Result<(), sqlx::Error> {
    if rows.is_empty() {
        return Ok(());
    }

    let mut query_builder = sqlx::QueryBuilder::new(
        "INSERT INTO t_glosa_document_mapping (
            review_id, invoice_index, value_record_index,
            invoice_number, value_record_number, cove_id,
            match_type, confidence,
            invoice_amount, invoice_currency, value_record_amount,
            created_at
        ) ",
    );

    query_builder.push_values(rows, |mut b, row| {
        b.push_bind(row.review_id)
            .push_bind(row.invoice_index)
            .push_bind(row.value_record_index)
            .push_bind(&row.invoice_number)
            .push_bind(&row.value_record_number)
            .push_bind(&row.cove_id)
            .push_bind(&row.match_type)
            .push_bind(row.confidence)
            .push_bind(row.invoice_amount.clone())
            .push_bind(&row.invoice_currency)
            .push_bind(row.value_record_amount.clone())
            .push_bind(row.created_at);
    });

    let result = query_builder.build().execute(&mut **tx).await?;
    tracing::debug!("INSERT t_glosa_document_mapping: {} rows", result.rows_affected());
    Ok(())
}

async fn insert_unmapped(tx: &mut Transaction<'_, Postgres>, rows: &[UnmappedRecord]) -> std::result::Result<(), sqlx::Error> {
    if rows.is_empty() {
        return Ok(());
    }

    let mut query_builder = sqlx::QueryBuilder::new(
        "INSERT INTO t_glosa_unmapped_document (
            review_id, side, item_index, identifier, reason, created_at
        ) ",
    );

    query_builder.push_values(rows, |mut b, row| {
        b.push_bind(row.review_id)
            .push_bind(&row.side)
            .push_bind(row.item_index)
            .push_bind(&row.identifier)
            .push_bind(&row.reason)
            .push_bind(row.created_at);
    });

    let result = query_builder.build().execute(&mut **tx).await?;
    tracing::debug!("INSERT t_glosa_unmapped_document: {} rows", result.rows_affected());
    Ok(())
}

/// 查询审核的匹配记录（按匹配顺序）
pub async fn list_mappings(pool: &PgPool, review_id: i64) -> Result<Vec<MappingRecord>> {
    let rows = sqlx::query_as::<_, MappingRecord>(
        r#"
        SELECT review_id, invoice_index, value_record_index,
               invoice_number, value_record_number, cove_id,
               match_type, confidence,
               invoice_amount, invoice_currency, value_record_amount,
               created_at
        FROM t_glosa_document_mapping
        WHERE review_id = $1
        ORDER BY id
        "#,
    )
    .bind(review_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// 查询审核的未匹配记录
pub async fn list_unmapped(pool: &PgPool, review_id: i64) -> Result<Vec<UnmappedRecord>> {
    let rows = sqlx::query_as::<_, UnmappedRecord>(
        r#"
        SELECT review_id, side, item_index, identifier, reason, created_at
        FROM t_glosa_unmapped_document
        WHERE review_id = $1
        ORDER BY side, item_index
        "#,
    )
    .bind(review_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
