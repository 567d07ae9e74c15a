use crate::api::AppState;
use crate::db::{self, MappingRecord, UnmappedRecord};
use crate::error::{GlosaError, Result};
use crate::models::{
    AggregatedTotals, DocumentMapping, Invoice, MappingResult, ReviewInput, ReviewReport,
    ValueRecord,
};
use crate::service;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

/// 请求体: 待匹配的发票与COVE
#[derive(Debug, Deserialize)]
pub struct MappingRequest {
    pub invoices: Vec<Invoice>,
    pub value_records: Vec<ValueRecord>,
    /// 配置了数据库时，按该审核ID保存结果
    #[serde(default)]
    pub review_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct MappingResponse {
    pub success: bool,
    pub message: String,
    pub result: Option<MappingResult>,
}

#[derive(Debug, Deserialize)]
pub struct AggregateRequest {
    pub mappings: Vec<DocumentMapping>,
    pub exchange_rate: BigDecimal,
}

#[derive(Debug, Serialize)]
pub struct AggregateResponse {
    pub success: bool,
    pub message: String,
    pub totals: Option<AggregatedTotals>,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub success: bool,
    pub message: String,
    pub review: Option<ReviewReport>,
}

#[derive(Debug, Serialize)]
pub struct StoredMappingResponse {
    pub success: bool,
    pub message: String,
    pub review_id: i64,
    pub mappings: Vec<MappingRecord>,
    pub unmapped: Vec<UnmappedRecord>,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

fn validate_exchange_rate(rate: &BigDecimal) -> Result<()> {
    if *rate <= BigDecimal::zero() {
        return Err(GlosaError::InvalidInput(format!(
            "exchange_rate must be positive, got {}",
            rate
        )));
    }
    Ok(())
}

/// 发票与COVE匹配接口
pub async fn map_documents(
    State(state): State<AppState>,
    Json(req): Json<MappingRequest>,
) -> Response {
    let result = state.matcher.map_documents(&req.invoices, &req.value_records);

    if let Some(review_id) = req.review_id {
        match &state.pool {
            Some(pool) => {
                if let Err(e) = db::insert_mapping_result(pool, review_id, &result).await {
                    let response = MappingResponse {
                        success: false,
                        message: format!("Error: {}", e),
                        result: None,
                    };
                    return (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response();
                }
            }
            None => {
                tracing::warn!("review {} not persisted: no database configured", review_id);
            }
        }
    }

    let response = MappingResponse {
        success: true,
        message: format!(
            "Mapped {} of {} invoices ({} exact, {} partial)",
            result.mappings.len(),
            result.summary.total_invoices,
            result.summary.exact_count,
            result.summary.partial_count
        ),
        result: Some(result),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// 按匹配结果汇总金额
pub async fn aggregate(Json(req): Json<AggregateRequest>) -> Response {
    if let Err(e) = validate_exchange_rate(&req.exchange_rate) {
        tracing::warn!("aggregate rejected: {}", e);
        let response = AggregateResponse {
            success: false,
            message: e.to_string(),
            totals: None,
        };
        return (StatusCode::BAD_REQUEST, Json(response)).into_response();
    }

    let totals = service::aggregate(&req.mappings, &req.exchange_rate);
    let response = AggregateResponse {
        success: true,
        message: format!("Aggregated {} mappings", totals.mapping_count),
        totals: Some(totals),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// 匹配 + 汇总 + 场景判定，一次完成
pub async fn review(State(state): State<AppState>, Json(input): Json<ReviewInput>) -> Response {
    if let Err(e) = validate_exchange_rate(&input.exchange_rate) {
        tracing::warn!("review rejected: {}", e);
        let response = ReviewResponse {
            success: false,
            message: e.to_string(),
            review: None,
        };
        return (StatusCode::BAD_REQUEST, Json(response)).into_response();
    }

    let report = service::review(state.matcher.as_ref(), &input);
    let response = ReviewResponse {
        success: true,
        message: format!(
            "Reviewed {} invoices and {} value records",
            input.invoices.len(),
            input.value_records.len()
        ),
        review: Some(report),
    };
    (StatusCode::OK, Json(response)).into_response()
}

fn stored_mapping_error(status: StatusCode, review_id: i64, message: String) -> Response {
    let response = StoredMappingResponse {
        success: false,
        message,
        review_id,
        mappings: vec![],
        unmapped: vec![],
    };
    (status, Json(response)).into_response()
}

/// 查询已保存的匹配结果
pub async fn get_stored_mapping(State(state): State<AppState>, Path(review_id): Path<i64>) -> Response {
    let Some(pool) = &state.pool else {
        return stored_mapping_error(
            StatusCode::SERVICE_UNAVAILABLE,
            review_id,
            "no database configured".to_string(),
        );
    };

    let stored = async {
        let mappings = db::list_mappings(pool, review_id).await?;
        let unmapped = db::list_unmapped(pool, review_id).await?;
        Ok::<_, GlosaError>((mappings, unmapped))
    };

    match stored.await {
        Ok((mappings, unmapped)) => {
            let response = StoredMappingResponse {
                success: true,
                message: format!(
                    "Review {}: {} mappings, {} unmapped",
                    review_id,
                    mappings.len(),
                    unmapped.len()
                ),
                review_id,
                mappings,
                unmapped,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            tracing::error!("loading review {} failed: {}", review_id, e);
            stored_mapping_error(StatusCode::INTERNAL_SERVER_ERROR, review_id, format!("Error: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_rate_must_be_positive() {
        assert!(validate_exchange_rate(&BigDecimal::from(17)).is_ok());
        for rate in [0, -1] {
            let err = validate_exchange_rate(&BigDecimal::from(rate)).unwrap_err();
            assert!(matches!(err, GlosaError::InvalidInput(_)));
        }
    }
}
