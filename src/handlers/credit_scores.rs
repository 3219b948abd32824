use crate::schemas::{database_error, not_found, validation_error, ApiResponse, AppState, ErrorResponse};
use axum::{extract::State, http::StatusCode, response::Json};
use axum_valid::Valid;
use chrono::NaiveDate;
use compute::credit;
use model::entities::credit_score;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for recording a credit score
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateCreditScoreRequest {
    pub date: NaiveDate,
    #[validate(range(min = 0, max = 850))]
    pub score: i32,
    /// One of Experian, Equifax, TransUnion
    pub source: String,
    /// Whether this is the score to report as the latest (default: true)
    pub preferred: Option<bool>,
    pub memo: Option<String>,
}

/// Credit score response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreditScoreResponse {
    pub id: i32,
    pub date: NaiveDate,
    pub score: i32,
    pub source: String,
    pub preferred: bool,
    pub memo: Option<String>,
    /// Exceptional, Very Good, Good, Fair or Very Poor
    pub rating: String,
    /// Score as a percentage of 850
    pub percent: f64,
}

impl From<credit_score::Model> for CreditScoreResponse {
    fn from(model: credit_score::Model) -> Self {
        Self {
            rating: credit::rating(model.score).to_string(),
            percent: credit::percent(model.score),
            id: model.id,
            date: model.date,
            score: model.score,
            source: format!("{:?}", model.source),
            preferred: model.preferred,
            memo: model.memo,
        }
    }
}

/// Record a credit score
#[utoipa::path(
    post,
    path = "/api/v1/credit-scores",
    tag = "credit-scores",
    request_body = CreateCreditScoreRequest,
    responses(
        (status = 201, description = "Credit score recorded", body = ApiResponse<CreditScoreResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_credit_score(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateCreditScoreRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<CreditScoreResponse>>), (StatusCode, Json<ErrorResponse>)> {
    let source = credit_score::CreditBureau::from_str(&request.source).map_err(|e| {
        warn!("{}", e);
        validation_error(e)
    })?;

    let model = credit_score::ActiveModel {
        date: Set(request.date),
        score: Set(request.score),
        source: Set(source),
        preferred: Set(request.preferred.unwrap_or(true)),
        memo: Set(request.memo),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| database_error("Failed to record credit score", e))?;

    info!("Credit score {} from {:?} recorded with ID {}", model.score, model.source, model.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(CreditScoreResponse::from(model), "Credit score recorded successfully")),
    ))
}

/// Get the credit score history, newest first
#[utoipa::path(
    get,
    path = "/api/v1/credit-scores",
    tag = "credit-scores",
    responses(
        (status = 200, description = "Credit scores retrieved", body = ApiResponse<Vec<CreditScoreResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_credit_scores(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CreditScoreResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let scores = credit_score::Entity::find()
        .order_by_desc(credit_score::Column::Date)
        .order_by_desc(credit_score::Column::Id)
        .all(&state.db)
        .await
        .map_err(|e| database_error("Failed to retrieve credit scores", e))?;

    debug!("Retrieved {} credit scores", scores.len());
    Ok(Json(ApiResponse::ok(
        scores.into_iter().map(CreditScoreResponse::from).collect(),
        "Credit scores retrieved successfully",
    )))
}

/// Get the newest preferred credit score
#[utoipa::path(
    get,
    path = "/api/v1/credit-scores/latest",
    tag = "credit-scores",
    responses(
        (status = 200, description = "Latest credit score", body = ApiResponse<CreditScoreResponse>),
        (status = 404, description = "No preferred credit score recorded", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_latest_credit_score(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CreditScoreResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let latest = credit_score::Entity::find()
        .filter(credit_score::Column::Preferred.eq(true))
        .order_by_desc(credit_score::Column::Date)
        .order_by_desc(credit_score::Column::Id)
        .one(&state.db)
        .await
        .map_err(|e| database_error("Failed to retrieve latest credit score", e))?;

    match latest {
        Some(model) => Ok(Json(ApiResponse::ok(
            CreditScoreResponse::from(model),
            "Latest credit score retrieved successfully",
        ))),
        None => {
            warn!("No preferred credit score recorded");
            Err(not_found("No preferred credit score recorded"))
        }
    }
}
