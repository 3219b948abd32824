use crate::handlers::sheets::invalidate_totals;
use crate::handlers::transactions::TransactionResponse;
use crate::schemas::{
    compute_error, database_error, error_response, money, not_found, validation_error, ApiError, ApiResponse, AppState,
    ErrorResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::NaiveDate;
use compute::default_scheduler;
use compute::ledger::service;
use compute::schedule::{describe_payment, After};
use model::entities::{account, payment};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for creating a payment
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreatePaymentRequest {
    /// Account the money leaves
    pub credit_id: i32,
    /// Account the money arrives in
    pub debit_id: i32,
    /// Default amount of issued transactions
    pub amount: Option<Decimal>,
    /// One of Daily, Weekly, Monthly, Quarterly, Yearly, Infrequent
    pub frequency: String,
    /// Anchor day: weekday 0-6 (Monday is 0), day of month 1-31,
    /// packed quarter day (1, 15 or 31 plus 31 per month offset) or day of year 1-366
    pub day: Option<i32>,
    #[validate(length(max = 200))]
    pub description: Option<String>,
    pub active: Option<bool>,
}

/// Request body for updating a payment
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdatePaymentRequest {
    pub credit_id: Option<i32>,
    pub debit_id: Option<i32>,
    pub amount: Option<Decimal>,
    pub frequency: Option<String>,
    pub day: Option<i32>,
    #[validate(length(max = 200))]
    pub description: Option<String>,
    pub active: Option<bool>,
}

/// Query parameters for the next payment date
#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct NextDateQuery {
    /// Reference date `YYYY-MM-DD`, defaults to today
    pub after: Option<String>,
}

/// Request body for issuing a transaction from a payment
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct IssuePaymentRequest {
    pub sheet_id: i32,
    /// Defaults to the next payment date after the sheet date
    pub date: Option<NaiveDate>,
    /// Defaults to the payment amount
    pub amount: Option<Decimal>,
    #[validate(length(max = 500))]
    pub memo: Option<String>,
}

/// Payment response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub id: i32,
    pub credit_id: i32,
    pub debit_id: i32,
    pub amount: Option<Decimal>,
    pub frequency: String,
    pub day: Option<i32>,
    pub description: Option<String>,
    pub active: bool,
    /// Description, or a label built from amount, frequency and accounts
    pub label: String,
}

impl PaymentResponse {
    fn new(model: payment::Model, accounts: &HashMap<i32, account::Model>) -> Self {
        let name = |id: i32| accounts.get(&id).map(|a| a.name.as_str()).unwrap_or("?");
        let currency = accounts.get(&model.credit_id).map(|a| a.currency.as_str()).unwrap_or("USD");
        Self {
            label: describe_payment(&model, name(model.credit_id), name(model.debit_id), currency),
            id: model.id,
            credit_id: model.credit_id,
            debit_id: model.debit_id,
            amount: model.amount.map(money),
            frequency: model.frequency.to_string(),
            day: model.day,
            description: model.description,
            active: model.active,
        }
    }
}

/// Next payment date response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NextDateResponse {
    pub payment_id: i32,
    pub after: NaiveDate,
    pub next_date: NaiveDate,
}

fn parse_frequency(value: &str) -> Result<payment::Frequency, ApiError> {
    payment::Frequency::from_str(value).map_err(|e| {
        warn!("{}", e);
        validation_error(e)
    })
}

/// Rejects a day that does not fit the frequency. Infrequent payments have no schedule to check.
fn check_schedule(model: &payment::Model) -> Result<(), ApiError> {
    if model.frequency == payment::Frequency::Infrequent {
        return Ok(());
    }
    match default_scheduler(None).has_next_payment_date(model, After::Today) {
        (true, _) => Ok(()),
        (false, message) => {
            let message = message.unwrap_or_else(|| "invalid payment schedule".to_string());
            warn!("Rejected payment schedule: {}", message);
            Err(error_response(StatusCode::BAD_REQUEST, "INVALID_PAYMENT_SCHEDULE", message))
        }
    }
}

async fn load_accounts(state: &AppState, ids: &[i32]) -> Result<HashMap<i32, account::Model>, ApiError> {
    let accounts = account::Entity::find()
        .filter(account::Column::Id.is_in(ids.iter().copied()))
        .all(&state.db)
        .await
        .map_err(|e| database_error("Failed to retrieve payment accounts", e))?;
    Ok(accounts.into_iter().map(|a| (a.id, a)).collect())
}

async fn ensure_accounts(state: &AppState, credit_id: i32, debit_id: i32) -> Result<HashMap<i32, account::Model>, ApiError> {
    service::ensure_distinct_accounts(credit_id, debit_id)
        .map_err(|e| compute_error("Invalid payment accounts", e))?;
    let accounts = load_accounts(state, &[credit_id, debit_id]).await?;
    for id in [credit_id, debit_id] {
        if !accounts.contains_key(&id) {
            warn!("Account {} not found", id);
            return Err(validation_error(format!("Account with ID {} not found", id)));
        }
    }
    Ok(accounts)
}

async fn find_payment(state: &AppState, payment_id: i32) -> Result<payment::Model, ApiError> {
    match payment::Entity::find_by_id(payment_id).one(&state.db).await {
        Ok(Some(model)) => Ok(model),
        Ok(None) => {
            warn!("Payment with ID {} not found", payment_id);
            Err(not_found(format!("Payment with ID {} not found", payment_id)))
        }
        Err(e) => Err(database_error("Failed to retrieve payment", e)),
    }
}

/// Create a new payment
#[utoipa::path(
    post,
    path = "/api/v1/payments",
    tag = "payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment created successfully", body = ApiResponse<PaymentResponse>),
        (status = 400, description = "Invalid request or a day that does not fit the frequency", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_payment(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreatePaymentRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_payment function");

    let frequency = parse_frequency(&request.frequency)?;
    let draft = payment::Model {
        id: 0,
        credit_id: request.credit_id,
        debit_id: request.debit_id,
        amount: request.amount,
        frequency,
        day: request.day,
        description: request.description,
        active: request.active.unwrap_or(true),
    };
    check_schedule(&draft)?;
    let accounts = ensure_accounts(&state, draft.credit_id, draft.debit_id).await?;

    let model = payment::ActiveModel {
        credit_id: Set(draft.credit_id),
        debit_id: Set(draft.debit_id),
        amount: Set(draft.amount),
        frequency: Set(draft.frequency),
        day: Set(draft.day),
        description: Set(draft.description),
        active: Set(draft.active),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| database_error("Failed to create payment", e))?;

    info!("Payment created with ID: {}, frequency: {}", model.id, model.frequency);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(PaymentResponse::new(model, &accounts), "Payment created successfully")),
    ))
}

/// Get all payments
#[utoipa::path(
    get,
    path = "/api/v1/payments",
    tag = "payments",
    responses(
        (status = 200, description = "Payments retrieved successfully", body = ApiResponse<Vec<PaymentResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_payments(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PaymentResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let payments = payment::Entity::find()
        .order_by_asc(payment::Column::Id)
        .all(&state.db)
        .await
        .map_err(|e| database_error("Failed to retrieve payments", e))?;

    let ids: Vec<i32> = payments.iter().flat_map(|p| [p.credit_id, p.debit_id]).collect();
    let accounts = load_accounts(&state, &ids).await?;

    info!("Successfully retrieved {} payments", payments.len());
    Ok(Json(ApiResponse::ok(
        payments.into_iter().map(|p| PaymentResponse::new(p, &accounts)).collect(),
        "Payments retrieved successfully",
    )))
}

/// Get a payment
#[utoipa::path(
    get,
    path = "/api/v1/payments/{payment_id}",
    tag = "payments",
    params(
        ("payment_id" = i32, Path, description = "Payment ID"),
    ),
    responses(
        (status = 200, description = "Payment retrieved successfully", body = ApiResponse<PaymentResponse>),
        (status = 404, description = "Payment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_payment(
    Path(payment_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PaymentResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let model = find_payment(&state, payment_id).await?;
    let accounts = load_accounts(&state, &[model.credit_id, model.debit_id]).await?;
    Ok(Json(ApiResponse::ok(PaymentResponse::new(model, &accounts), "Payment retrieved successfully")))
}

/// Update a payment
#[utoipa::path(
    put,
    path = "/api/v1/payments/{payment_id}",
    tag = "payments",
    params(
        ("payment_id" = i32, Path, description = "Payment ID"),
    ),
    request_body = UpdatePaymentRequest,
    responses(
        (status = 200, description = "Payment updated successfully", body = ApiResponse<PaymentResponse>),
        (status = 400, description = "Invalid request or a day that does not fit the frequency", body = ErrorResponse),
        (status = 404, description = "Payment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_payment(
    Path(payment_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdatePaymentRequest>>,
) -> Result<Json<ApiResponse<PaymentResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let existing = find_payment(&state, payment_id).await?;

    let mut merged = existing.clone();
    if let Some(frequency) = request.frequency.as_deref() {
        merged.frequency = parse_frequency(frequency)?;
    }
    if let Some(day) = request.day {
        merged.day = Some(day);
    }
    merged.credit_id = request.credit_id.unwrap_or(merged.credit_id);
    merged.debit_id = request.debit_id.unwrap_or(merged.debit_id);
    check_schedule(&merged)?;
    let accounts = ensure_accounts(&state, merged.credit_id, merged.debit_id).await?;

    let mut active: payment::ActiveModel = existing.into();
    active.credit_id = Set(merged.credit_id);
    active.debit_id = Set(merged.debit_id);
    active.frequency = Set(merged.frequency);
    active.day = Set(merged.day);
    if let Some(amount) = request.amount {
        active.amount = Set(Some(amount));
    }
    if let Some(description) = request.description {
        active.description = Set(Some(description));
    }
    if let Some(flag) = request.active {
        active.active = Set(flag);
    }

    let updated = active
        .update(&state.db)
        .await
        .map_err(|e| database_error("Failed to update payment", e))?;

    info!("Payment with ID {} updated successfully", payment_id);
    Ok(Json(ApiResponse::ok(PaymentResponse::new(updated, &accounts), "Payment updated successfully")))
}

/// Delete a payment
#[utoipa::path(
    delete,
    path = "/api/v1/payments/{payment_id}",
    tag = "payments",
    params(
        ("payment_id" = i32, Path, description = "Payment ID"),
    ),
    responses(
        (status = 200, description = "Payment deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Payment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_payment(
    Path(payment_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let result = payment::Entity::delete_by_id(payment_id)
        .exec(&state.db)
        .await
        .map_err(|e| database_error("Failed to delete payment", e))?;

    if result.rows_affected == 0 {
        warn!("Payment with ID {} not found for deletion", payment_id);
        return Err(not_found(format!("Payment with ID {} not found", payment_id)));
    }

    info!("Payment with ID {} deleted successfully", payment_id);
    Ok(Json(ApiResponse::ok(format!("Payment {} deleted", payment_id), "Payment deleted successfully")))
}

/// Get the next due date of a payment
#[utoipa::path(
    get,
    path = "/api/v1/payments/{payment_id}/next-date",
    tag = "payments",
    params(
        ("payment_id" = i32, Path, description = "Payment ID"),
        NextDateQuery,
    ),
    responses(
        (status = 200, description = "Next payment date", body = ApiResponse<NextDateResponse>),
        (status = 400, description = "Invalid reference date, or an infrequent payment", body = ErrorResponse),
        (status = 404, description = "Payment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_next_payment_date(
    Path(payment_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<NextDateQuery>>,
) -> Result<Json<ApiResponse<NextDateResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let model = find_payment(&state, payment_id).await?;
    let scheduler = default_scheduler(None);

    let after = query.after.map(After::from).unwrap_or_default();
    let reference = after
        .resolve(scheduler.today())
        .map_err(|e| compute_error("Invalid reference date", e))?;
    let next_date = scheduler
        .next_payment_date(&model, reference)
        .map_err(|e| compute_error("Failed to compute next payment date", e))?;

    debug!("Next date of payment {} after {} is {}", payment_id, reference, next_date);
    Ok(Json(ApiResponse::ok(
        NextDateResponse { payment_id, after: reference, next_date },
        "Next payment date computed successfully",
    )))
}

/// Issue a transaction from a payment into a sheet
#[utoipa::path(
    post,
    path = "/api/v1/payments/{payment_id}/transactions",
    tag = "payments",
    params(
        ("payment_id" = i32, Path, description = "Payment ID"),
    ),
    request_body = IssuePaymentRequest,
    responses(
        (status = 201, description = "Transaction issued successfully", body = ApiResponse<TransactionResponse>),
        (status = 400, description = "No amount or date could be derived", body = ErrorResponse),
        (status = 404, description = "Payment or sheet not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn issue_payment_transaction(
    Path(payment_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<IssuePaymentRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Issuing transaction from payment {}", payment_id);
    let sheet_id = request.sheet_id;

    let outcome = service::issue_payment(
        &state.db,
        &default_scheduler(None),
        payment_id,
        service::IssuePayment {
            sheet_id,
            date: request.date,
            amount: request.amount,
            memo: request.memo,
        },
    )
    .await
    .map_err(|e| compute_error("Failed to issue payment transaction", e))?;

    invalidate_totals(&state, sheet_id).await;
    info!("Issued transaction {} from payment {}", outcome.transaction.id, payment_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(TransactionResponse::from(outcome), "Transaction issued successfully")),
    ))
}
