use crate::handlers::sheets::clear_totals;
use crate::schemas::{database_error, not_found, validation_error, ApiError, ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::NaiveDate;
use model::entities::{account, company};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for creating a new account
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateAccountRequest {
    /// Account name, unique within its company
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// One of Cash, Credit, Loan, Investment, Insurance, Billing, Charitable
    pub account_type: String,
    /// Owning company ID
    pub company_id: i32,
    /// Account number at the company
    #[validate(length(max = 50))]
    pub number: Option<String>,
    pub active: Option<bool>,
    /// Leave the account out of sheet totals
    pub exclude: Option<bool>,
    pub display_order: Option<i32>,
    pub opened_on: Option<NaiveDate>,
    pub closed_on: Option<NaiveDate>,
    /// ISO 4217 currency code (default: "USD")
    pub currency: Option<String>,
}

/// Request body for updating an account
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateAccountRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub account_type: Option<String>,
    pub company_id: Option<i32>,
    #[validate(length(max = 50))]
    pub number: Option<String>,
    pub active: Option<bool>,
    pub exclude: Option<bool>,
    pub display_order: Option<i32>,
    pub opened_on: Option<NaiveDate>,
    pub closed_on: Option<NaiveDate>,
    pub currency: Option<String>,
}

/// Query parameters for listing accounts
#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct AccountQuery {
    /// Only accounts of this company
    pub company_id: Option<i32>,
    /// Only active (true) or inactive (false) accounts
    pub active: Option<bool>,
}

/// Account response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub id: i32,
    pub name: String,
    pub account_type: String,
    /// Human readable account type
    pub account_type_label: String,
    pub company_id: i32,
    pub number: Option<String>,
    pub active: bool,
    pub exclude: bool,
    pub display_order: Option<i32>,
    pub opened_on: Option<NaiveDate>,
    pub closed_on: Option<NaiveDate>,
    pub currency: String,
    pub is_asset: bool,
    pub is_liability: bool,
}

impl From<account::Model> for AccountResponse {
    fn from(model: account::Model) -> Self {
        Self {
            account_type: model.account_type.to_string(),
            account_type_label: model.account_type.label().to_string(),
            is_asset: model.is_asset(),
            is_liability: model.is_liability(),
            id: model.id,
            name: model.name,
            company_id: model.company_id,
            number: model.number,
            active: model.active,
            exclude: model.exclude,
            display_order: model.display_order,
            opened_on: model.opened_on,
            closed_on: model.closed_on,
            currency: model.currency,
        }
    }
}

fn parse_account_type(value: &str) -> Result<account::AccountType, ApiError> {
    account::AccountType::from_str(value).map_err(|e| {
        warn!("{}", e);
        validation_error(e)
    })
}

fn parse_currency(value: &str) -> Result<String, ApiError> {
    let code = value.trim().to_uppercase();
    if common::is_known_currency(&code) {
        Ok(code)
    } else {
        warn!("Unknown currency code: {}", value);
        Err(validation_error(format!("Unknown ISO 4217 currency code: {}", value)))
    }
}

fn check_dates(opened_on: Option<NaiveDate>, closed_on: Option<NaiveDate>) -> Result<(), ApiError> {
    match (opened_on, closed_on) {
        (Some(opened), Some(closed)) if closed < opened => Err(validation_error(format!(
            "Account closed on {} before it was opened on {}",
            closed, opened
        ))),
        _ => Ok(()),
    }
}

async fn ensure_company(state: &AppState, company_id: i32) -> Result<(), ApiError> {
    match company::Entity::find_by_id(company_id).one(&state.db).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => {
            warn!("Company {} not found", company_id);
            Err(validation_error(format!("Company with ID {} not found", company_id)))
        }
        Err(e) => Err(database_error("Failed to validate company", e)),
    }
}

pub(crate) async fn find_account(state: &AppState, account_id: i32) -> Result<account::Model, ApiError> {
    match account::Entity::find_by_id(account_id).one(&state.db).await {
        Ok(Some(model)) => Ok(model),
        Ok(None) => {
            warn!("Account with ID {} not found", account_id);
            Err(not_found(format!("Account with ID {} not found", account_id)))
        }
        Err(e) => Err(database_error("Failed to retrieve account", e)),
    }
}

/// Create a new account
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    tag = "accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account created successfully", body = ApiResponse<AccountResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Account name already used at this company", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_account(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateAccountRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<AccountResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_account function");
    debug!("Creating account with name: {}, type: {}, company_id: {}",
           request.name, request.account_type, request.company_id);

    let account_type = parse_account_type(&request.account_type)?;
    let currency = parse_currency(request.currency.as_deref().unwrap_or("USD"))?;
    check_dates(request.opened_on, request.closed_on)?;
    ensure_company(&state, request.company_id).await?;

    let new_account = account::ActiveModel {
        account_type: Set(account_type),
        name: Set(request.name),
        company_id: Set(request.company_id),
        number: Set(request.number),
        active: Set(request.active.unwrap_or(true)),
        exclude: Set(request.exclude.unwrap_or(false)),
        display_order: Set(request.display_order),
        opened_on: Set(request.opened_on),
        closed_on: Set(request.closed_on),
        currency: Set(currency),
        ..Default::default()
    };

    trace!("Attempting to insert new account into database");
    let model = new_account
        .insert(&state.db)
        .await
        .map_err(|e| database_error("Failed to create account", e))?;

    info!("Account created successfully with ID: {}, name: {}", model.id, model.name);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(AccountResponse::from(model), "Account created successfully")),
    ))
}

/// Get all accounts
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    tag = "accounts",
    params(AccountQuery),
    responses(
        (status = 200, description = "Accounts retrieved successfully", body = ApiResponse<Vec<AccountResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_accounts(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<AccountQuery>>,
) -> Result<Json<ApiResponse<Vec<AccountResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_accounts function");

    let mut select = account::Entity::find();
    if let Some(company_id) = query.company_id {
        select = select.filter(account::Column::CompanyId.eq(company_id));
    }
    if let Some(active) = query.active {
        select = select.filter(account::Column::Active.eq(active));
    }

    let accounts = select
        .order_by_asc(account::Column::DisplayOrder)
        .order_by_asc(account::Column::Name)
        .all(&state.db)
        .await
        .map_err(|e| database_error("Failed to retrieve accounts", e))?;

    info!("Successfully retrieved {} accounts", accounts.len());
    Ok(Json(ApiResponse::ok(
        accounts.into_iter().map(AccountResponse::from).collect(),
        "Accounts retrieved successfully",
    )))
}

/// Get a specific account by ID
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_id}",
    tag = "accounts",
    params(
        ("account_id" = i32, Path, description = "Account ID"),
    ),
    responses(
        (status = 200, description = "Account retrieved successfully", body = ApiResponse<AccountResponse>),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_account(
    Path(account_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AccountResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_account function for account_id: {}", account_id);
    let model = find_account(&state, account_id).await?;
    Ok(Json(ApiResponse::ok(AccountResponse::from(model), "Account retrieved successfully")))
}

/// Update an account
#[utoipa::path(
    put,
    path = "/api/v1/accounts/{account_id}",
    tag = "accounts",
    params(
        ("account_id" = i32, Path, description = "Account ID"),
    ),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated successfully", body = ApiResponse<AccountResponse>),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_account(
    Path(account_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateAccountRequest>>,
) -> Result<Json<ApiResponse<AccountResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_account function for account_id: {}", account_id);
    let existing = find_account(&state, account_id).await?;

    check_dates(
        request.opened_on.or(existing.opened_on),
        request.closed_on.or(existing.closed_on),
    )?;

    let mut account_active: account::ActiveModel = existing.into();
    let mut updated_fields = Vec::new();

    if let Some(name) = request.name {
        account_active.name = Set(name);
        updated_fields.push("name");
    }
    if let Some(account_type) = request.account_type {
        account_active.account_type = Set(parse_account_type(&account_type)?);
        updated_fields.push("account_type");
    }
    if let Some(company_id) = request.company_id {
        ensure_company(&state, company_id).await?;
        account_active.company_id = Set(company_id);
        updated_fields.push("company_id");
    }
    if let Some(number) = request.number {
        account_active.number = Set(Some(number));
        updated_fields.push("number");
    }
    if let Some(active) = request.active {
        account_active.active = Set(active);
        updated_fields.push("active");
    }
    if let Some(exclude) = request.exclude {
        account_active.exclude = Set(exclude);
        updated_fields.push("exclude");
    }
    if let Some(display_order) = request.display_order {
        account_active.display_order = Set(Some(display_order));
        updated_fields.push("display_order");
    }
    if let Some(opened_on) = request.opened_on {
        account_active.opened_on = Set(Some(opened_on));
        updated_fields.push("opened_on");
    }
    if let Some(closed_on) = request.closed_on {
        account_active.closed_on = Set(Some(closed_on));
        updated_fields.push("closed_on");
    }
    if let Some(currency) = request.currency {
        account_active.currency = Set(parse_currency(&currency)?);
        updated_fields.push("currency");
    }

    if updated_fields.is_empty() {
        debug!("No fields to update for account ID: {}", account_id);
    } else {
        debug!("Updating fields: {}", updated_fields.join(", "));
    }

    let updated = account_active
        .update(&state.db)
        .await
        .map_err(|e| database_error("Failed to update account", e))?;

    // active and exclude feed every sheet's totals
    clear_totals(&state);
    info!("Account with ID {} updated successfully", account_id);
    Ok(Json(ApiResponse::ok(AccountResponse::from(updated), "Account updated successfully")))
}

/// Delete an account
#[utoipa::path(
    delete,
    path = "/api/v1/accounts/{account_id}",
    tag = "accounts",
    params(
        ("account_id" = i32, Path, description = "Account ID"),
    ),
    responses(
        (status = 200, description = "Account deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_account(
    Path(account_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering delete_account function for account_id: {}", account_id);

    let result = account::Entity::delete_by_id(account_id)
        .exec(&state.db)
        .await
        .map_err(|e| database_error("Failed to delete account", e))?;

    debug!("Delete operation completed. Rows affected: {}", result.rows_affected);
    if result.rows_affected == 0 {
        warn!("Account with ID {} not found for deletion (no rows affected)", account_id);
        return Err(not_found(format!("Account with ID {} not found", account_id)));
    }

    clear_totals(&state);
    info!("Account with ID {} deleted successfully", account_id);
    Ok(Json(ApiResponse::ok(format!("Account {} deleted", account_id), "Account deleted successfully")))
}
