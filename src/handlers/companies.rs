use crate::handlers::sheets::clear_totals;
use crate::schemas::{database_error, not_found, ApiError, ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use model::entities::company;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a company
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateCompanyRequest {
    /// Company name (must be unique)
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Shorter name used in listings
    #[validate(length(max = 50))]
    pub short_name: Option<String>,
    #[validate(url)]
    pub url: Option<String>,
    /// Whether the company is still in use (default: true)
    pub active: Option<bool>,
}

/// Request body for updating a company
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 50))]
    pub short_name: Option<String>,
    #[validate(url)]
    pub url: Option<String>,
    pub active: Option<bool>,
}

/// Company response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CompanyResponse {
    pub id: i32,
    pub name: String,
    pub short_name: Option<String>,
    /// Short name when set, else the name
    pub display_name: String,
    pub url: Option<String>,
    pub active: bool,
}

impl From<company::Model> for CompanyResponse {
    fn from(model: company::Model) -> Self {
        Self {
            display_name: model.display_name().to_string(),
            id: model.id,
            name: model.name,
            short_name: model.short_name,
            url: model.url,
            active: model.active,
        }
    }
}

async fn find_company(state: &AppState, company_id: i32) -> Result<company::Model, ApiError> {
    match company::Entity::find_by_id(company_id).one(&state.db).await {
        Ok(Some(model)) => Ok(model),
        Ok(None) => {
            warn!("Company with ID {} not found", company_id);
            Err(not_found(format!("Company with ID {} not found", company_id)))
        }
        Err(e) => Err(database_error("Failed to retrieve company", e)),
    }
}

/// Create a new company
#[utoipa::path(
    post,
    path = "/api/v1/companies",
    tag = "companies",
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company created successfully", body = ApiResponse<CompanyResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Company name already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_company(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateCompanyRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<CompanyResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_company function");
    debug!("Creating company with name: {}", request.name);

    let new_company = company::ActiveModel {
        name: Set(request.name),
        short_name: Set(request.short_name),
        url: Set(request.url),
        active: Set(request.active.unwrap_or(true)),
        ..Default::default()
    };

    let model = new_company
        .insert(&state.db)
        .await
        .map_err(|e| database_error("Failed to create company", e))?;

    info!("Company created successfully with ID: {}, name: {}", model.id, model.name);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(CompanyResponse::from(model), "Company created successfully")),
    ))
}

/// Get all companies
#[utoipa::path(
    get,
    path = "/api/v1/companies",
    tag = "companies",
    responses(
        (status = 200, description = "Companies retrieved successfully", body = ApiResponse<Vec<CompanyResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_companies(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CompanyResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_companies function");

    let companies = company::Entity::find()
        .order_by_asc(company::Column::Name)
        .all(&state.db)
        .await
        .map_err(|e| database_error("Failed to retrieve companies", e))?;

    info!("Successfully retrieved {} companies", companies.len());
    Ok(Json(ApiResponse::ok(
        companies.into_iter().map(CompanyResponse::from).collect(),
        "Companies retrieved successfully",
    )))
}

/// Get a specific company by ID
#[utoipa::path(
    get,
    path = "/api/v1/companies/{company_id}",
    tag = "companies",
    params(
        ("company_id" = i32, Path, description = "Company ID"),
    ),
    responses(
        (status = 200, description = "Company retrieved successfully", body = ApiResponse<CompanyResponse>),
        (status = 404, description = "Company not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_company(
    Path(company_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CompanyResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let model = find_company(&state, company_id).await?;
    Ok(Json(ApiResponse::ok(CompanyResponse::from(model), "Company retrieved successfully")))
}

/// Update a company
#[utoipa::path(
    put,
    path = "/api/v1/companies/{company_id}",
    tag = "companies",
    params(
        ("company_id" = i32, Path, description = "Company ID"),
    ),
    request_body = UpdateCompanyRequest,
    responses(
        (status = 200, description = "Company updated successfully", body = ApiResponse<CompanyResponse>),
        (status = 404, description = "Company not found", body = ErrorResponse),
        (status = 409, description = "Company name already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_company(
    Path(company_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateCompanyRequest>>,
) -> Result<Json<ApiResponse<CompanyResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_company function for company_id: {}", company_id);
    let existing = find_company(&state, company_id).await?;

    let mut active: company::ActiveModel = existing.into();
    if let Some(name) = request.name {
        active.name = Set(name);
    }
    if let Some(short_name) = request.short_name {
        active.short_name = Set(Some(short_name));
    }
    if let Some(url) = request.url {
        active.url = Set(Some(url));
    }
    if let Some(flag) = request.active {
        active.active = Set(flag);
    }

    let updated = active
        .update(&state.db)
        .await
        .map_err(|e| database_error("Failed to update company", e))?;

    info!("Company with ID {} updated successfully", company_id);
    Ok(Json(ApiResponse::ok(CompanyResponse::from(updated), "Company updated successfully")))
}

/// Delete a company and its accounts
#[utoipa::path(
    delete,
    path = "/api/v1/companies/{company_id}",
    tag = "companies",
    params(
        ("company_id" = i32, Path, description = "Company ID"),
    ),
    responses(
        (status = 200, description = "Company deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Company not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_company(
    Path(company_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering delete_company function for company_id: {}", company_id);

    let result = company::Entity::delete_by_id(company_id)
        .exec(&state.db)
        .await
        .map_err(|e| database_error("Failed to delete company", e))?;

    debug!("Delete operation completed. Rows affected: {}", result.rows_affected);
    if result.rows_affected == 0 {
        warn!("Company with ID {} not found for deletion", company_id);
        return Err(not_found(format!("Company with ID {} not found", company_id)));
    }

    // Accounts cascade away with their balances
    clear_totals(&state);
    info!("Company with ID {} deleted successfully", company_id);
    Ok(Json(ApiResponse::ok(format!("Company {} deleted", company_id), "Company deleted successfully")))
}
