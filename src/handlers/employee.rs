use actix_web::{web, HttpResponse, HttpRequest};
use serde::Deserialize;
use serde_json::json;

use crate::app::AppState;
use crate::directory::EmployeeCard;
use crate::errors::AppError;
use crate::handlers::find_employee;
use crate::models::employee::NewEmployee;
use crate::services::ledger::sync_ledger;
use crate::services::removal::{confirmation_prompt, remove_employee, RemovalError};
use crate::services::search::filter_employees;
use crate::utils::jwt::bearer_claims;
use crate::utils::validation::validate_payload;

#[derive(Deserialize)]
pub struct EmployeeQueryParams {
    search: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    confirm: bool,
}

pub async fn get_employees(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<EmployeeQueryParams>,
) -> Result<HttpResponse, AppError> {
    bearer_claims(&req, &state.jwt_secret)?;

    let employees = state.store.list_employees().await?;
    let search = query.search.as_deref().unwrap_or("");
    let cards: Vec<EmployeeCard> = filter_employees(&employees, search)
        .into_iter()
        .map(EmployeeCard::from)
        .collect();

    Ok(HttpResponse::Ok().json(cards))
}

pub async fn get_employee(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    bearer_claims(&req, &state.jwt_secret)?;

    let employee = find_employee(state.store.as_ref(), &id).await?;
    Ok(HttpResponse::Ok().json(employee))
}

pub async fn create_employee(
    req: HttpRequest,
    state: web::Data<AppState>,
    new_employee: web::Json<NewEmployee>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&new_employee.0)?;
    let claims = bearer_claims(&req, &state.jwt_secret)?;

    let employee = state.store.create_employee(new_employee.into_inner()).await?;
    log::info!("Employee {} created by {}", employee.id, claims.sub);

    Ok(HttpResponse::Created().json(employee))
}

pub async fn update_employee(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
    updates: web::Json<NewEmployee>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&updates.0)?;
    let claims = bearer_claims(&req, &state.jwt_secret)?;

    let before = find_employee(state.store.as_ref(), &id).await?;
    let after = state
        .store
        .update_employee(before.id, updates.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;
    log::info!("Employee {} updated by {}", after.id, claims.sub);

    // the edit is already committed; only the ledger move is reported as failed
    if let Err(err) = sync_ledger(state.store.as_ref(), &before, &after).await {
        log::error!("Failed to move ledger of employee {}: {}", after.id, err);
        return Err(AppError::InternalServerError(
            "Employee updated, but the ledger could not be moved".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(after))
}

pub async fn delete_employee(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
    params: web::Query<DeleteParams>,
) -> Result<HttpResponse, AppError> {
    let claims = bearer_claims(&req, &state.jwt_secret)?;

    let employee = find_employee(state.store.as_ref(), &id).await?;
    if !params.confirm {
        return Err(AppError::ConfirmationRequired(confirmation_prompt(&employee)));
    }

    let report = remove_employee(state.store.as_ref(), &employee)
        .await
        .map_err(|err| match err {
            RemovalError::Employee { .. } => AppError::DatabaseError("Delete failed".to_string()),
            RemovalError::Ledger { .. } => AppError::InternalServerError(
                "Employee deleted, but the ledger could not be removed".to_string(),
            ),
        })?;
    log::info!("Employee {} deleted by {}", employee.id, claims.sub);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deleted successfully",
        "ledgerId": report.ledger_id,
    })))
}
