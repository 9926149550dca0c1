use actix_web::{web, HttpResponse, HttpRequest};
use serde::Serialize;

use crate::app::AppState;
use crate::errors::AppError;
use crate::handlers::find_employee;
use crate::models::category::CategoryView;
use crate::models::transaction::Transaction;
use crate::services::ledger::resolve_history;
use crate::utils::jwt::bearer_claims;

#[derive(Serialize)]
struct HistoryResponse {
    category: CategoryView,
    transactions: Vec<Transaction>,
}

/// Ledger of an employee for the history viewer; 204 when there is none yet.
pub async fn get_history(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    bearer_claims(&req, &state.jwt_secret)?;

    let employee = find_employee(state.store.as_ref(), &id).await?;
    let Some(category) = resolve_history(state.store.as_ref(), &employee).await? else {
        return Ok(HttpResponse::NoContent().finish());
    };
    let transactions = state.store.list_transactions(category.id).await?;

    Ok(HttpResponse::Ok().json(HistoryResponse { category, transactions }))
}
