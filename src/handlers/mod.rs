pub mod employee;
pub mod feed;
pub mod history;

use uuid::Uuid;

use crate::errors::AppError;
use crate::models::employee::Employee;
use crate::db::DirectoryStore;

pub(crate) fn parse_employee_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid employee ID".to_string()))
}

pub(crate) async fn find_employee(store: &dyn DirectoryStore, raw_id: &str) -> Result<Employee, AppError> {
    let id = parse_employee_id(raw_id)?;
    store
        .get_employee(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))
}
