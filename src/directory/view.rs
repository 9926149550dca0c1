use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::category::CategoryView;
use crate::models::employee::Employee;

pub const DATE_NOT_SPECIFIED: &str = "Date not specified";
pub const CURRENCY_SIGN: &str = "₸";

/// Which screen the directory shows. One variant at a time, so "editing while
/// the history is open" cannot be represented.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewMode {
    List,
    Add,
    Edit(Uuid),
    History(CategoryView),
}

/// Right-click menu anchored at a screen position.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    pub employee: Employee,
    pub x: i32,
    pub y: i32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeCard {
    pub id: Uuid,
    pub display_name: String,
    pub position: String,
    pub phone: String,
    pub email: String,
    pub registered: String,
    pub salary: String,
}

impl From<&Employee> for EmployeeCard {
    fn from(employee: &Employee) -> Self {
        EmployeeCard {
            id: employee.id,
            display_name: employee.display_name(),
            position: employee.position.clone(),
            phone: employee.phone.clone(),
            email: employee.email.clone(),
            registered: format_registration_date(employee.created_at),
            salary: format_salary(employee.salary),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    NoEmployees,
    NoMatches,
}

impl EmptyState {
    pub fn title(&self) -> &'static str {
        "No employees"
    }

    pub fn hint(&self) -> &'static str {
        match self {
            EmptyState::NoEmployees => "Add the first employee",
            EmptyState::NoMatches => "Nothing matches your search",
        }
    }
}

pub fn format_registration_date(created_at: Option<DateTime<Utc>>) -> String {
    match created_at {
        Some(at) => at.format("%Y-%m-%d").to_string(),
        None => DATE_NOT_SPECIFIED.to_string(),
    }
}

/// `1234567.5` -> `"1 234 568 ₸"`.
pub fn format_salary(salary: f64) -> String {
    let rounded = salary.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0 { "-" } else { "" };
    format!("{}{} {}", sign, grouped, CURRENCY_SIGN)
}
