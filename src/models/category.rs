use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row discriminator of the categories that act as an employee's ledger.
pub const LEDGER_ROW: i32 = 2;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    pub amount: f64,
    pub icon: String,
    pub color: String,
    #[sqlx(rename = "row")]
    #[serde(rename = "row")]
    pub ledger_row: i32,
    pub employee_id: Option<Uuid>,
}

/// What the transaction-history viewer is handed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub id: Uuid,
    pub title: String,
    pub amount: f64,
    pub icon_name: String,
    pub color: String,
    pub row: i32,
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        CategoryView {
            id: category.id,
            title: category.title,
            amount: category.amount,
            icon_name: category.icon,
            color: category.color,
            row: LEDGER_ROW,
        }
    }
}
