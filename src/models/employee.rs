use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use validator::Validate;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub iin: String,
    pub phone: String,
    pub position: String,
    pub salary: f64,
    pub email: String,
    #[serde(with = "chrono::serde::ts_seconds_option", default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Employee {
    /// `"<lastName> <firstName>"`, the title a legacy ledger category carries.
    pub fn ledger_title(&self) -> String {
        ledger_title(&self.last_name, &self.first_name)
    }

    pub fn display_name(&self) -> String {
        self.ledger_title()
    }

    /// Fills an existing record with an edited payload; identity and creation time are kept.
    pub fn apply(&mut self, changes: NewEmployee) {
        self.last_name = changes.last_name;
        self.first_name = changes.first_name;
        self.middle_name = changes.middle_name;
        self.iin = changes.iin;
        self.phone = changes.phone;
        self.position = changes.position;
        self.salary = changes.salary;
        self.email = changes.email;
    }
}

pub fn ledger_title(last_name: &str, first_name: &str) -> String {
    format!("{} {}", last_name, first_name)
}

/// Create/edit payload submitted by the employee form.
#[derive(Deserialize, Serialize, Validate, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewEmployee {
    #[validate(length(min = 1, max = 64))]
    pub last_name: String,
    #[validate(length(min = 1, max = 64))]
    pub first_name: String,
    #[validate(length(max = 64))]
    #[serde(default)]
    pub middle_name: String,
    #[validate(custom = "validate_iin")]
    pub iin: String,
    #[validate(length(max = 32))]
    #[serde(default)]
    pub phone: String,
    #[validate(length(max = 64))]
    #[serde(default)]
    pub position: String,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub salary: f64,
    #[validate(email)]
    pub email: String,
}

fn validate_iin(iin: &str) -> Result<(), validator::ValidationError> {
    if iin.len() != 12 || !iin.chars().all(|c| c.is_ascii_digit()) {
        return Err(validator::ValidationError::new("IIN must be exactly 12 digits"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> NewEmployee {
        NewEmployee {
            last_name: "Ivanov".to_string(),
            first_name: "Petr".to_string(),
            middle_name: "Sergeevich".to_string(),
            iin: "900101300123".to_string(),
            phone: "+7 701 000 0000".to_string(),
            position: "Manager".to_string(),
            salary: 350000.0,
            email: "ivanov@example.com".to_string(),
        }
    }

    #[test]
    fn ledger_title_is_last_then_first_name() {
        assert_eq!(ledger_title("Ivanov", "Petr"), "Ivanov Petr");
    }

    #[test]
    fn valid_payload_passes() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn iin_must_be_twelve_digits() {
        let mut short = payload();
        short.iin = "12345".to_string();
        assert!(short.validate().is_err());

        let mut letters = payload();
        letters.iin = "90010130012a".to_string();
        assert!(letters.validate().is_err());
    }

    #[test]
    fn negative_salary_and_bad_email_are_rejected() {
        let mut bad = payload();
        bad.salary = -1.0;
        bad.email = "not-an-email".to_string();
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("salary"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn created_at_serializes_as_seconds() {
        let employee = Employee {
            id: Uuid::nil(),
            last_name: "Ivanov".to_string(),
            first_name: "Petr".to_string(),
            middle_name: String::new(),
            iin: "900101300123".to_string(),
            phone: String::new(),
            position: "Manager".to_string(),
            salary: 1.0,
            email: "ivanov@example.com".to_string(),
            created_at: DateTime::from_timestamp(1_700_000_000, 0),
        };
        let json = serde_json::to_value(&employee).unwrap();
        assert_eq!(json["createdAt"], 1_700_000_000);
        assert_eq!(json["lastName"], "Ivanov");
    }
}
