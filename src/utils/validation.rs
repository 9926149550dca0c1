use validator::Validate;

use crate::errors::AppError;

/// Runs the payload's validators, flattening field errors into one message.
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(|err| {
        let mut fields: Vec<_> = err.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);
        let details = fields
            .iter()
            .map(|(field, errs)| {
                let errors = errs.iter()
                    .map(|e| match &e.message {
                        Some(message) => format!("{}: {}", e.code, message),
                        None => e.code.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}: [{}]", field, errors)
            })
            .collect::<Vec<_>>()
            .join("; ");
        AppError::BadRequest(format!("Validation failed: {}", details))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::employee::NewEmployee;

    #[test]
    fn reports_each_failing_field() {
        let payload = NewEmployee {
            last_name: String::new(),
            first_name: "Petr".to_string(),
            iin: "123".to_string(),
            email: "ivanov@example.com".to_string(),
            ..NewEmployee::default()
        };
        match validate_payload(&payload) {
            Err(AppError::BadRequest(message)) => {
                assert!(message.starts_with("Validation failed: "));
                assert!(message.contains("iin: ["));
                assert!(message.contains("last_name: ["));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
