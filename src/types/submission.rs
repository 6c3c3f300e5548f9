use serde::Deserialize;
use serde_json::Value;

use crate::db::models::NewUser;
use crate::db::schema::{
    LANGUAGE_MAX_LEN, MOBILE_MAX_LEN, NAME_MAX_LEN, NATIONALITY_MAX_LEN, PIN_MAX_LEN,
};
use crate::error::SurveyError;

/// Raw `POST /submit` body. Fields stay untyped until [`SubmitRequest::validate`]
/// so a missing field and a wrongly typed one are reported differently.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default)]
    pub mobile: Option<Value>,
    #[serde(default)]
    pub nationality: Option<Value>,
    #[serde(default)]
    pub language: Option<Value>,
    #[serde(default)]
    pub pin: Option<Value>,
}

impl SubmitRequest {
    pub fn validate(self) -> Result<NewUser, SurveyError> {
        let fields = [
            &self.name,
            &self.age,
            &self.mobile,
            &self.nationality,
            &self.language,
            &self.pin,
        ];
        if !fields.iter().all(|f| f.as_ref().is_some_and(is_truthy)) {
            return Err(SurveyError::MissingFields);
        }

        Ok(NewUser {
            name: text("name", self.name, NAME_MAX_LEN)?,
            age: integer("age", self.age)?,
            mobile: text("mobile", self.mobile, MOBILE_MAX_LEN)?,
            nationality: text("nationality", self.nationality, NATIONALITY_MAX_LEN)?,
            language: text("language", self.language, LANGUAGE_MAX_LEN)?,
            pin: text("pin", self.pin, PIN_MAX_LEN)?,
        })
    }
}

/// Missing, `null`, `false`, `0` and `""` count as absent.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text(field: &'static str, value: Option<Value>, max_len: usize) -> Result<String, SurveyError> {
    let s = match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            return Err(SurveyError::InvalidField {
                field,
                reason: "must be a string".to_string(),
            });
        }
    };
    if s.chars().count() > max_len {
        return Err(SurveyError::InvalidField {
            field,
            reason: format!("must be at most {max_len} characters"),
        });
    }
    Ok(s)
}

fn integer(field: &'static str, value: Option<Value>) -> Result<i32, SurveyError> {
    let parsed = match &value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| SurveyError::InvalidField {
            field,
            reason: "must be an integer".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> SubmitRequest {
        serde_json::from_value(body).unwrap()
    }

    fn complete() -> Value {
        json!({
            "name": "Asha",
            "age": 31,
            "mobile": "5550100",
            "nationality": "IN",
            "language": "hi",
            "pin": "4821"
        })
    }

    #[test]
    fn complete_body_validates() {
        let user = request(complete()).validate().unwrap();
        assert_eq!(user.name, "Asha");
        assert_eq!(user.age, 31);
        assert_eq!(user.pin, "4821");
    }

    #[test]
    fn falsy_values_count_as_missing() {
        for (field, falsy) in [
            ("name", json!("")),
            ("age", json!(0)),
            ("mobile", Value::Null),
            ("pin", json!(false)),
        ] {
            let mut body = complete();
            body[field] = falsy;
            assert!(matches!(
                request(body).validate(),
                Err(SurveyError::MissingFields)
            ));
        }

        let mut body = complete();
        body.as_object_mut().unwrap().remove("language");
        assert!(matches!(
            request(body).validate(),
            Err(SurveyError::MissingFields)
        ));
    }

    #[test]
    fn numeric_text_and_string_age_are_accepted() {
        let mut body = complete();
        body["mobile"] = json!(5550199);
        body["age"] = json!("42");
        let user = request(body).validate().unwrap();
        assert_eq!(user.mobile, "5550199");
        assert_eq!(user.age, 42);
    }

    #[test]
    fn whole_float_age_is_accepted() {
        let mut body = complete();
        body["age"] = json!(42.0);
        assert_eq!(request(body).validate().unwrap().age, 42);

        let mut body = complete();
        body["age"] = json!(42.5);
        assert!(matches!(
            request(body).validate(),
            Err(SurveyError::InvalidField { field: "age", .. })
        ));
    }

    #[test]
    fn wrong_shapes_are_invalid() {
        let mut body = complete();
        body["age"] = json!("forty");
        assert!(matches!(
            request(body).validate(),
            Err(SurveyError::InvalidField { field: "age", .. })
        ));

        let mut body = complete();
        body["mobile"] = json!("1234567890123456");
        assert!(matches!(
            request(body).validate(),
            Err(SurveyError::InvalidField { field: "mobile", .. })
        ));

        let mut body = complete();
        body["language"] = json!(["en"]);
        assert!(matches!(
            request(body).validate(),
            Err(SurveyError::InvalidField { field: "language", .. })
        ));
    }
}
