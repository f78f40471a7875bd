//! Validated JSON extractor for Axum
//!
//! `ValidatedJson<T>` deserializes like `axum::Json<T>` and then runs the
//! `validator` rules of `T`. Malformed bodies and broken rules both answer
//! 400 in the standard envelope.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::bad_request;

/// Request body that passed both deserialization and validation.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct CreateService {
///     #[validate(length(min = 1, max = 100))]
///     name: String,
/// }
///
/// async fn create(ValidatedJson(body): ValidatedJson<CreateService>) { /* ... */ }
/// ```
pub struct ValidatedJson<T>(pub T);

pub enum BodyRejection {
    Malformed(JsonRejection),
    Invalid(ValidationErrors),
}

/// One `field: message` entry per broken rule, sorted so the output does
/// not depend on hash order.
fn describe(errors: &ValidationErrors) -> String {
    let mut entries: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => format!("{}: {}", field, message),
                None => format!("{}: {}", field, e.code),
            })
        })
        .collect();
    entries.sort();

    if entries.is_empty() {
        "request validation failed".to_string()
    } else {
        entries.join("; ")
    }
}

impl IntoResponse for BodyRejection {
    fn into_response(self) -> Response {
        let message = match self {
            Self::Malformed(rejection) => format!("invalid JSON body: {}", rejection.body_text()),
            Self::Invalid(errors) => describe(&errors),
        };
        bad_request(message).into_response()
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = BodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(BodyRejection::Malformed)?;
        value.validate().map_err(BodyRejection::Invalid)?;
        Ok(Self(value))
    }
}
