use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, HeaderMap},
};
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::error::{BodyError, RelayError};

/// JSON body that is also accepted without a `Content-Type` header.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = RelayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !json_or_unset(req.headers()) {
            return Err(BodyError::UnsupportedContentType.into());
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(BodyError::from)?;

        serde_json::from_slice(&bytes).map(JsonBody).map_err(|err| {
            match err.classify() {
                Category::Data => BodyError::Shape(err),
                _ => BodyError::Syntax(err),
            }
            .into()
        })
    }
}

fn json_or_unset(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE) else {
        return true;
    };
    let Ok(value) = value.to_str() else {
        return false;
    };

    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}
