use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse};
use log::*;
use serde::Serialize;
use urbannook_engine::{CallerIdentity, Envelope};

use crate::errors::ServerError;

/// The header the upstream authentication layer uses to pass on the signed-in user.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Reads the caller from the [`USER_ID_HEADER`] header. A missing or unreadable header gives an anonymous caller.
pub fn caller_identity(req: &HttpRequest) -> CallerIdentity {
    match req.headers().get(USER_ID_HEADER).map(|v| v.to_str()) {
        Some(Ok(user_id)) => CallerIdentity::new(user_id),
        Some(Err(e)) => {
            debug!("💻️ Ignoring unreadable {USER_ID_HEADER} header. {e}");
            CallerIdentity::anonymous()
        },
        None => CallerIdentity::anonymous(),
    }
}

/// Turns an envelope into a JSON response whose HTTP status matches `statusCode`.
pub fn envelope_response<T: Serialize>(envelope: Envelope<T>) -> HttpResponse {
    let status = StatusCode::from_u16(envelope.status_code).unwrap_or_else(|e| {
        error!("💻️ Envelope carries an invalid status code ({}). {e}", envelope.status_code);
        StatusCode::INTERNAL_SERVER_ERROR
    });
    HttpResponse::build(status).json(envelope)
}

/// Malformed JSON bodies are answered with a 400 envelope instead of actix's plain-text error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        debug!("💻️ Rejecting request body. {err}");
        ServerError::InvalidRequestBody(err.to_string()).into()
    })
}

/// Same treatment for path segments that cannot be parsed.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| ServerError::InvalidRequestPath(err.to_string()).into())
}
