use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use log::debug;
use serde_json::Value;

use crate::helpers::{json_config, path_config};

/// Sends `req` to an app built by `configure` and returns the status and the JSON body.
pub async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, Value)
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().app_data(json_config()).app_data(path_config()).configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::call_service(&service, req.to_request()).await.into_parts();
    let status = res.status();
    let bytes = res.into_body().try_into_bytes().unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()));
    (status, body)
}
