use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use urbannook_engine::{
    gateway::RazorpaySignatureVerifier,
    notifications::NotificationOutbox,
    EventProducers,
    OrderStatusApi,
    PaymentVerificationApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    helpers::{json_config, path_config},
    routes::{health, OrderByIdRoute, OrdersForUserRoute, UpdateOrderStatusRoute, VerifyPaymentRoute},
    workers::{start_event_hooks, start_outbox_worker},
};

/// How long to wait for queued emails after the HTTP server has stopped.
const OUTBOX_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let producers = start_event_hooks(config.engine.outbox_buffer).await;
    let (outbox, outbox_worker) = start_outbox_worker(config.engine.outbox_buffer, config.dispatch.clone());
    let srv = create_server_instance(config, db, producers, outbox)?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    info!("📧️ Waiting for queued notifications to be delivered");
    match tokio::time::timeout(OUTBOX_DRAIN_TIMEOUT, outbox_worker).await {
        Ok(Ok(())) => info!("📧️ Notification outbox drained"),
        Ok(Err(e)) => error!("📧️ Notification outbox worker failed. {e}"),
        Err(_) => warn!("📧️ Gave up waiting for the notification outbox. Unsent emails are lost."),
    }
    result
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
    outbox: NotificationOutbox,
) -> Result<Server, ServerError> {
    let verifier = RazorpaySignatureVerifier::new(&config.razorpay);
    let engine_config = config.engine.clone();
    let srv = HttpServer::new(move || {
        let orders_api = OrderStatusApi::new(db.clone(), producers.clone())
            .with_config(engine_config.clone())
            .with_outbox(outbox.clone());
        let payments_api = PaymentVerificationApi::new(
            OrderStatusApi::new(db.clone(), producers.clone())
                .with_config(engine_config.clone())
                .with_outbox(outbox.clone()),
            verifier.clone(),
        );
        let api_scope = web::scope("/api")
            .service(VerifyPaymentRoute::<SqliteDatabase, RazorpaySignatureVerifier>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(OrdersForUserRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("urbannook::access_log"))
            .app_data(json_config())
            .app_data(path_config())
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(payments_api))
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
