use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use tokio::sync::watch;
use zmp_payment_engine::{scheduler::DeferredTaskQueue, OrderFlowApi, PaymentFlowApi, SqliteDatabase};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::zalo::ZaloGateway,
    payment_routes::{BankWebhookRoute, NotifyCallbackRoute, OrderCallbackRoute},
    reconciliation_worker::start_reconciliation_worker,
    routes::{health, CancelOrderRoute, CreateOrderRoute, ListOrdersRoute, OrderByIdRoute},
    webhook_auth::WebhookAuth,
};

pub type ZaloPaymentFlowApi = PaymentFlowApi<SqliteDatabase, ZaloGateway>;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway =
        ZaloGateway::new(config.zalo.clone()).map_err(|e| ServerError::ConfigurationError(e.to_string()))?;

    let queue = DeferredTaskQueue::new(config.reconciliation_buffer, config.reconciliation_delay);
    let scheduler = Arc::new(queue.producer());
    let payments = Arc::new(PaymentFlowApi::new(db.clone(), gateway, scheduler, config.payment_flow_options()));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = start_reconciliation_worker(queue, Arc::clone(&payments), shutdown_rx);

    let srv = create_server_instance(config, db, payments)?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    info!("💻️ Server has stopped. Shutting down the reconciliation worker");
    if shutdown_tx.send(true).is_err() {
        warn!("⏰️ Reconciliation worker had already stopped");
    }
    if let Err(e) = worker.await {
        error!("⏰️ Reconciliation worker did not shut down cleanly. {e}");
    }
    result
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    payments: Arc<ZaloPaymentFlowApi>,
) -> Result<Server, ServerError> {
    let order_options = config.order_flow_options();
    let webhook_auth = WebhookAuth::new(config.webhook_api_key.clone());
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), db.clone(), order_options.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("zmp::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::from(Arc::clone(&payments)))
            .app_data(web::Data::new(webhook_auth.clone()))
            .service(health)
            .service(CreateOrderRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(ListOrdersRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(CancelOrderRoute::<SqliteDatabase, ZaloGateway>::new())
            .service(NotifyCallbackRoute::<SqliteDatabase, ZaloGateway>::new())
            .service(OrderCallbackRoute::<SqliteDatabase, ZaloGateway>::new())
            .service(BankWebhookRoute::<SqliteDatabase, ZaloGateway>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
