use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use escrow_engine::{
    db,
    events::{EventHandlers, EventHooks, EventProducers},
    parsers::ParserRegistry,
    SqliteDatabase,
    TransferFlowApi,
};
use futures::FutureExt;
use log::*;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{
        email_webhook,
        email_webhook_form,
        email_webhook_info,
        health,
        is_multipart,
        parse_email,
        parse_info,
        transfer_records,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let url = if config.database_url.is_empty() { db::db_url() } else { config.database_url.clone() };
    let db = SqliteDatabase::new_with_url(&url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db::run_migrations(db.pool()).await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let mut hooks = EventHooks::default();
    hooks.on_transfer_verified(|ev| {
        async move {
            info!(
                "📬️ Listing {} ({}) verified by transfer record {}",
                ev.listing.id, ev.listing.title, ev.record.id
            );
        }
        .boxed()
    });
    let handlers = EventHandlers::new(10, hooks);
    let producers = handlers.producers();
    tokio::spawn(handlers.start_handlers());
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let web_config = config.clone();
    let srv = HttpServer::new(move || {
        let transfer_api = TransferFlowApi::new(db.clone(), ParserRegistry::default(), producers.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("tes::access_log"))
            .app_data(web::Data::new(web_config.clone()))
            .app_data(web::Data::new(transfer_api))
            .service(health)
            .service(
                web::resource("/email/webhook")
                    .route(web::post().guard(actix_web::guard::fn_guard(is_multipart)).to(email_webhook_form::<SqliteDatabase>))
                    .route(web::post().to(email_webhook::<SqliteDatabase>))
                    .route(web::get().to(email_webhook_info)),
            )
            .service(
                web::resource("/email/parse")
                    .route(web::post().to(parse_email::<SqliteDatabase>))
                    .route(web::get().to(parse_info)),
            )
            .service(web::resource("/email/transfers").route(web::get().to(transfer_records::<SqliteDatabase>)))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
