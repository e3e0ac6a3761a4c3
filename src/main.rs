mod config;
mod error;
mod handlers;
mod models;
mod services;
mod tasks;
mod triggers;

use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

use handlers::events::WebhookSecret;
use services::{DatabaseService, FcmService};
use triggers::Notifier;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = config::Config::from_env()?;

    let database_service = DatabaseService::new(&config.database).await?;
    let fcm_service = FcmService::new(config.fcm.clone());

    // One handle for the whole process: the intake endpoint and the digest task share it.
    let notifier = web::Data::new(Notifier::new(database_service, fcm_service, config.app.clone()));
    let webhook_secret = web::Data::new(WebhookSecret(config.webhook_secret.clone()));

    if webhook_secret.0.is_none() {
        log::warn!("WEBHOOK_SECRET is not set; event signatures will not be checked");
    }

    if config.app.digest_enabled {
        let notifier: Arc<Notifier<DatabaseService, FcmService>> = notifier.clone().into_inner();
        actix_web::rt::spawn(tasks::digest_task::start_digest_task(notifier));
    } else {
        log::info!("Daily routine digest disabled");
    }

    let bind_address = format!("0.0.0.0:{}", config.port);
    println!("🚀 Starting Appointment Notifier on {}", bind_address);
    println!("  POST /api/v1/events - Deliver a trigger event");
    println!("  GET  /api/v1/health - Health check");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(notifier.clone())
            .app_data(webhook_secret.clone())
            .service(
                web::scope("/api/v1")
                    .configure(handlers::events::configure::<DatabaseService, FcmService>)
                    .route("/health", web::get().to(handlers::health::health_check))
            )
    })
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}
