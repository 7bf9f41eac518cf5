use std::sync::Arc;

use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use opentelemetry::global;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::runtime::TokioCurrentThread;
use paperclip::actix::OpenApiExt;
use tracing_actix_web::TracingLogger;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use bookrental_service::api::RoleType;
use bookrental_service::app_config::{config_app, AppServices};
use bookrental_service::clock::SystemClock;
use bookrental_service::database::{InMemoryDatabase, PostgresDatabase};
use bookrental_service::settings::Settings;

// Based on https://github.com/LukeMathWalker/tracing-actix-web/blob/main/examples/opentelemetry/src/main.rs#L15
fn init_telemetry() -> anyhow::Result<()> {
    let app_name = "bookrental_service";

    // Spans are exported in batch
    global::set_text_map_propagator(TraceContextPropagator::new());
    #[allow(deprecated)]
    let tracer = opentelemetry_jaeger::new_agent_pipeline()
        .with_service_name(app_name)
        .install_batch(TokioCurrentThread)
        .context("Failed to install OpenTelemetry tracer")?;

    // Tunable via `RUST_LOG` env variable
    let env_filter = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("info"));
    let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);
    let formatting_layer = BunyanFormattingLayer::new(app_name.into(), std::io::stdout);
    let subscriber = Registry::default()
        .with(env_filter)
        .with(telemetry)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install `tracing` subscriber")
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry()?;
    let settings = Settings::from_env().context("Failed to read settings")?;

    let services = if settings.use_in_memory_db {
        tracing::info!("Using in-memory database");
        AppServices::new(
            Arc::new(InMemoryDatabase::default()),
            Arc::new(SystemClock),
        )
    } else {
        let database = PostgresDatabase::init(settings.postgres_config())
            .await
            .context("Failed to init postgres")?;
        AppServices::new(Arc::new(database), Arc::new(SystemClock))
    };

    if let Some((email, password)) = settings.admin_credentials() {
        let admin_id = services
            .accounts
            .provision_if_missing(email, password, &settings.admin_name, RoleType::Admin)
            .await
            .context("Failed to provision administrator")?;
        tracing::info!(admin_id, "Administrator account ready");
    }

    tracing::info!(port = settings.port, "Starting HTTP server");
    HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(Data::new(services.accounts.clone()))
            .app_data(Data::new(services.rentals.clone()))
            .app_data(Data::new(services.book_admin.clone()))
            .wrap(TracingLogger::default())
            .configure(config_app)
            .with_json_spec_at("/apispec/v2")
            .build()
    })
    .bind(("0.0.0.0", settings.port))?
    .run()
    .await?;

    Ok(())
}
