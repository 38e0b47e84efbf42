use actix_web::{App, HttpServer};
use anyhow::Context;
use opentelemetry::global;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::runtime::TokioCurrentThread;
use paperclip::actix::{web, OpenApiExt};
use tracing_actix_web::TracingLogger;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use booklibrary_catalog::app_config::config_app;
use booklibrary_catalog::context::LibraryContext;
use booklibrary_catalog::settings::CatalogSettings;

// Based on https://github.com/LukeMathWalker/tracing-actix-web/blob/main/examples/opentelemetry/src/main.rs#L15
fn init_telemetry() -> anyhow::Result<()> {
    let app_name = "booklibrary_catalog";

    // Spans are exported to Jaeger in batches
    global::set_text_map_propagator(TraceContextPropagator::new());
    #[allow(deprecated)]
    let tracer = opentelemetry_jaeger::new_agent_pipeline()
        .with_service_name(app_name)
        .install_batch(TokioCurrentThread)
        .context("Failed to install OpenTelemetry tracer")?;

    // Tunable via `RUST_LOG` env variable
    let env_filter = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("info"));
    let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);
    // Spans emitted as structured logs to stdout
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

    let settings = CatalogSettings::from_env()?;
    let context = LibraryContext::connect(settings.store_config())
        .await
        .context("Failed to connect to the document store")?;

    tracing::info!("starting HTTP server at {}", settings.bind_address);
    HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(web::Data::new(context.clone()))
            .wrap(TracingLogger::default())
            .configure(config_app)
            .with_json_spec_at("/apispec/v2")
            .build()
    })
    .bind(settings.bind_address.as_str())?
    .run()
    .await?;
    Ok(())
}
