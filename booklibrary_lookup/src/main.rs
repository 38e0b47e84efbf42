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

use booklibrary_lookup::app_config::config_app;
use booklibrary_lookup::genre_suggester::GenreSuggester;
use booklibrary_lookup::open_library::OpenLibraryClient;
use booklibrary_lookup::settings::LookupSettings;

fn init_telemetry() -> anyhow::Result<()> {
    let app_name = "booklibrary_lookup";

    global::set_text_map_propagator(TraceContextPropagator::new());
    #[allow(deprecated)]
    let tracer = opentelemetry_jaeger::new_agent_pipeline()
        .with_service_name(app_name)
        .install_batch(TokioCurrentThread)
        .context("Failed to install OpenTelemetry tracer")?;

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

    let settings = LookupSettings::from_env()?;
    let open_library = web::Data::new(OpenLibraryClient::new(&settings.open_library_url)?);
    let suggester = web::Data::new(GenreSuggester::new(
        &settings.openai_url,
        settings.openai_api_key.clone(),
    )?);
    if !suggester.is_configured() {
        tracing::warn!("OPENAI_API_KEY not set, genre suggestions are disabled");
    }

    tracing::info!("starting HTTP server at {}", settings.bind_address);
    HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(open_library.clone())
            .app_data(suggester.clone())
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
