use doorman::{
    configuration::get_configuration,
    startup,
    telemetry::{get_subscriber, init_subscriber},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let otlp_endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok();
    let subscriber = get_subscriber("doorman".into(), "info".into(), otlp_endpoint, std::io::stdout)?;
    init_subscriber(subscriber)?;

    let cfg = get_configuration()?;
    let result = startup::run(cfg).await;
    opentelemetry::global::shutdown_tracer_provider();
    result
}
