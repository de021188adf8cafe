use learn2ux::{server::app::run_server, settings::Settings, telemetry::init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let settings = Settings::load()?;
    run_server(settings).await
}
