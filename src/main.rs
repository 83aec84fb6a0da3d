use std::fmt::Debug;
use std::fmt::Display;

use blog_backend::configuration::get_configuration;
use blog_backend::startup::Application;
use blog_backend::telemetry::get_subscriber;
use blog_backend::telemetry::init_subscriber;
use tokio::task::JoinError;

fn report_exit(
    name: &str,
    outcome: Result<Result<(), impl Debug + Display>, JoinError>,
) {
    match outcome {
        Ok(Ok(())) => {
            tracing::info!("{name} exited gracefully")
        }

        Ok(Err(e)) => {
            tracing::error!(
                error.cause_chain=?e,
                error.message=%e,
                "{name} failed (inner)"
            )
        }

        Err(e) => {
            tracing::error!(
                error.cause_chain=?e,
                error.message=%e,
                "{name} failed (outer)"
            )
        }
    }
}

/// Initialise telemetry, load config, and start the server
#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("blog-backend", "info", std::io::stdout);
    init_subscriber(subscriber)?;

    let cfg = get_configuration()?;
    let application = Application::build(cfg).await?;
    tracing::info!(port = application.get_port(), "Listening");

    // scheduled resource emails are detached tasks on the same runtime; they
    // are lost if the process exits before their delay is up
    let server_thread = tokio::spawn(application.run_until_stopped());

    tokio::select! {
        o = server_thread => { report_exit("API", o) },
        _ = tokio::signal::ctrl_c() => { tracing::info!("Received Ctrl-C, shutting down") },
    }

    Ok(())
}
