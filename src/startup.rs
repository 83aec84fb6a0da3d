use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::web;
use actix_web::App;
use actix_web::HttpServer;
use actix_web_lab::middleware::from_fn;
use tracing_actix_web::TracingLogger;

use crate::configuration::DeliverySettings;
use crate::configuration::Settings;
use crate::delivery::ResourceNotifier;
use crate::middleware::cors;
use crate::registry_client::RegistryClient;
use crate::routes::health_check;
use crate::routes::health_status;
use crate::routes::json_config;
use crate::routes::lead_magnet;
use crate::routes::resource_email;
use crate::routes::subscribe;
use crate::routes::unsubscribe;
use crate::routes::unsubscribe_from_link;

/// Wrapper for actix's `Server` with access to the bound port. Not to be
/// confused with actix's `App`!
pub struct Application {
    /// Left private; use `get_port` to access
    port: u16,
    server: Server,
}

impl Application {
    /// Bind the configured address and build the clients; nothing is sent to
    /// the registry or the mail API until a request comes in.
    pub async fn build(cfg: Settings) -> Result<Self, anyhow::Error> {
        let addr = format!("{}:{}", cfg.application.host, cfg.application.port);
        let listener = TcpListener::bind(addr)?;
        // port 0 lets the OS pick; tests rely on this
        let port = listener.local_addr()?.port();

        let registry_client = cfg.registry.client();
        let email_client = cfg
            .email_client
            .client()?
            .with_sender_name(&cfg.site.author);
        let notifier = ResourceNotifier::new(Arc::new(email_client), cfg.site);

        let server = run(listener, registry_client, notifier, cfg.delivery)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 { self.port }

    /// Because this consumes `self`, this should be the final function call (or
    /// passed to `tokio::spawn`)
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> { self.server.await }
}

/// The server is not responsible for binding to an address, it only listens to
/// an already bound address.
///
/// Declares all API endpoints.
pub fn run(
    listener: TcpListener,
    registry_client: RegistryClient,
    notifier: ResourceNotifier,
    delivery: DeliverySettings,
) -> Result<Server, anyhow::Error> {
    // `Data` is externally an `Arc`, so every worker shares the same clients
    // (and connection pools)
    let registry_client = web::Data::new(registry_client);
    let notifier = web::Data::new(notifier);
    let delivery = web::Data::new(delivery);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(from_fn(cors))
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/health", web::get().to(health_status))
            .route("/healthz", web::get().to(health_status))
            .route("/ready", web::get().to(health_status))
            .service(
                web::scope("/api")
                    .route("/subscribe", web::post().to(subscribe))
                    .route("/unsubscribe", web::post().to(unsubscribe))
                    .route("/unsubscribe", web::get().to(unsubscribe_from_link))
                    .route("/lead-magnet", web::post().to(lead_magnet))
                    .route("/resource-email", web::post().to(resource_email)),
            )
            .app_data(json_config())
            .app_data(registry_client.clone())
            .app_data(notifier.clone())
            .app_data(delivery.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
