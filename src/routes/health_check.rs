use actix_web::web;
use actix_web::HttpResponse;
use chrono::Utc;
use serde::Serialize;

use crate::delivery::ResourceNotifier;
use crate::registry_client::RegistryClient;

/// `GET /health_check`
///
/// Liveness only; used by the container platform
///
/// Note: viewing http response requires `curl -v`
pub async fn health_check() -> HttpResponse { HttpResponse::Ok().finish() }

#[derive(Serialize)]
struct ComponentCheck {
    component: &'static str,
    status: &'static str,
    message: &'static str,
}

impl ComponentCheck {
    fn new(
        component: &'static str,
        configured: bool,
        ok: &'static str,
        degraded: &'static str,
    ) -> Self {
        match configured {
            true => Self {
                component,
                status: "healthy",
                message: ok,
            },
            false => Self {
                component,
                status: "degraded",
                message: degraded,
            },
        }
    }
}

#[derive(Serialize)]
struct HealthReport {
    status: &'static str,
    version: &'static str,
    timestamp: String,
    checks: Vec<ComponentCheck>,
}

/// `GET /health`, `/healthz`, `/ready`
///
/// Always 200; a missing collaborator configuration only degrades the report,
/// since the subscribe routes keep answering (with errors) regardless. No
/// remote calls are made.
pub async fn health_status(
    registry: web::Data<RegistryClient>,
    notifier: web::Data<ResourceNotifier>,
) -> HttpResponse {
    let checks = vec![
        ComponentCheck::new(
            "registry",
            registry.is_configured(),
            "Subscriber registry configured",
            "Incomplete subscriber registry configuration",
        ),
        ComponentCheck::new(
            "email",
            notifier.is_configured(),
            "Email configuration validated",
            "Incomplete email configuration",
        ),
    ];
    let status = match checks.iter().all(|c| c.status == "healthy") {
        true => "healthy",
        false => "degraded",
    };
    HttpResponse::Ok().json(HealthReport {
        status,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
        checks,
    })
}
