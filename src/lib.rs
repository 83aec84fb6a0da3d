pub mod configuration;
pub mod delivery;
pub mod domain;
pub mod email_client;
pub mod messages;
pub mod middleware;
pub mod registry_client;
pub mod routes;
pub mod startup;
pub mod subscription;
pub mod telemetry;
pub mod utils;
