//! User-facing strings returned in API responses (the site is in Spanish), and
//! the pages the redirect-style routes point at. Log messages stay in English
//! and live next to the code that emits them.

pub const INVALID_EMAIL: &str = "Correo electrónico inválido.";
pub const INCOMPLETE_DATA: &str = "Datos incompletos para completar la operación.";
pub const SERVER_ERROR: &str = "Error interno del servidor.";
pub const EMAIL_NOT_SUBSCRIBED: &str = "Este email no está suscrito.";
pub const EMAIL_CONFIG_ERROR: &str = "Error en la configuración de email.";
pub const TAGS_UPDATE_ERROR: &str = "Error al actualizar los tags del suscriptor.";
pub const SUBSCRIPTION_ERROR: &str = "No se pudo completar la suscripción.";

pub const SUBSCRIPTION_NEW: &str = "Nuevo suscriptor añadido.";
pub const SUBSCRIPTION_UPDATED: &str = "Suscriptor existente actualizado.";
pub const UNSUBSCRIPTION: &str = "Se ha cancelado tu suscripción correctamente.";
pub const RESOURCE_SENT: &str = "Recurso enviado correctamente.";
pub const EMAIL_SENT: &str = "Email enviado correctamente.";

pub const UNSUBSCRIBE_SUCCESS_PAGE: &str = "/unsubscribe-success";
pub const NOT_FOUND_PAGE: &str = "/404";
