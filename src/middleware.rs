use actix_web::body::MessageBody;
use actix_web::dev::ServiceRequest;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::http::header::HeaderValue;
use actix_web::http::Method;
use actix_web::HttpResponse;
use actix_web_lab::middleware::Next;

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// The forms are served from a different origin and submitted with HTMX
const ALLOWED_HEADERS: &str = "Content-Type, Content-Length, Accept-Encoding, X-CSRF-Token, \
                               Authorization, HX-Request, HX-Trigger, HX-Trigger-Name, \
                               HX-Target, HX-Current-URL, HX-Boost";

const EXPOSED_HEADERS: &str = "HX-Redirect, HX-Trigger, HX-Refresh, HX-Location";

/// Attach CORS headers to every response. Preflight (`OPTIONS`) requests are
/// answered here with 204 and never reach a route.
///
/// No `Access-Control-Allow-Credentials`: browsers refuse it alongside a
/// wildcard origin, and no route uses cookies.
///
/// Wrap the app with `actix_web_lab::middleware::from_fn(cors)`.
pub async fn cors(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let preflight = *req.method() == Method::OPTIONS;
    let mut resp = match preflight {
        true => req
            .into_response(HttpResponse::NoContent().finish())
            .map_into_right_body(),
        false => next.call(req).await?.map_into_left_body(),
    };

    let headers = resp.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static(EXPOSED_HEADERS),
    );
    Ok(resp)
}
