use axum::http::{HeaderValue, Method, header};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

/// Environment variable holding comma-separated allowed origins.
pub const CORS_ALLOWED_ORIGIN: &str = "CORS_ALLOWED_ORIGIN";

/// Creates a CORS layer restricted to `allowed_origins`.
///
/// - Methods: GET, POST, PATCH, OPTIONS
/// - Headers: Content-Type, Accept
/// - Credentials allowed, 1 hour max age
pub fn create_cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Allows any origin, method and header.
pub fn create_permissive_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Parses a `CORS_ALLOWED_ORIGIN` value.
///
/// `"*"` yields `None` (any origin). Otherwise every comma-separated entry must
/// be a valid header value and at least one must be present.
pub fn parse_allowed_origins(raw: &str) -> io::Result<Option<Vec<HeaderValue>>> {
    if raw.trim() == "*" {
        return Ok(None);
    }

    let origins = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(HeaderValue::from_str)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid {CORS_ALLOWED_ORIGIN} value: {e}"),
            )
        })?;

    if origins.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{CORS_ALLOWED_ORIGIN} cannot be empty"),
        ));
    }

    Ok(Some(origins))
}

/// CORS layer configured from `CORS_ALLOWED_ORIGIN`.
///
/// Unset or `*` means permissive.
pub fn cors_layer_from_env() -> io::Result<CorsLayer> {
    match std::env::var(CORS_ALLOWED_ORIGIN) {
        Err(_) => {
            warn!("{CORS_ALLOWED_ORIGIN} not set, allowing any origin");
            Ok(create_permissive_cors_layer())
        }
        Ok(raw) => match parse_allowed_origins(&raw)? {
            None => {
                info!("CORS configured to allow any origin");
                Ok(create_permissive_cors_layer())
            }
            Some(origins) => {
                info!(origins = %raw, "CORS configured with allowed origins");
                Ok(create_cors_layer(origins))
            }
        },
    }
}
