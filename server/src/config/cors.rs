use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

const PREFLIGHT_MAX_AGE_SECS: u64 = 86400;

/// CORS for the organizer dashboard and the door-scanner app.
pub fn create_cors_layer(allowed_origins: &str) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(parse_allowed_origins(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers([header::CONTENT_LENGTH, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(PREFLIGHT_MAX_AGE_SECS))
}

fn valid_origins(origins: &str) -> Vec<HeaderValue> {
    origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => {
                tracing::debug!("CORS: Allowing origin: {}", origin);
                Some(value)
            }
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect()
}

fn parse_allowed_origins(origins: &str) -> AllowOrigin {
    let origins = valid_origins(origins);

    if origins.is_empty() {
        tracing::warn!("CORS: No valid origins configured, allowing any origin");
        AllowOrigin::any()
    } else {
        tracing::info!("CORS: Configured with {} allowed origin(s)", origins.len());
        AllowOrigin::list(origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ALLOWED_ORIGINS;

    #[test]
    fn default_origins_are_valid() {
        assert_eq!(valid_origins(DEFAULT_ALLOWED_ORIGINS).len(), 2);
    }

    #[test]
    fn skips_blank_and_invalid_entries() {
        let origins = valid_origins(" https://door.example.com , ,bad\norigin");
        assert_eq!(origins, vec![HeaderValue::from_static("https://door.example.com")]);
    }
}
