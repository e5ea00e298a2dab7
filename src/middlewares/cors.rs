use actix_cors::Cors;

/// An empty origin list accepts any origin.
pub fn create_cors(allowed_origins: &[String]) -> Cors {
    let cors = if allowed_origins.is_empty() {
        Cors::default().allowed_origin_fn(|_, _req_head| true)
    } else {
        allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "OPTIONS"])
        .allow_any_header()
        .expose_headers(vec!["X-Status-Filter", "X-Response-Time"])
        .supports_credentials()
        .max_age(3600)
}
