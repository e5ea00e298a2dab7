use crate::error::AppError;
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage, HttpRequest,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use uuid::Uuid;

/// The authenticated caller, placed in request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

// 公开路径配置
struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            exact_paths: vec!["/swagger-ui", "/swagger-ui/", "/api-docs/openapi.json"],
            prefix_paths: vec!["/swagger-ui/", "/api-docs/"],
        }
    }

    fn is_public_path(&self, path: &str) -> bool {
        if self.exact_paths.contains(&path) {
            return true;
        }

        self.prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS preflight
        if req.method() == Method::OPTIONS || self.public_paths.is_public_path(req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let Some(token) = bearer_token(&req) else {
            let error = AppError::AuthError("Missing access token".to_string());
            return Box::pin(async move { Err(error.into()) });
        };

        let user = self
            .jwt_service
            .verify_access_token(token)
            .and_then(|claims| claims.user_id());

        match user {
            Ok(user_id) => {
                req.extensions_mut().insert(CurrentUser(user_id));
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(e) => Box::pin(async move { Err(e.into()) }),
        }
    }
}

/// 从请求扩展中取出当前用户
pub fn current_user(req: &HttpRequest) -> Option<Uuid> {
    req.extensions().get::<CurrentUser>().map(|u| u.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, http::StatusCode, test, web};

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match current_user(&req) {
            Some(id) => HttpResponse::Ok().body(id.to_string()),
            None => HttpResponse::Ok().body("anonymous"),
        }
    }

    fn jwt() -> JwtService {
        JwtService::new("test-secret", None)
    }

    #[actix_web::test]
    async fn test_valid_token_sets_current_user() {
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt()))
                .route("/api/v1/me", web::get().to(whoami)),
        )
        .await;
        let user = Uuid::new_v4();
        let token = jwt().generate_access_token(user, 300).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/v1/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, user.to_string().as_bytes());
    }

    #[actix_web::test]
    async fn test_missing_token_rejected() {
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt()))
                .route("/api/v1/me", web::get().to(whoami)),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/v1/me").to_request();
        let err = app.call(req).await.err().unwrap();
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_foreign_token_rejected() {
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt()))
                .route("/api/v1/me", web::get().to(whoami)),
        )
        .await;
        let token = JwtService::new("other-secret", None)
            .generate_access_token(Uuid::new_v4(), 300)
            .unwrap();
        let req = test::TestRequest::get()
            .uri("/api/v1/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let err = app.call(req).await.err().unwrap();
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_public_path_passes_without_token() {
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt()))
                .route("/api-docs/openapi.json", web::get().to(whoami)),
        )
        .await;
        let req = test::TestRequest::get().uri("/api-docs/openapi.json").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "anonymous".as_bytes());
    }
}
