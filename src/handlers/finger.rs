use crate::middlewares::current_user;
use crate::models::*;
use crate::services::{EnrollmentService, EnrollmentStore};
use actix_web::http::header::{CACHE_CONTROL, VARY};
use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder, ResponseError, Result, web};
use std::time::Instant;
use uuid::Uuid;

pub const STATUS_FILTER_HEADER: &str = "X-Status-Filter";

fn private_ok(started: Instant) -> HttpResponseBuilder {
    let mut builder = HttpResponse::Ok();
    builder
        .insert_header((CACHE_CONTROL, "private, no-cache"))
        .insert_header((VARY, "Authorization"))
        .insert_header((
            "X-Response-Time",
            format!("{}ms", started.elapsed().as_millis()),
        ));
    builder
}

/// Resolves the organization and runs the listing pipeline.
pub async fn members_response<S: EnrollmentStore>(
    service: &EnrollmentService<S>,
    user: Option<Uuid>,
    query: &EnrollmentQuery,
) -> HttpResponse {
    let started = Instant::now();
    let params = query.to_params();

    let result = match service
        .resolve_organization(params.organization_id, user)
        .await
    {
        Ok(ctx) => service.list_members(ctx, &params).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => private_ok(started)
            .insert_header((STATUS_FILTER_HEADER, params.status.header_value()))
            .json(response),
        Err(e) => e.error_response(),
    }
}

pub async fn stats_response<S: EnrollmentStore>(
    service: &EnrollmentService<S>,
    user: Option<Uuid>,
    query: &StatsQuery,
) -> HttpResponse {
    let started = Instant::now();
    let organization_id = parse_organization_id(query.organization_id.as_deref());

    let result = match service.resolve_organization(organization_id, user).await {
        Ok(ctx) => service.enrollment_stats(ctx).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(stats) => private_ok(started).json(ApiResponse::success(stats)),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/finger/members",
    tag = "finger",
    params(
        ("limit" = Option<u32>, Query, description = "Page size, default 10, clamped to 1..=100"),
        ("page" = Option<u32>, Query, description = "1-based page, clamped to the last page"),
        ("organizationId" = Option<i64>, Query, description = "Defaults to the caller's organization"),
        ("search" = Option<String>, Query, description = "Substring of display, first or last name"),
        ("department" = Option<String>, Query, description = "Exact department name; \"All Groups\" disables the filter"),
        ("status" = Option<String>, Query, description = "all | complete | partial | unregistered | not_registered")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Member enrollment page", body = MemberListResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Backend fetch failed", body = ErrorResponse)
    )
)]
pub async fn get_members(
    service: web::Data<EnrollmentService>,
    req: HttpRequest,
    query: web::Query<EnrollmentQuery>,
) -> Result<HttpResponse> {
    Ok(members_response(service.get_ref(), current_user(&req), &query).await)
}

#[utoipa::path(
    get,
    path = "/finger/stats",
    tag = "finger",
    params(
        ("organizationId" = Option<i64>, Query, description = "Defaults to the caller's organization")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Enrollment counts", body = EnrollmentStats),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Backend fetch failed", body = ErrorResponse)
    )
)]
pub async fn get_stats(
    service: web::Data<EnrollmentService>,
    req: HttpRequest,
    query: web::Query<StatsQuery>,
) -> Result<HttpResponse> {
    Ok(stats_response(service.get_ref(), current_user(&req), &query).await)
}

pub fn finger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/finger")
            .route("/members", web::get().to(get_members))
            .route("/stats", web::get().to(get_stats)),
    );
}
