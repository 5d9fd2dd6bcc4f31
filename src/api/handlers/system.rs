use actix_web::{web, HttpResponse};
use crate::api::models::{ApiResourceList, HealthResponse, Status};
use crate::api::server::ApiState;
use chrono::Utc;
use tracing::debug;

pub async fn health(
    state: web::Data<ApiState>,
) -> actix_web::Result<HttpResponse> {
    let response = HealthResponse {
        status: "healthy".to_string(),
        solver: state.solver.name().to_string(),
        group_name: state.settings.webhook.group_name.clone(),
        timestamp: Utc::now(),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// API discovery for `/apis/{group}/v1alpha1`, queried by the aggregator
pub async fn discovery(
    state: web::Data<ApiState>,
    path: web::Path<String>,
) -> actix_web::Result<HttpResponse> {
    let group = path.into_inner();

    if group != state.settings.webhook.group_name {
        debug!("Discovery requested for unknown group {}", group);
        return Ok(HttpResponse::NotFound().json(Status::failure(
            404,
            "NotFound",
            format!("API group {} is not served here", group),
        )));
    }

    Ok(HttpResponse::Ok().json(ApiResourceList::for_solver(
        &state.settings.webhook.group_name,
        state.solver.name(),
    )))
}
