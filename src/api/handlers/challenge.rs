use actix_web::{web, HttpResponse};
use crate::api::models::{ChallengePayload, ChallengeResponse, Status};
use crate::api::server::ApiState;
use crate::solver::ChallengeAction;
use tracing::{info, warn};

/// `POST /apis/{group}/v1alpha1/{solver}`
///
/// Solver failures are reported inside the payload with HTTP 200 so that
/// cert-manager records the message on the Challenge and retries it.
pub async fn solve(
    state: web::Data<ApiState>,
    path: web::Path<(String, String)>,
    payload: web::Json<ChallengePayload>,
) -> actix_web::Result<HttpResponse> {
    let (group, resource) = path.into_inner();

    if group != state.settings.webhook.group_name || resource != state.solver.name() {
        return Ok(HttpResponse::NotFound().json(Status::failure(
            404,
            "NotFound",
            format!("no solver {} registered in group {}", resource, group),
        )));
    }

    let Some(request) = payload.into_inner().request else {
        return Ok(HttpResponse::BadRequest().json(Status::failure(
            400,
            "BadRequest",
            "challenge payload has no request",
        )));
    };

    let action = request.action.unwrap_or(ChallengeAction::Unknown);
    info!(
        uid = %request.uid,
        action = %action,
        fqdn = %request.resolved_fqdn,
        namespace = %request.resource_namespace,
        "Handling challenge request"
    );

    let result = match action {
        ChallengeAction::Present => state.solver.present(&request).await,
        ChallengeAction::CleanUp => state.solver.clean_up(&request).await,
        ChallengeAction::Unknown => {
            warn!(uid = %request.uid, "Unsupported challenge action");
            let response = ChallengeResponse::failure(
                request.uid.clone(),
                "unsupported challenge action",
            );
            return Ok(HttpResponse::Ok().json(ChallengePayload::answer(Some(request), response)));
        }
    };

    let response = match result {
        Ok(()) => {
            info!(uid = %request.uid, action = %action, "Challenge request succeeded");
            ChallengeResponse::success(request.uid.clone())
        }
        Err(e) => {
            warn!(uid = %request.uid, action = %action, error = %e, "Challenge request failed");
            ChallengeResponse::failure(request.uid.clone(), e.to_string())
        }
    };

    Ok(HttpResponse::Ok().json(ChallengePayload::answer(Some(request), response)))
}
