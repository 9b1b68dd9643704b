use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use siteup::{CheckError, CheckOutcome, Observation, ObservationStore, Orchestrator, SiteId};

use crate::error::ApiError;

const DEFAULT_HISTORY_LIMIT: usize = 50;
const MAX_HISTORY_LIMIT: usize = 1000;

macros_utils::routes! {
    route check_route,
    route check_all_route,
    route history_route,
}

/// Check a single site now and return its current state.
#[post("/check/{site_id}")]
pub async fn check_route(
    orchestrator: web::Data<Orchestrator>,
    site_id: web::Path<SiteId>,
) -> Result<web::Json<CheckOutcome>, ApiError> {
    let outcome = orchestrator.check_site(site_id.into_inner()).await?;
    Ok(web::Json(outcome))
}

/// Check every known site. Per-site failures are only logged.
#[post("/check-all")]
pub async fn check_all_route(orchestrator: web::Data<Orchestrator>) -> Result<HttpResponse, ApiError> {
    let report = orchestrator.check_all_sites().await?;
    for failure in &report.failed {
        tracing::warn!(site_id = failure.site_id, "Check failed: {}", failure.error);
    }
    Ok(HttpResponse::NoContent().finish())
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    limit: Option<usize>,
}

/// Recent observations of a site, newest first.
#[get("/checks/{site_id}")]
pub async fn history_route(
    orchestrator: web::Data<Orchestrator>,
    site_id: web::Path<SiteId>,
    query: web::Query<HistoryQuery>,
) -> Result<web::Json<Vec<Observation>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).min(MAX_HISTORY_LIMIT);
    let observations = orchestrator
        .store()
        .recent(site_id.into_inner(), limit)
        .await
        .map_err(CheckError::from)?;
    Ok(web::Json(observations))
}
