use actix_web::{HttpResponse, Responder, get, web};
use siteup::{ObservationStore, Orchestrator};

macros_utils::routes! {
    route health_route,
}

/// Health check route
/// No body, the status says whether the observation store answers.
#[get("/")]
pub async fn health_route(orchestrator: web::Data<Orchestrator>) -> impl Responder {
    match orchestrator.store().most_recent(0).await {
        Ok(_) => HttpResponse::Ok(),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            HttpResponse::ServiceUnavailable()
        }
    }
}
