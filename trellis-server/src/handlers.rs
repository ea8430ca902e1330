use actix_web::{get, post, web, HttpResponse, Responder};
use serde_json::json;
use trellis_core::Definition;
use trellis_engine::service::{ListParams, ServiceError};

use crate::state::AppState;

fn error_body(message: impl std::fmt::Display) -> serde_json::Value {
    json!({ "error": message.to_string() })
}

fn unknown_domain(domain: &str) -> HttpResponse {
    HttpResponse::NotFound().json(error_body(format!("unknown domain: {domain}")))
}

fn error_response(err: ServiceError) -> HttpResponse {
    match &err {
        ServiceError::InvalidPage
        | ServiceError::InvalidPageSize
        | ServiceError::PageOutOfRange { .. } => HttpResponse::BadRequest().json(error_body(&err)),
        ServiceError::NotFound(_) => HttpResponse::NotFound().json(error_body(&err)),
        _ => {
            tracing::error!(error = %err, "request failed");
            HttpResponse::InternalServerError().json(error_body(&err))
        }
    }
}

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "trellis",
    }))
}

#[post("/{domain}")]
pub async fn submit_run(
    data: web::Data<AppState>,
    path: web::Path<String>,
    definition: web::Json<Definition>,
) -> impl Responder {
    let domain = path.into_inner();
    let service = match data.service_for(&domain) {
        Some(s) => s,
        None => return unknown_domain(&domain),
    };

    match service.submit(definition.into_inner()).await {
        Ok(run) => HttpResponse::Created().json(run),
        Err(e) => error_response(e),
    }
}

#[get("/{domain}/{id}")]
pub async fn get_run(data: web::Data<AppState>, path: web::Path<(String, i64)>) -> impl Responder {
    let (domain, id) = path.into_inner();
    let service = match data.service_for(&domain) {
        Some(s) => s,
        None => return unknown_domain(&domain),
    };

    match service.get(id).await {
        Ok(run) => HttpResponse::Ok().json(run),
        Err(e) => error_response(e),
    }
}

#[get("/{domain}")]
pub async fn list_runs(
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ListParams>,
) -> impl Responder {
    let domain = path.into_inner();
    let service = match data.service_for(&domain) {
        Some(s) => s,
        None => return unknown_domain(&domain),
    };

    match service.list(&query).await {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(e) => error_response(e),
    }
}
