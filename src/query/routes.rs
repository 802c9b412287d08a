//! HTTP surface of the query service. Read-only: there are no mutation routes.

use crate::query::QueryService;
use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;
use tracing::error;

/// Get the rating of an album by its slug
#[get("/rating/{album_slug}")]
pub async fn get_rating(
    service: web::Data<QueryService>,
    album_slug: web::Path<String>,
) -> impl Responder {
    let album_slug = album_slug.into_inner();

    match service.lookup(&album_slug) {
        Ok(Some(rating)) => HttpResponse::Ok().json(json!({
            "album": album_slug,
            "rating": rating.rating,
            "review_count": rating.review_count,
        })),
        Ok(None) => HttpResponse::NotFound().json(json!({
            "error": format!("Could not find album {} in cache", album_slug)
        })),
        Err(e) => {
            error!("Failed to read rating for {}: {}", album_slug, e);
            HttpResponse::InternalServerError().json(json!({
                "error": "Failed to read from the rating store"
            }))
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_rating);
}
