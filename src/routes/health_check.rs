use actix_web::HttpResponse;

pub async fn health_check() -> HttpResponse {
    tracing::debug!("health check endpoint called");
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("OK")
}
