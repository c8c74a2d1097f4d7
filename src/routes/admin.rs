use actix_web::{web, HttpResponse};

use crate::configuration::Settings;
use crate::error::AppError;
use crate::middleware::SiteHits;
use crate::store::Storage;

/// GET /admin/metrics
pub async fn metrics(hits: web::Data<SiteHits>) -> HttpResponse {
    let body = format!(
        "<html>\n  <body>\n    <h1>Welcome, Pipit Admin</h1>\n    <p>Pipit has been visited {} times!</p>\n  </body>\n</html>\n",
        hits.current()
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// POST /admin/reset
///
/// Wipes every user (posts and refresh tokens go with them) and zeroes the
/// hit counter. Only answers on the `dev` platform.
pub async fn reset(
    storage: web::Data<Storage>,
    settings: web::Data<Settings>,
    hits: web::Data<SiteHits>,
) -> Result<HttpResponse, AppError> {
    if settings.application.platform != "dev" {
        return Err(AppError::Forbidden(
            "reset is only available on the dev platform".to_string(),
        ));
    }

    storage.posts.delete_all_posts().await?;
    storage.users.delete_all_users().await?;
    hits.reset();

    tracing::info!("store wiped and hit counter reset");

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hits reset to 0 and store cleared"))
}
