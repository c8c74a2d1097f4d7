use std::net::TcpListener;
use std::sync::Arc;

use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};

use crate::auth::SessionManager;
use crate::configuration::Settings;
use crate::middleware::{AuthMiddleware, CountHits, RequestLogger, SiteHits};
use crate::routes::{
    create_post, create_user, delete_post, get_post, health_check, list_posts, login, metrics,
    payment_webhook, refresh, reset, revoke, update_user,
};
use crate::store::Storage;

pub fn run(
    listener: TcpListener,
    storage: Storage,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let sessions = Arc::new(SessionManager::new(
        storage.users.clone(),
        storage.refresh_tokens.clone(),
        settings.auth.clone(),
    ));
    let hits = Arc::new(SiteHits::default());

    let storage = web::Data::new(storage);
    let settings = web::Data::new(settings);
    let sessions_data = web::Data::from(sessions.clone());
    let hits_data = web::Data::from(hits.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            // Shared state
            .app_data(storage.clone())
            .app_data(settings.clone())
            .app_data(sessions_data.clone())
            .app_data(hits_data.clone())
            .service(
                web::scope("/api")
                    // Public routes
                    .route("/healthz", web::get().to(health_check))
                    .route("/users", web::post().to(create_user))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/revoke", web::post().to(revoke))
                    .route("/posts", web::get().to(list_posts))
                    .route("/posts/{post_id}", web::get().to(get_post))
                    .route("/webhooks/payments", web::post().to(payment_webhook))
                    // Routes that require a valid access token
                    .service(
                        web::scope("")
                            .wrap(AuthMiddleware::new(sessions.clone()))
                            .route("/users", web::put().to(update_user))
                            .route("/posts", web::post().to(create_post))
                            .route("/posts/{post_id}", web::delete().to(delete_post)),
                    ),
            )
            .service(
                web::scope("/admin")
                    .route("/metrics", web::get().to(metrics))
                    .route("/reset", web::post().to(reset)),
            )
            // Static site, counted per request
            .service(
                web::scope("/app")
                    .wrap(CountHits::new(hits.clone()))
                    .service(fs::Files::new("/", "./public").index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
