use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use dotenvy::dotenv;
use tracing::info;
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use budget_api::config::AppConfig;
use budget_api::extractors::{FixedIdentity, IdentityResolver};
use budget_api::user::service::UserService;
use budget_api::{db, openapi, routes};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();

    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(io::Error::other)?;

    let pool = db::connect(&config).await.map_err(io::Error::other)?;
    db::run_migrations(&pool).await.map_err(io::Error::other)?;

    let acting = &config.acting_user;
    UserService::ensure_user(&pool, acting.id, &acting.email, &acting.name)
        .await
        .map_err(|e| io::Error::other(e.to_string()))?;

    let identity: Arc<dyn IdentityResolver> = Arc::new(FixedIdentity::new(acting.id));
    let identity = web::Data::from(identity);

    let bind_addr = (config.host.clone(), config.port);
    info!("Starting server at http://{}:{}", bind_addr.0, bind_addr.1);

    let config = web::Data::new(config);

    HttpServer::new(move || {
        let cors_config = config.clone();

        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                origin
                    .to_str()
                    .map(|o| cors_config.is_origin_allowed(o))
                    .unwrap_or(false)
            })
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            // Middleware (order matters: outer to inner)
            .wrap(TracingLogger::default())
            .wrap(cors)
            // Shared state
            .app_data(web::Data::new(pool.clone()))
            .app_data(identity.clone())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
            )
            .configure(routes::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
