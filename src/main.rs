use actix_web::{App, HttpServer, middleware, web};
use dotenvy::dotenv;
use env_logger::Env;
use log::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
mod api;
mod config;
mod error;
mod mapbox;
mod referer;
mod routes;
mod state;
use api::{docs::ApiDoc, map};
use config::Config;
use state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env if present
    dotenv().ok();

    // Initialize logger (RUST_LOG overrides default if set)
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    let state = web::Data::new(AppState::from_config(&config).map_err(std::io::Error::other)?);

    info!(
        "Proxying {} for {} allowed referer domain(s), upstream timeout {:?}",
        config.api_base,
        config.allowed_referers.len(),
        config.upstream_timeout
    );
    info!("Server running at http://{}:{}", config.bind_addr, config.port);
    HttpServer::new(move || {
        App::new()
            // Log each incoming request with status, time, and size
            .wrap(middleware::Logger::new("%a \"%r\" %s %b %T"))
            .app_data(state.clone())
            .service(SwaggerUi::new("/docs/{_:.*}").url("/api/openapi.json", ApiDoc::openapi()))
            .service(web::scope("/api")
                .wrap(middleware::NormalizePath::trim())
                .configure(map::init_routes)
            )
            .default_service(web::route().to(routes::not_found))
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}
