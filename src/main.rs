use std::io;

use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use taskdeck::{docs, rate_limit::RateLimit, routes, AppState, Config};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env().map_err(io::Error::other)?;
    let default_filter = if config.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let state = AppState::from_config(&config)
        .await
        .map_err(io::Error::other)?;
    let api_docs = config.api_docs;

    log::info!(
        "starting {} ({}) at {}",
        config.app_name,
        config.profile.as_str(),
        config.server_url()
    );
    if api_docs {
        log::info!("API docs at {}/docs/", config.server_url());
    }

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(RateLimit::new(state.limiter.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(|cfg| docs::config(cfg, api_docs))
            .configure(|cfg| routes::config(cfg, &state))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
