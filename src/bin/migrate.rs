//! Applies pending database migrations and exits.

use std::io;

use taskdeck::{db, Config};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(io::Error::other)?;
    let url = config.database_url.as_deref().ok_or_else(|| {
        io::Error::other(format!(
            "{} or DATABASE_URL must be set to run migrations",
            config.profile.database_key()
        ))
    })?;

    log::info!("migrating the {} database", config.profile.as_str());
    let pool = db::connect(url, &config.pool)
        .await
        .map_err(io::Error::other)?;
    db::migrate(&pool).await.map_err(io::Error::other)?;
    pool.close().await;
    Ok(())
}
