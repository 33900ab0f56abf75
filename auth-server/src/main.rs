// auth-server/src/main.rs
use actix_web::{App, HttpServer};
use auth_server::AppState;
use common::{setup_tracing, Config, StartupError};

#[actix_web::main]
async fn main() -> Result<(), StartupError> {
    // Setup tracing
    setup_tracing()?;

    // A missing signing secret stops the process here
    let config = Config::load().map_err(|e| {
        tracing::error!("{}", e);
        e
    })?;

    let server_addr = config.server.bind_addr();
    let state = AppState::new(&config)?;

    tracing::info!("Starting auth server on {}", server_addr);

    HttpServer::new(move || {
        let state = state.clone();
        App::new().configure(move |cfg| auth_server::configure(cfg, &state))
    })
    .bind(&server_addr)?
    .run()
    .await?;

    Ok(())
}
