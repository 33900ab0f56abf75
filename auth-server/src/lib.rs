// auth-server/src/lib.rs
pub mod api;
pub mod gate;
pub mod socket;
pub mod static_files;

use actix::{Actor, Addr};
use actix_web::web;
use common::{Config, StartupError, StaticFilesConfig, TokenIssuer};

use gate::ConnectionGate;
use socket::hub::EventHub;

/// Shared, read-only application state.
///
/// Must be created inside a running actix system, since it starts the
/// event hub.
#[derive(Clone)]
pub struct AppState {
    pub issuer: web::Data<TokenIssuer>,
    pub gate: web::Data<ConnectionGate>,
    pub hub: web::Data<Addr<EventHub>>,
    pub static_files: StaticFilesConfig,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, StartupError> {
        let issuer = TokenIssuer::new(&config.auth.jwt_secret)?;
        let gate = ConnectionGate::new(issuer.clone());
        let hub = EventHub::new().start();

        Ok(Self {
            issuer: web::Data::new(issuer),
            gate: web::Data::new(gate),
            hub: web::Data::new(hub),
            static_files: config.static_files.clone(),
        })
    }
}

/// Register state and every route of the service
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(state.issuer.clone())
        .app_data(state.gate.clone())
        .app_data(state.hub.clone())
        .configure(api::configure)
        .configure(socket::configure);

    static_files::configure(cfg, &state.static_files);
}
