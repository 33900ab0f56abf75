// auth-server/src/static_files.rs
use actix_files::Files;
use actix_web::web;
use common::StaticFilesConfig;

// Serve the demo client. Mounted at "/", so it has to be registered last.
pub fn configure(cfg: &mut web::ServiceConfig, config: &StaticFilesConfig) {
    cfg.service(
        Files::new("/", &config.path)
            .index_file(&config.index)
            .prefer_utf8(true)
            .use_etag(true)
            .use_last_modified(true),
    );
}
