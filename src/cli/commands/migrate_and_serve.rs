use anyhow::Result;
use tracing::{debug, info, trace};

use super::initdb::init_database;
use super::serve::run_server;
use crate::config::{app_state, Settings};
use crate::router::create_router_with_timeout;

pub async fn migrate_and_serve(settings: &Settings) -> Result<()> {
    trace!("Entering migrate_and_serve function");
    info!("Applying database migrations and starting server");

    // Serve over the migrated connection
    let db = init_database(settings).await?;
    let state = app_state(db, settings);
    debug!("Application state initialized successfully");

    let app = create_router_with_timeout(state, settings.request_timeout());
    debug!("Router created successfully");

    run_server(app, &settings.bind_address).await
}
