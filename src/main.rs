use std::sync::Arc;

use tokio::net::TcpListener;

use toolkithub::config::Config;
use toolkithub::errors::AppError;
use toolkithub::handlers;
use toolkithub::logger::Logger;
use toolkithub::services::AuthService;
use toolkithub::store::Store;
use toolkithub::types::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    if let Err(e) = Logger::init() {
        eprintln!("Failed to install logger: {e}");
    }

    let config = Arc::new(Config::from_env());
    let store = Arc::new(Store::open(config.data_dir.clone())?);

    AuthService::new(store.clone(), &config).ensure_bootstrap_admin(
        &config.bootstrap_admin_email,
        &config.bootstrap_admin_password,
    )?;

    let addr = config.socket_addr();
    let state = AppState { store, config };
    let app = handlers::router(state);

    log::info!("ToolkitHub listening on http://{addr}");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await.map_err(AppError::from)
}
