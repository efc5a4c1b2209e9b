pub mod config;
mod routes;
#[cfg(feature = "test-helpers")]
pub mod test_helpers;

use std::sync::Arc;

use anyhow::Result;
use listkeeper_service::ListService;
use tokio::net::TcpListener;

pub use routes::{build_router, AppState, InnerAppState};

pub async fn serve(listener: TcpListener, service: Arc<dyn ListService>) -> Result<()> {
    let state = Arc::new(InnerAppState { service });
    let app = routes::build_router(state);
    axum::serve(listener, app).await?;
    Ok(())
}
