use std::{net::SocketAddr, path::Path};

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;

use crate::{api, db, error::Error};

/// Serves the query API until interrupted.
pub async fn serve(db_path: &Path, bind: SocketAddr) -> Result<()> {
    let pool = db::connect_existing(db_path).await?;
    let app = api::router(pool.clone());

    let listener = TcpListener::bind(bind)
        .await
        .map_err(|source| Error::ServerBind {
            address: bind.to_string(),
            source,
        })?;
    info!("Serving {} on http://{}", db_path.display(), bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    pool.close().await;

    Ok(())
}
