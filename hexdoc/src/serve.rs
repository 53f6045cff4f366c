use std::{net::SocketAddr, path::Path};

use axum::Router;
use color_eyre::eyre::{Context, Result};
use log::info;
use tower_http::services::ServeDir;

/// Serve `root` over HTTP on localhost until interrupted.
///
/// # Errors
///
/// Returns an error if the runtime cannot start or the port cannot be bound.
pub fn serve(root: &Path, port: u16) -> Result<()> {
  let runtime = tokio::runtime::Builder::new_multi_thread()
    .enable_all()
    .build()
    .wrap_err("Failed to start async runtime")?;

  runtime.block_on(async {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
      .await
      .wrap_err_with(|| format!("Failed to bind {addr}"))?;

    let app = Router::new().fallback_service(ServeDir::new(root));
    info!("Serving {} at http://{addr}/", root.display());

    axum::serve(listener, app).await.wrap_err("Server error")
  })
}
