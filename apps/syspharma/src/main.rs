//! # SysPharma Entry Point
//!
//! Boots logging, configuration and local storage, makes sure an admin can
//! log in, and reports the dashboard numbers.
//!
//! ## Usage
//! ```bash
//! syspharma                      # config from the platform config dir
//! syspharma --config ./dev.toml  # explicit config file
//! SYSPHARMA_DB_PATH=/tmp/s.db syspharma
//! ```

use std::path::PathBuf;
use syspharma::commands::dashboard;
use syspharma::{init_tracing, App, AppConfig};
use tracing::{info, warn};

fn config_path() -> Option<PathBuf> {
    let args: Vec<String> = std::env::args().collect();
    args.iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting SysPharma");

    let config = AppConfig::load(config_path())?;
    let app = App::new(config).await?;

    if app.ensure_default_admin().await? {
        warn!(
            email = %app.config().admin.email,
            "Created the default admin account; change its password after logging in"
        );
    }

    let tab = app.open_tab();
    let stats = dashboard::collect(&tab).await?;
    info!(
        usuarios = stats.usuarios,
        productos = stats.productos,
        proveedores = stats.proveedores,
        compras = stats.compras,
        ventas = stats.ventas,
        citas_pendientes = stats.citas_pendientes,
        bajo_stock = stats.bajo_stock.len(),
        total_ventas = %stats.total_ventas,
        "Storage ready"
    );

    for producto in &stats.bajo_stock {
        warn!(codigo = %producto.codigo, stock = producto.stock, "Low stock");
    }

    app.close().await;
    Ok(())
}
