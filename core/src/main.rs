// regression-serve - inference endpoint
// Loads a scaler + linear model pair once and serves /predict over HTTP.

use tokio::sync::oneshot;

use regression_serve::config::ServeConfig;
use regression_serve::run_until_shutdown;

fn main() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let args: Vec<String> = std::env::args().collect();
    if let Err(error) = run_console(&args) {
        log::error!("[SERVE] {}", error);
        std::process::exit(1);
    }
}

fn run_console(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServeConfig::from_env_and_args(args)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        tokio::spawn(async move {
            if let Err(error) = tokio::signal::ctrl_c().await {
                log::error!("[SERVE] Failed to listen for shutdown: {}", error);
            }
            let _ = shutdown_tx.send(());
        });

        run_until_shutdown(config, shutdown_rx).await
    })?;

    Ok(())
}
