use crate::api::routes::{self, AppState};
use crate::config::Config;
use crate::db::Database;
use crate::errors::Error;
use std::future::Future;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Starts and runs the HTTP server using Axum web framework
///
/// Opens the store named by the configuration, binds the listener and serves
/// until Ctrl-C is received.
///
/// # Arguments
/// * `config` - Fully resolved service configuration
///
/// # Returns
/// * `Result<(), Error>` - Ok after a graceful shutdown, Error if startup or serving fails
///
/// # Example
/// ```no_run
/// use todo_api::api::server;
/// use todo_api::config::Config;
///
/// #[tokio::main]
/// async fn main() -> Result<(), todo_api::errors::Error> {
///     server::launch_server(&Config::default()).await
/// }
/// ```
pub async fn launch_server(config: &Config) -> Result<(), Error> {
    let database = Database::connect(config.database_url(), &config.database)?;
    let state = AppState::new(database, config.testing)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    serve(listener, state, shutdown_signal()).await
}

/// Serves the API on an already bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<(), Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, routes::app(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IN_MEMORY_DATABASE_URL;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_serves_health_until_shutdown() {
        let database =
            Database::connect(IN_MEMORY_DATABASE_URL, &Default::default()).unwrap();
        let state = AppState::new(database, true).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

        let server = tokio::spawn(serve(listener, state, async {
            let _ = stop_rx.await;
        }));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /api/v1/health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();

        assert!(raw.starts_with("HTTP/1.1 200"));
        assert!(raw.contains(r#"{"status":"ok"}"#));

        stop_tx.send(()).unwrap();
        let result = tokio::time::timeout(std::time::Duration::from_secs(3), server).await;
        assert!(matches!(result, Ok(Ok(Ok(())))));
    }
}
