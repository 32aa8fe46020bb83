use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;

const PING_TIMEOUT: Duration = Duration::from_secs(2);

/// TCP connect round trip to `host:port` in milliseconds, or `None` when the
/// address does not resolve or nothing answers within two seconds.
pub async fn ping(host: &str, port: u16) -> Option<u128> {
    let started = Instant::now();
    match timeout(PING_TIMEOUT, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => Some(started.elapsed().as_millis()),
        Ok(Err(err)) => {
            tracing::debug!(host, port, error = %err, "ping failed");
            None
        }
        Err(_) => {
            tracing::debug!(host, port, "ping timed out");
            None
        }
    }
}
