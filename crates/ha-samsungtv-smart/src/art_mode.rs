//! Art Mode control
//!
//! The TV's WebSocket client is synchronous. It is kept behind
//! [`ArtModeClient`] and every call runs on tokio's blocking pool.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtModeError {
    #[error("cannot connect to {host}: {reason}")]
    Connection { host: String, reason: String },

    #[error("TV does not support Art Mode")]
    Unsupported,

    #[error("art mode request failed: {0}")]
    Request(String),

    #[error("art mode job did not complete: {0}")]
    Join(String),
}

/// Blocking client for one TV
pub trait ArtModeClient: Send + Sync + 'static {
    fn set_art_mode(&self, on: bool) -> Result<(), ArtModeError>;
}

/// Builds a client from the `host` stored in a config entry
pub trait ArtModeConnector: Send + Sync {
    fn connect(&self, host: &str) -> Result<Arc<dyn ArtModeClient>, ArtModeError>;
}

impl<F> ArtModeConnector for F
where
    F: Fn(&str) -> Result<Arc<dyn ArtModeClient>, ArtModeError> + Send + Sync,
{
    fn connect(&self, host: &str) -> Result<Arc<dyn ArtModeClient>, ArtModeError> {
        self(host)
    }
}

/// Switch Art Mode without blocking the runtime
pub async fn set_art_mode(client: &Arc<dyn ArtModeClient>, on: bool) -> Result<(), ArtModeError> {
    let client = Arc::clone(client);
    debug!(on, "Dispatching art mode request");

    tokio::task::spawn_blocking(move || client.set_art_mode(on))
        .await
        .map_err(|e| ArtModeError::Join(e.to_string()))??;

    info!(on, "Art mode set");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(AtomicUsize);

    impl ArtModeClient for Counting {
        fn set_art_mode(&self, _on: bool) -> Result<(), ArtModeError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Refusing;

    impl ArtModeClient for Refusing {
        fn set_art_mode(&self, _on: bool) -> Result<(), ArtModeError> {
            Err(ArtModeError::Unsupported)
        }
    }

    struct Panicking;

    impl ArtModeClient for Panicking {
        fn set_art_mode(&self, _on: bool) -> Result<(), ArtModeError> {
            panic!("socket closed");
        }
    }

    #[tokio::test]
    async fn test_request_runs_on_client() {
        let counting = Arc::new(Counting(AtomicUsize::new(0)));
        let client: Arc<dyn ArtModeClient> = counting.clone();

        set_art_mode(&client, true).await.unwrap();
        set_art_mode(&client, false).await.unwrap();
        assert_eq!(counting.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_error_is_returned() {
        let client: Arc<dyn ArtModeClient> = Arc::new(Refusing);
        assert_eq!(set_art_mode(&client, true).await, Err(ArtModeError::Unsupported));
    }

    #[tokio::test]
    async fn test_panicking_client_maps_to_join_error() {
        let client: Arc<dyn ArtModeClient> = Arc::new(Panicking);
        assert!(matches!(
            set_art_mode(&client, false).await,
            Err(ArtModeError::Join(_))
        ));
    }

    #[test]
    fn test_closure_connector() {
        let connector = |host: &str| -> Result<Arc<dyn ArtModeClient>, ArtModeError> {
            if host.is_empty() {
                return Err(ArtModeError::Connection {
                    host: host.to_string(),
                    reason: "empty host".to_string(),
                });
            }
            Ok(Arc::new(Refusing))
        };

        assert!(connector.connect("192.168.1.20").is_ok());
        assert!(matches!(
            connector.connect(""),
            Err(ArtModeError::Connection { .. })
        ));
    }
}
