use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::services::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub store: UserStore,
    /// Interval between keep-alive comments on idle event streams.
    pub keep_alive: Duration,
    pub mask_passwords: bool,
    /// Flipped to `true` when the server stops; open event streams end on it.
    shutdown: Arc<watch::Sender<bool>>,
}

impl AppState {
    pub fn new(store: UserStore, keep_alive: Duration, mask_passwords: bool) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            store,
            keep_alive,
            mask_passwords,
            shutdown: Arc::new(shutdown),
        }
    }

    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Ask every open event stream to finish.
    pub fn begin_shutdown(&self) {
        self.shutdown.send_replace(true);
    }
}
