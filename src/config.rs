use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

// Default configuration constants
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_USERS_FILE: &str = "users.json";
pub const DEFAULT_FEED_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_KEEP_ALIVE_SECS: u64 = 1;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;
pub const DEFAULT_FILE_POLL_MS: u64 = 1000;
pub const KEEP_ALIVE_TEXT: &str = "keep-alive-text";
/// Relative path of the push endpoint, resolved against the feed base URL.
pub const SSE_PATH: &str = "sse";
/// Element id of the table the browser client keeps in sync.
pub const TABLE_ELEMENT_ID: &str = "user-list";

pub fn load_env_file(env_file: Option<&str>) {
    if let Some(path) = env_file {
        dotenvy::from_path(Path::new(path)).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

pub fn get_host() -> String {
    env::var("USERFEED_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string())
}

pub fn get_port() -> u16 {
    env::var("USERFEED_PORT")
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

pub fn get_users_file() -> PathBuf {
    env::var("USERFEED_USERS_FILE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_USERS_FILE))
}

pub fn get_feed_url() -> String {
    sanitize_base_url(&env::var("USERFEED_URL").unwrap_or_else(|_| DEFAULT_FEED_URL.to_string()))
}

pub fn get_keep_alive() -> Duration {
    let secs = env::var("USERFEED_KEEP_ALIVE_SECS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|s| *s > 0)
        .unwrap_or(DEFAULT_KEEP_ALIVE_SECS);
    Duration::from_secs(secs)
}

pub fn get_channel_capacity() -> usize {
    env::var("USERFEED_CHANNEL_CAPACITY")
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|c| *c > 0)
        .unwrap_or(DEFAULT_CHANNEL_CAPACITY)
}

/// How often a running server re-reads the users file for outside edits.
pub fn get_file_poll_interval() -> Duration {
    let ms = env::var("USERFEED_FILE_POLL_MS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .unwrap_or(DEFAULT_FILE_POLL_MS);
    Duration::from_millis(ms)
}

pub fn get_mask_passwords() -> bool {
    env::var("USERFEED_MASK_PASSWORDS")
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

pub fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

pub fn sanitize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_FEED_URL.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Joins the push endpoint path onto a feed base URL.
pub fn sse_url(base_url: &str) -> String {
    format!("{}/{}", sanitize_base_url(base_url), SSE_PATH)
}
