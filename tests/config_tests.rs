use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;
use std::time::Duration;
use userfeed::config;

// Tests below mutate process-wide environment variables.
static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

#[test]
fn test_sanitize_base_url_removes_trailing_slash() {
    assert_eq!(
        config::sanitize_base_url("http://feed.example.com/"),
        "http://feed.example.com"
    );
}

#[test]
fn test_sanitize_base_url_multiple_trailing_slashes() {
    assert_eq!(
        config::sanitize_base_url("http://feed.example.com/app///"),
        "http://feed.example.com/app"
    );
}

#[test]
fn test_sanitize_base_url_with_whitespace() {
    assert_eq!(
        config::sanitize_base_url("  http://feed.example.com/  "),
        "http://feed.example.com"
    );
}

#[test]
fn test_sanitize_base_url_empty_string() {
    assert_eq!(config::sanitize_base_url("   "), config::DEFAULT_FEED_URL);
}

#[test]
fn test_sse_url_appends_relative_path() {
    assert_eq!(config::sse_url("http://127.0.0.1:3000/"), "http://127.0.0.1:3000/sse");
    assert_eq!(config::sse_url("http://host/app"), "http://host/app/sse");
}

#[test]
fn test_parse_flag() {
    assert!(config::parse_flag("true"));
    assert!(config::parse_flag(" YES "));
    assert!(config::parse_flag("1"));
    assert!(!config::parse_flag("0"));
    assert!(!config::parse_flag(""));
}

#[test]
fn test_get_feed_url_from_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    env::set_var("USERFEED_URL", "http://feed.example.com:8000/");

    assert_eq!(config::get_feed_url(), "http://feed.example.com:8000");

    env::remove_var("USERFEED_URL");
    assert_eq!(config::get_feed_url(), config::DEFAULT_FEED_URL);
}

#[test]
fn test_get_port_falls_back_on_garbage() {
    let _guard = ENV_LOCK.lock().unwrap();
    env::set_var("USERFEED_PORT", "not-a-port");
    assert_eq!(config::get_port(), config::DEFAULT_PORT);

    env::set_var("USERFEED_PORT", "4100");
    assert_eq!(config::get_port(), 4100);

    env::remove_var("USERFEED_PORT");
}

#[test]
fn test_keep_alive_and_capacity_reject_zero() {
    let _guard = ENV_LOCK.lock().unwrap();
    env::set_var("USERFEED_KEEP_ALIVE_SECS", "0");
    env::set_var("USERFEED_CHANNEL_CAPACITY", "0");

    assert_eq!(config::get_keep_alive(), Duration::from_secs(config::DEFAULT_KEEP_ALIVE_SECS));
    assert_eq!(config::get_channel_capacity(), config::DEFAULT_CHANNEL_CAPACITY);

    env::set_var("USERFEED_KEEP_ALIVE_SECS", "15");
    assert_eq!(config::get_keep_alive(), Duration::from_secs(15));

    env::remove_var("USERFEED_KEEP_ALIVE_SECS");
    env::remove_var("USERFEED_CHANNEL_CAPACITY");
}

#[test]
fn test_users_file_default() {
    let _guard = ENV_LOCK.lock().unwrap();
    env::remove_var("USERFEED_USERS_FILE");
    assert_eq!(config::get_users_file(), std::path::PathBuf::from(config::DEFAULT_USERS_FILE));
}

#[test]
fn test_file_poll_interval_from_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    env::set_var("USERFEED_FILE_POLL_MS", "0");
    assert_eq!(
        config::get_file_poll_interval(),
        Duration::from_millis(config::DEFAULT_FILE_POLL_MS)
    );

    env::set_var("USERFEED_FILE_POLL_MS", "250");
    assert_eq!(config::get_file_poll_interval(), Duration::from_millis(250));

    env::remove_var("USERFEED_FILE_POLL_MS");
}
