// tests/config_env.rs
//! Configuration resolution from the environment. Serialized because the
//! process environment is shared test state.

use std::env;

use newsalert::{Config, DedupeBy, Overrides};
use serial_test::serial;

const VARS: &[&str] = &[
    "TELEGRAM_BOT_TOKEN",
    "TELEGRAM_CHAT_IDS",
    "TELEGRAM_CHAT_ID",
    "TELEGRAM_API_BASE",
    "SENDGRID_API_KEY",
    "SENDGRID_API_BASE",
    "EMAIL_FROM",
    "EMAIL_TO",
    "TWILIO_SID",
    "TWILIO_TOKEN",
    "TWILIO_FROM",
    "TWILIO_TO",
    "TWILIO_API_BASE",
    "CATEGORY",
    "MAX_HEADLINES",
    "REQUEST_TIMEOUT",
    "NEWSALERT_DEDUPE_BY",
    "NEWSALERT_FEEDS_PATH",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn missing_credentials_fail_before_any_network_io() {
    clear_env();
    let err = Config::resolve(Overrides::default()).unwrap_err();
    assert!(err.to_string().contains("no delivery channel configured"));
}

#[test]
#[serial]
fn dry_run_needs_no_channels() {
    clear_env();
    let config = Config::resolve(Overrides {
        dry_run: true,
        ..Default::default()
    })
    .unwrap();
    assert!(config.dry_run);
    assert!(config.telegram.is_none());
    assert_eq!(config.category, "world");
    assert_eq!(config.max_headlines, 8);
    assert_eq!(config.dedupe_by, DedupeBy::Link);
    assert!(!config.feeds.is_empty());
}

#[test]
#[serial]
fn partial_telegram_config_is_an_error_not_a_skip() {
    clear_env();
    env::set_var("TELEGRAM_BOT_TOKEN", "TOKEN");
    let err = Config::resolve(Overrides::default()).unwrap_err();
    assert!(err.to_string().contains("no chat id"));

    clear_env();
    env::set_var("TELEGRAM_CHAT_IDS", "-100123");
    let err = Config::resolve(Overrides::default()).unwrap_err();
    assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN is missing"));
    clear_env();
}

#[test]
#[serial]
fn partial_email_config_is_an_error() {
    clear_env();
    env::set_var("SENDGRID_API_KEY", "SG.KEY");
    env::set_var("EMAIL_TO", "a@example.test");
    let err = Config::resolve(Overrides::default()).unwrap_err();
    assert!(err.to_string().contains("email channel partially configured"));
    clear_env();
}

#[test]
#[serial]
fn fully_configured_channels_resolve() {
    clear_env();
    env::set_var("TELEGRAM_BOT_TOKEN", "TOKEN");
    env::set_var("TELEGRAM_CHAT_IDS", "world:-100123,tech:-100456");
    env::set_var("SENDGRID_API_KEY", "SG.KEY");
    env::set_var("EMAIL_FROM", "bot@example.test");
    env::set_var("EMAIL_TO", "a@example.test, b@example.test");
    env::set_var("TWILIO_SID", "SID");
    env::set_var("TWILIO_TOKEN", "SECRET");
    env::set_var("TWILIO_FROM", "whatsapp:+1415");
    env::set_var("TWILIO_TO", "whatsapp:+441");
    env::set_var("CATEGORY", "Tech");
    env::set_var("MAX_HEADLINES", "5");

    let config = Config::resolve(Overrides::default()).unwrap();
    assert_eq!(config.category, "tech");
    assert_eq!(config.max_headlines, 5);

    let tg = config.telegram.unwrap();
    assert_eq!(tg.chat_ids, vec!["-100456"]); // the tech mapping
    let email = config.email.unwrap();
    assert_eq!(email.to, vec!["a@example.test", "b@example.test"]);
    let sms = config.sms.unwrap();
    assert_eq!(sms.to, vec!["whatsapp:+441"]);
    clear_env();
}

#[test]
#[serial]
fn single_chat_id_fallback_applies_when_map_misses_the_category() {
    clear_env();
    env::set_var("TELEGRAM_BOT_TOKEN", "TOKEN");
    env::set_var("TELEGRAM_CHAT_IDS", "world:-100123");
    env::set_var("TELEGRAM_CHAT_ID", "-100999");
    env::set_var("CATEGORY", "sports");

    let config = Config::resolve(Overrides::default()).unwrap();
    assert_eq!(config.telegram.unwrap().chat_ids, vec!["-100999"]);
    clear_env();
}

#[test]
#[serial]
fn cli_overrides_beat_the_environment() {
    clear_env();
    env::set_var("CATEGORY", "world");
    let config = Config::resolve(Overrides {
        category: Some("business".to_string()),
        dry_run: true,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(config.category, "business");
    clear_env();
}

#[test]
#[serial]
fn feeds_file_override_is_honored() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("feeds.toml");
    std::fs::write(
        &p,
        r#"
[categories]
world = ["https://only.example.test/rss"]
"#,
    )
    .unwrap();
    env::set_var("NEWSALERT_FEEDS_PATH", p.display().to_string());

    let config = Config::resolve(Overrides {
        dry_run: true,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(config.feeds.len(), 1);
    assert_eq!(config.feeds[0].url, "https://only.example.test/rss");
    clear_env();
}

#[test]
#[serial]
fn bad_numeric_env_values_are_rejected() {
    clear_env();
    env::set_var("MAX_HEADLINES", "lots");
    let err = Config::resolve(Overrides {
        dry_run: true,
        ..Default::default()
    })
    .unwrap_err();
    assert!(err.to_string().contains("MAX_HEADLINES"));
    clear_env();
}
