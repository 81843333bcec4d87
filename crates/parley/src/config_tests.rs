// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use clap::Parser;

use super::ParleyConfig;

fn parse(args: &[&str]) -> anyhow::Result<ParleyConfig> {
    Ok(ParleyConfig::try_parse_from(args)?)
}

#[test]
fn defaults() -> anyhow::Result<()> {
    let config = parse(&["parley", "--jwt-secret", "s3cret"])?;
    config.validate()?;
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8400);
    assert_eq!(config.auth_cookie, "jwt");
    assert_eq!(config.media_token_ttl(), Duration::from_secs(3600));
    assert!(config.media_api_key.is_none());
    assert!(config.users_file.is_none());
    assert_eq!(config.log_format, "text");
    Ok(())
}

#[test]
fn media_credentials_and_overrides() -> anyhow::Result<()> {
    let config = parse(&[
        "parley",
        "--jwt-secret",
        "s3cret",
        "--port",
        "9000",
        "--auth-cookie",
        "access_token",
        "--media-api-key",
        "key",
        "--media-api-secret",
        "secret",
        "--media-token-ttl-secs",
        "60",
        "--log-format",
        "json",
    ])?;
    config.validate()?;
    assert_eq!(config.port, 9000);
    assert_eq!(config.auth_cookie, "access_token");
    assert_eq!(config.media_api_key.as_deref(), Some("key"));
    assert_eq!(config.media_token_ttl(), Duration::from_secs(60));
    Ok(())
}

#[test]
fn jwt_secret_is_required() {
    assert!(parse(&["parley"]).is_err());
}

#[yare::parameterized(
    blank_secret    = { &["parley", "--jwt-secret", " "], "jwt-secret" },
    key_only        = { &["parley", "--jwt-secret", "s", "--media-api-key", "k"], "requires --media-api-secret" },
    secret_only     = { &["parley", "--jwt-secret", "s", "--media-api-secret", "k"], "requires --media-api-key" },
    zero_ttl        = { &["parley", "--jwt-secret", "s", "--media-token-ttl-secs", "0"], "must be positive" },
    bad_log_format  = { &["parley", "--jwt-secret", "s", "--log-format", "xml"], "invalid log format" },
)]
fn invalid_config(args: &[&str], expected_substr: &str) {
    let config = parse(args).unwrap();
    crate::assert_err_contains!(config.validate(), expected_substr);
}

#[test]
fn test_config_is_valid() -> anyhow::Result<()> {
    ParleyConfig::test().validate()
}
