//! Unit tests for the application error type.

use scorm_autopilot::AppError;

#[test]
fn display_prefixes_each_domain() {
    let cases = [
        (AppError::Config("bad".into()), "config: bad"),
        (AppError::Driver("gone".into()), "driver: gone"),
        (AppError::Auth("denied".into()), "auth: denied"),
        (AppError::Discovery("empty".into()), "discovery: empty"),
        (AppError::NotFound("missing".into()), "not found: missing"),
    ];
    for (err, expected) in cases {
        assert_eq!(err.to_string(), expected);
    }
}

#[test]
fn toml_errors_become_config_errors() {
    let err = toml::from_str::<toml::Value>("not == valid").expect_err("invalid toml");
    let app: AppError = err.into();
    assert!(matches!(app, AppError::Config(_)), "got {app:?}");
}
