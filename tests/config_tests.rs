// Integration test for environment overrides
//
// Kept in its own test binary: environment variables are process-wide, and the unit tests in
// config.rs assert the built-in defaults.

use gesture_capture::Config;
use tempfile::TempDir;

const OVERRIDES: [(&str, &str); 3] = [
    ("GESTURE_CAPTURE_SERVICE__HTTP__PORT", "9999"),
    ("GESTURE_CAPTURE_CAPTURE__INTERVAL_MS", "250"),
    ("GESTURE_CAPTURE_RECOGNITION__BASE_URL", "http://recognizer:9000"),
];

#[test]
fn test_environment_overrides_file_and_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("capture.toml");
    std::fs::write(
        &path,
        r#"
[service.http]
port = 7000

[capture]
interval_ms = 500
jpeg_quality = 70
"#,
    )
    .unwrap();

    for (key, value) in OVERRIDES {
        std::env::set_var(key, value);
    }
    let loaded = Config::load(path.to_str().unwrap());
    for (key, _) in OVERRIDES {
        std::env::remove_var(key);
    }

    let cfg = loaded.unwrap();

    assert_eq!(cfg.service.http.port, 9999, "Environment beats the file");
    assert_eq!(cfg.capture.interval_ms, 250, "Environment beats the file");
    assert_eq!(cfg.recognition.base_url, "http://recognizer:9000", "Environment beats defaults");

    assert_eq!(cfg.capture.jpeg_quality, 70, "File keys without overrides survive");
    assert_eq!(cfg.service.http.bind, "127.0.0.1");
    assert_eq!(cfg.recognition.timeout_ms, 5000);
}
