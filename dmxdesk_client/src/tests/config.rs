use std::time::Duration;

use crate::config::ConsoleConfig;

#[test]
fn defaults() {
	let config = ConsoleConfig::default();
	assert_eq!(config.debounce_interval(), Duration::from_millis(30));
	assert_eq!(config.indicator_timeout(), Duration::from_millis(500));
	assert_eq!(config.long_press_threshold(), Duration::from_millis(500));
}

#[test]
fn missing_keys_take_defaults() {
	let config = ConsoleConfig::from_json_str(r#"{ "debounce_interval_ms": 50 }"#).unwrap();
	assert_eq!(config.debounce_interval_ms, 50);
	assert_eq!(config.long_press_ms, 500);
}

#[test]
fn invalid_json_is_an_error() {
	let error = ConsoleConfig::from_json_str("{ debounce").unwrap_err();
	assert!(format!("{}", error).contains("not valid JSON"));
}

#[test]
fn missing_file_names_the_path() {
	let error = ConsoleConfig::from_path("/nonexistent/dmxdesk.json").unwrap_err();
	assert!(format!("{}", error).contains("/nonexistent/dmxdesk.json"));
}
