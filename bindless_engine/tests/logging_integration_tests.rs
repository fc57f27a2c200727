//! Integration tests for Engine logging system
//!
//! These tests verify the logging facade and the `engine_*` macros.
//! No GPU required.
//!
//! Run with: cargo test --test logging_integration_tests

use bindless_engine::bindless::log::{LogEntry, LogSeverity, Logger};
use bindless_engine::bindless::{Engine, Error};
use bindless_engine::{engine_err, engine_info, engine_warn};
use serial_test::serial;
use std::sync::{Arc, Mutex};

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

/// Install a capturing logger that sees every severity
fn capture() -> Arc<Mutex<Vec<LogEntry>>> {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);
    Engine::set_min_severity(LogSeverity::Trace);
    entries
}

fn restore() {
    Engine::reset_logger();
    Engine::set_min_severity(LogSeverity::Debug);
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_custom_logger() {
    let entries = capture();

    Engine::log(LogSeverity::Info, "bindless::resources", "Vertex pool created".to_string());
    Engine::log(LogSeverity::Warn, "bindless::vulkan", "MSAA clamped".to_string());

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 2);
    assert_eq!(captured[0].severity, LogSeverity::Info);
    assert_eq!(captured[0].source, "bindless::resources");
    assert_eq!(captured[0].message, "Vertex pool created");
    assert_eq!(captured[1].severity, LogSeverity::Warn);
    assert_eq!(captured[1].file, None);
    drop(captured);

    restore();
}

#[test]
#[serial]
fn test_integration_error_logging_with_location() {
    let entries = capture();

    Engine::log_detailed(
        LogSeverity::Error,
        "bindless::frame",
        "Submit failed".to_string(),
        "frame.rs",
        42,
    );

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].file, Some("frame.rs"));
    assert_eq!(captured[0].line, Some(42));
    drop(captured);

    restore();
}

#[test]
#[serial]
fn test_integration_min_severity_filters_entries() {
    let entries = capture();
    Engine::set_min_severity(LogSeverity::Warn);

    Engine::log(LogSeverity::Trace, "test", "dropped".to_string());
    Engine::log(LogSeverity::Debug, "test", "dropped".to_string());
    Engine::log(LogSeverity::Info, "test", "dropped".to_string());
    Engine::log(LogSeverity::Warn, "test", "kept".to_string());
    Engine::log(LogSeverity::Error, "test", "kept".to_string());

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 2);
    assert!(captured.iter().all(|entry| entry.message == "kept"));
    assert_eq!(Engine::min_severity(), LogSeverity::Warn);
    drop(captured);

    restore();
}

#[test]
#[serial]
fn test_integration_logger_reset() {
    let entries = capture();

    Engine::log(LogSeverity::Info, "test", "Message 1".to_string());
    Engine::reset_logger();
    Engine::log(LogSeverity::Info, "test", "Message 2".to_string());

    assert_eq!(entries.lock().unwrap().len(), 1);

    restore();
}

// ============================================================================
// MACRO TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_macros_format_messages() {
    let entries = capture();

    engine_info!("bindless::demo", "Cube uploaded: {} indices", 36);
    engine_warn!("bindless::demo", "Frame {} skipped", 7);

    let captured = entries.lock().unwrap();
    assert_eq!(captured[0].message, "Cube uploaded: 36 indices");
    assert_eq!(captured[1].message, "Frame 7 skipped");
    assert_eq!(captured[1].source, "bindless::demo");
    drop(captured);

    restore();
}

#[test]
#[serial]
fn test_integration_engine_err_logs_and_returns_backend_error() {
    let entries = capture();

    let error = engine_err!("bindless::vulkan", "vkQueueSubmit failed: {}", -4);

    match error {
        Error::BackendError(message) => assert_eq!(message, "vkQueueSubmit failed: -4"),
        other => panic!("unexpected error: {:?}", other),
    }

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Error);
    assert!(captured[0].file.is_some());
    assert!(captured[0].line.is_some());
    drop(captured);

    restore();
}
