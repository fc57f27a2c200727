/// Vulkan debug messenger - validation layer messages through the engine logger
///
/// The callback receives a pointer to the device's [`DebugState`] as user
/// data, so severity filtering and statistics are per device. Messages are
/// forwarded to the engine logger under `bindless::vulkan::validation`.

use ash::vk;
use bindless_engine::bindless::DebugSeverity;
use bindless_engine::{engine_debug, engine_error, engine_info, engine_warn};
use colored::*;
use rustc_hash::FxHashMap;
use std::ffi::CStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Counts of validation messages received, by severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationStats {
    pub errors: u32,
    pub warnings: u32,
    pub info: u32,
    pub verbose: u32,
}

impl ValidationStats {
    pub fn total(&self) -> u32 {
        self.errors + self.warnings + self.info + self.verbose
    }
}

/// State shared with the messenger callback
pub(crate) struct DebugState {
    severity: DebugSeverity,
    break_on_error: bool,
    errors: AtomicU32,
    warnings: AtomicU32,
    info: AtomicU32,
    verbose: AtomicU32,
    /// Occurrences per message id, for the report
    repeats: Mutex<FxHashMap<String, u32>>,
}

impl DebugState {
    pub(crate) fn new(severity: DebugSeverity, break_on_error: bool) -> Self {
        Self {
            severity,
            break_on_error,
            errors: AtomicU32::new(0),
            warnings: AtomicU32::new(0),
            info: AtomicU32::new(0),
            verbose: AtomicU32::new(0),
            repeats: Mutex::new(FxHashMap::default()),
        }
    }

    pub(crate) fn stats(&self) -> ValidationStats {
        ValidationStats {
            errors: self.errors.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
            info: self.info.load(Ordering::Relaxed),
            verbose: self.verbose.load(Ordering::Relaxed),
        }
    }

    /// Number of distinct message ids seen more than once
    pub(crate) fn repeated_messages(&self) -> usize {
        match self.repeats.lock() {
            Ok(repeats) => repeats.values().filter(|&&count| count > 1).count(),
            Err(_) => 0,
        }
    }

    /// Count a forwarded message, returning how often its id was seen
    fn record(&self, severity: vk::DebugUtilsMessageSeverityFlagsEXT, message_id: &str) -> u32 {
        let counter = if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
            &self.errors
        } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
            &self.warnings
        } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
            &self.info
        } else {
            &self.verbose
        };
        counter.fetch_add(1, Ordering::Relaxed);

        match self.repeats.lock() {
            Ok(mut repeats) => {
                let count = repeats.entry(message_id.to_string()).or_insert(0);
                *count += 1;
                *count
            }
            Err(_) => 1,
        }
    }
}

/// Severities the messenger subscribes to
pub(crate) fn messenger_severity_flags(severity: DebugSeverity) -> vk::DebugUtilsMessageSeverityFlagsEXT {
    use vk::DebugUtilsMessageSeverityFlagsEXT as S;
    match severity {
        DebugSeverity::ErrorsOnly => S::ERROR,
        DebugSeverity::ErrorsAndWarnings => S::ERROR | S::WARNING,
        DebugSeverity::All => S::ERROR | S::WARNING | S::INFO | S::VERBOSE,
    }
}

/// Whether a message of `message_severity` passes the configured filter
pub(crate) fn should_forward(
    severity: DebugSeverity,
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
) -> bool {
    messenger_severity_flags(severity).intersects(message_severity)
}

fn message_type_name(message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> &'static str {
    if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        "Validation"
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        "Performance"
    } else {
        "General"
    }
}

/// Vulkan debug messenger callback
///
/// # Safety
///
/// `user_data` must point to a live [`DebugState`].
pub(crate) unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() || user_data.is_null() {
        return vk::FALSE;
    }
    let state = &*(user_data as *const DebugState);
    let callback_data = &*p_callback_data;

    if !should_forward(state.severity, message_severity) {
        return vk::FALSE;
    }

    let message_id = if callback_data.p_message_id_name.is_null() {
        "Unknown".into()
    } else {
        CStr::from_ptr(callback_data.p_message_id_name).to_string_lossy()
    };
    let message = if callback_data.p_message.is_null() {
        "No message".into()
    } else {
        CStr::from_ptr(callback_data.p_message).to_string_lossy()
    };

    let occurrences = state.record(message_severity, &message_id);
    let repeat = if occurrences > 1 {
        format!(" [x{}]", occurrences)
    } else {
        String::new()
    };
    let kind = message_type_name(message_type);
    let source = "bindless::vulkan::validation";

    if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        engine_error!(source, "[{}] {}{}: {}", kind, message_id, repeat, message);
        if state.break_on_error {
            eprintln!("\n{}\n", "BREAK ON VALIDATION ERROR - Aborting execution".red().bold());
            std::process::abort();
        }
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        engine_warn!(source, "[{}] {}{}: {}", kind, message_id, repeat, message);
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        engine_info!(source, "[{}] {}{}: {}", kind, message_id, repeat, message);
    } else {
        engine_debug!(source, "[{}] {}{}: {}", kind, message_id, repeat, message);
    }

    vk::FALSE
}

/// Print validation statistics to stdout
pub fn print_validation_stats_report(stats: &ValidationStats, repeated: usize) {
    if stats.total() == 0 {
        println!("\n{}", "No validation messages".green().bold());
        return;
    }

    println!("\n{}", "=== Validation Statistics Report ===".bright_blue().bold());
    if stats.errors > 0 {
        println!("  {} {}", "Errors:".red().bold(), stats.errors);
    }
    if stats.warnings > 0 {
        println!("  {} {}", "Warnings:".yellow().bold(), stats.warnings);
    }
    if stats.info > 0 {
        println!("  {} {}", "Info:".cyan(), stats.info);
    }
    if stats.verbose > 0 {
        println!("  {} {}", "Verbose:".bright_black(), stats.verbose);
    }
    println!("  {} {}", "Total:".white().bold(), stats.total());
    if repeated > 0 {
        println!("\n  {} message id(s) appeared multiple times", repeated);
    }
    println!("{}\n", "====================================".bright_blue().bold());
}

#[cfg(test)]
#[path = "vulkan_debug_tests.rs"]
mod tests;
