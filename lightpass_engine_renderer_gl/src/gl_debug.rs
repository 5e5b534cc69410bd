/// GL debug output - KHR_debug messages routed through the engine logger
///
/// Compiled only with the `gl-debug` feature. Driver messages are logged
/// under `lightpass::gl::Debug` at the severity matching the GL one, and
/// counted so a summary can be printed at shutdown.

use colored::*;
use glow::HasContext;
use lightpass_engine::lightpass::log::LogSeverity;
use lightpass_engine::lightpass::Engine;
use std::sync::atomic::{AtomicU32, Ordering};

/// Global message statistics (thread-safe atomic counters)
static DEBUG_STATS: DebugStatsTracker = DebugStatsTracker::new();

/// Message counts per severity since the callback was installed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugStats {
    pub errors: u32,
    pub warnings: u32,
    pub info: u32,
    pub notifications: u32,
}

impl DebugStats {
    pub fn total(&self) -> u32 {
        self.errors + self.warnings + self.info + self.notifications
    }
}

struct DebugStatsTracker {
    errors: AtomicU32,
    warnings: AtomicU32,
    info: AtomicU32,
    notifications: AtomicU32,
}

impl DebugStatsTracker {
    const fn new() -> Self {
        Self {
            errors: AtomicU32::new(0),
            warnings: AtomicU32::new(0),
            info: AtomicU32::new(0),
            notifications: AtomicU32::new(0),
        }
    }

    fn record(&self, severity: u32) {
        let counter = match severity {
            glow::DEBUG_SEVERITY_HIGH => &self.errors,
            glow::DEBUG_SEVERITY_MEDIUM => &self.warnings,
            glow::DEBUG_SEVERITY_LOW => &self.info,
            _ => &self.notifications,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn get_stats(&self) -> DebugStats {
        DebugStats {
            errors: self.errors.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
            info: self.info.load(Ordering::Relaxed),
            notifications: self.notifications.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.errors.store(0, Ordering::Relaxed);
        self.warnings.store(0, Ordering::Relaxed);
        self.info.store(0, Ordering::Relaxed);
        self.notifications.store(0, Ordering::Relaxed);
    }
}

/// Engine severity of a `GL_DEBUG_SEVERITY_*` value
pub fn log_severity(severity: u32) -> LogSeverity {
    match severity {
        glow::DEBUG_SEVERITY_HIGH => LogSeverity::Error,
        glow::DEBUG_SEVERITY_MEDIUM => LogSeverity::Warn,
        glow::DEBUG_SEVERITY_LOW => LogSeverity::Info,
        _ => LogSeverity::Trace,
    }
}

/// Short name of a `GL_DEBUG_TYPE_*` value
pub fn message_type_name(ty: u32) -> &'static str {
    match ty {
        glow::DEBUG_TYPE_ERROR => "Error",
        glow::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "Deprecated",
        glow::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "Undefined",
        glow::DEBUG_TYPE_PORTABILITY => "Portability",
        glow::DEBUG_TYPE_PERFORMANCE => "Performance",
        glow::DEBUG_TYPE_MARKER => "Marker",
        _ => "Other",
    }
}

/// Short name of a `GL_DEBUG_SOURCE_*` value
pub fn message_source_name(source: u32) -> &'static str {
    match source {
        glow::DEBUG_SOURCE_API => "API",
        glow::DEBUG_SOURCE_WINDOW_SYSTEM => "Window System",
        glow::DEBUG_SOURCE_SHADER_COMPILER => "Shader Compiler",
        glow::DEBUG_SOURCE_THIRD_PARTY => "Third Party",
        glow::DEBUG_SOURCE_APPLICATION => "Application",
        _ => "Other",
    }
}

/// Enable synchronous debug output and install the logging callback
///
/// Returns false when the context does not support KHR_debug.
pub fn install(gl: &mut glow::Context) -> bool {
    if !gl.supports_debug() {
        return false;
    }

    DEBUG_STATS.reset();
    unsafe {
        gl.enable(glow::DEBUG_OUTPUT);
        gl.enable(glow::DEBUG_OUTPUT_SYNCHRONOUS);
        gl.debug_message_callback(|source, ty, id, severity, message| {
            DEBUG_STATS.record(severity);
            let message = format!(
                "[{}/{}] #{} {}",
                message_source_name(source),
                message_type_name(ty),
                id,
                message
            );
            Engine::log(log_severity(severity), "lightpass::gl::Debug", message);
        });
    }
    true
}

/// Message counts since [`install`]
pub fn get_debug_stats() -> DebugStats {
    DEBUG_STATS.get_stats()
}

/// Print a colored summary of the debug messages received
pub fn print_debug_stats_report() {
    let stats = get_debug_stats();

    if stats.total() == 0 {
        println!("\n{}", "✓ No GL debug messages".green().bold());
        return;
    }

    println!("\n{}", "=== GL Debug Output Report ===".bright_blue().bold());
    if stats.errors > 0 {
        println!("  {} {}", "Errors:".red().bold(), stats.errors);
    }
    if stats.warnings > 0 {
        println!("  {} {}", "Warnings:".yellow().bold(), stats.warnings);
    }
    if stats.info > 0 {
        println!("  {} {}", "Info:".cyan(), stats.info);
    }
    if stats.notifications > 0 {
        println!("  {} {}", "Notifications:".bright_black(), stats.notifications);
    }
    println!("  {} {}", "Total:".white().bold(), stats.total());
    println!("{}\n", "==============================".bright_blue().bold());
}

#[cfg(test)]
#[path = "gl_debug_tests.rs"]
mod tests;
