use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag to control per-transfer debug logging
pub static AUDIO_DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Set per-transfer debug logging on/off
pub fn set_audio_debug(enabled: bool) {
    AUDIO_DEBUG_ENABLED.store(enabled, Ordering::Relaxed);
    tracing::info!(
        "Audio debug logging {}",
        if enabled { "ENABLED" } else { "DISABLED" }
    );
}

/// Check if per-transfer debug logging is enabled
pub fn is_audio_debug_enabled() -> bool {
    AUDIO_DEBUG_ENABLED.load(Ordering::Relaxed)
}

/// Audio debug macro - only logs if audio debug is enabled. Transfer paths are
/// too hot for unconditional logging.
#[macro_export]
macro_rules! audio_debug {
    ($($arg:tt)*) => {
        if $crate::log::AUDIO_DEBUG_ENABLED.load(std::sync::atomic::Ordering::Relaxed) {
            tracing::debug!($($arg)*);
        }
    };
}
