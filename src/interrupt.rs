//! SIGINT handling for plain output mode.
//!
//! The interactive viewer runs the terminal in raw mode and sees Ctrl+C as a
//! key press; plain mode needs a real signal handler instead.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Global interrupt flag, registered once with SIGINT.
static INTERRUPT_FLAG: OnceLock<Arc<AtomicBool>> = OnceLock::new();

/// Register the SIGINT handler. Safe to call multiple times (only the first
/// call registers; subsequent calls are no-ops).
pub fn register_signal_handler() -> Result<()> {
    if INTERRUPT_FLAG.get().is_some() {
        return Ok(());
    }
    let flag = INTERRUPT_FLAG.get_or_init(|| Arc::new(AtomicBool::new(false)));

    // Handlers run in registration order: the exit check must see the flag
    // before this signal sets it, so only a second Ctrl+C exits hard.
    signal_hook::flag::register_conditional_shutdown(
        signal_hook::consts::SIGINT,
        130,
        Arc::clone(flag),
    )?;
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(flag))?;

    Ok(())
}

/// Check whether the interrupt flag is set.
pub fn is_interrupted() -> bool {
    INTERRUPT_FLAG
        .get()
        .map(|f| f.load(Ordering::SeqCst))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_interrupted_without_a_signal() {
        assert!(!is_interrupted());
    }
}
