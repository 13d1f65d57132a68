//! The fatal channel.
//!
//! Invariant violations (corrupt board, king capture, move-list overflow,
//! allocation failure) are not recoverable. The host registers a handler
//! once; `chess_fatal` notifies it and then unwinds. The outermost engine
//! entry points catch the unwind and surface `EngineError::Fatal`, so a
//! host never needs to install a panic hook to see these.

use once_cell::sync::OnceCell;

type FatalHandler = Box<dyn Fn(&str) + Send + Sync>;

static HANDLER: OnceCell<FatalHandler> = OnceCell::new();

/// Register the host's fatal handler. Only the first registration wins;
/// later calls return `false`.
pub fn set_fatal_handler<F>(handler: F) -> bool
where
    F: Fn(&str) + Send + Sync + 'static,
{
    HANDLER.set(Box::new(handler)).is_ok()
}

/// Report an unrecoverable engine error and unwind.
///
/// Panicking (rather than returning an error) is deliberate: fatal
/// conditions mean the board or search state is corrupt and no caller on
/// the stack can continue meaningfully.
#[cold]
pub(crate) fn chess_fatal(message: &str) -> ! {
    log::error!("fatal: {message}");
    if let Some(handler) = HANDLER.get() {
        handler(message);
    }
    panic!("chess fatal: {message}");
}
