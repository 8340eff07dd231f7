// Crate-internal events, all under the `item_extents` target. Without the `tracing` feature
// they expand to nothing and their arguments are never evaluated.

#[cfg(feature = "tracing")]
macro_rules! extent_event {
    ($level:ident, $($arg:tt)+) => {
        tracing::event!(target: "item_extents", tracing::Level::$level, $($arg)+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! extent_event {
    ($level:ident, $($arg:tt)+) => {};
}

/// Per-operation detail: individual writes, inserts, removals, range reports.
macro_rules! etrace {
    ($($arg:tt)+) => {
        extent_event!(TRACE, $($arg)+)
    };
}

/// Session boundaries and bulk operations.
macro_rules! edebug {
    ($($arg:tt)+) => {
        extent_event!(DEBUG, $($arg)+)
    };
}

/// Host misuse, logged right before the matching panic.
macro_rules! ewarn {
    ($($arg:tt)+) => {
        extent_event!(WARN, $($arg)+)
    };
}
