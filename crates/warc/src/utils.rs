//! Internal helper macros.

/// Returns early with `Err($error)` unless `$predicate` holds.
///
/// Works like `assert!`, but reports a decode error instead of panicking.
///
/// ```ignore
/// ensure!(consumed < max_header_bytes, HeaderError::too_large_header(consumed, max_header_bytes));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
