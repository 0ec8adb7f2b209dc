//! Canonical logging macros
//!
//! These macros provide a structured, consistent way to log operations.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use apiview_core::log_op_start;
/// log_op_start!("build_surface");
/// log_op_start!("build_surface", library = "Contoso.Lib");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use apiview_core::log_op_end;
/// log_op_end!("render", duration_ms = 3);
/// log_op_end!("render", duration_ms = 3, line_count = 87);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// `$err` is anything exposing `kind() -> ExErrorKind` (`ApiViewError`,
/// `ExError`); it is borrowed, not consumed.
///
/// # Example
///
/// ```
/// # use apiview_core::{log_op_error, errors::ApiViewError};
/// let err = ApiViewError::SectionNotFound { key: "N:Contoso".to_string() };
/// log_op_error!("lines_for_section", err, duration_ms = 0);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let err_kind: $crate::errors::ExErrorKind = $err.kind();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?err_kind,
            err.code = err_kind.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let err_kind: $crate::errors::ExErrorKind = $err.kind();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?err_kind,
            err.code = err_kind.code(),
            $($field)*
        );
    }};
}
