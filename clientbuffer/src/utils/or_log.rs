use std::fmt::{Debug, Display};

/// Log the error side of a result without consuming it.
///
/// Store failures never propagate out of a hook; they are logged here and
/// the caller treats them as a failed operation.
pub trait OrLog {
    fn or_log(&self, context: impl Display);
}

impl<T, E: Debug> OrLog for Result<T, E> {
    fn or_log(&self, context: impl Display) {
        if let Err(e) = &self {
            tracing::error!("Error: {:?} ({})", e, context);
        }
    }
}
