use std::fmt;

/// Project any error into a message fit for a user-facing notification.
///
/// Prefers the `Display` text, falls back to the `Debug` text when the
/// display form is blank, and never fails itself.
pub fn error_message<E>(err: &E) -> String
where
    E: fmt::Display + fmt::Debug + ?Sized,
{
    let message = err.to_string();
    if !message.trim().is_empty() {
        return message;
    }

    let debug = format!("{:?}", err);
    if !debug.trim().is_empty() && debug != "\"\"" {
        return debug;
    }

    "Unknown error".to_string()
}
