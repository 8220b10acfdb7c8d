//! User-facing strings

/// Help shown while the comparison view is focused
pub const CONFLICT_EDITOR_HELP: &str = "Use the actions in the editor tool bar to either undo your changes or overwrite the content on disk with your changes.";

/// Name of the elevated account on this platform
#[must_use]
pub fn superuser() -> &'static str {
    if cfg!(windows) {
        "Admin"
    } else {
        "Sudo"
    }
}

/// Label of the admin retry action on this platform
#[must_use]
pub fn elevated_label() -> &'static str {
    if cfg!(windows) {
        "Retry as Admin..."
    } else {
        "Retry as Sudo..."
    }
}

/// Label of the admin retry action once overwriting already failed
#[must_use]
pub fn overwrite_elevated_label() -> &'static str {
    if cfg!(windows) {
        "Overwrite as Admin..."
    } else {
        "Overwrite as Sudo..."
    }
}

/// Stale write, comparison view not open
#[must_use]
pub fn stale_write(name: &str) -> String {
    format!(
        "Failed to save '{name}': The content on disk is newer. Please compare your version with the one on disk."
    )
}

/// Write protected and the overwrite attempt already failed
#[must_use]
pub fn readonly_retry_elevated(name: &str) -> String {
    format!(
        "Failed to save '{name}': File is write protected. Select 'Overwrite as {}' to retry as superuser.",
        superuser()
    )
}

/// Write protected, overwrite not yet tried
#[must_use]
pub fn readonly_overwrite(name: &str) -> String {
    format!("Failed to save '{name}': File is write protected. Select 'Overwrite' to attempt to remove protection.")
}

/// Insufficient permissions
#[must_use]
pub fn permission_denied(name: &str) -> String {
    format!(
        "Failed to save '{name}': Insufficient permissions. Select 'Retry as {}' to retry as superuser.",
        superuser()
    )
}

/// Any other failure
#[must_use]
pub fn generic(name: &str, error: &str) -> String {
    format!("Failed to save '{name}': {error}")
}

/// Title of the comparison view
#[must_use]
pub fn compare_label(name: &str, product: &str) -> String {
    format!("{name} (on disk) ↔ {name} (in {product}) - Resolve save conflict")
}
