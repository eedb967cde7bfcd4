pub mod authorization;
pub mod reassignment;
pub mod users;

pub use authorization::{AuthError, AuthorizationService, Capability};
pub use reassignment::{
    ReassignmentOutcome, SupervisorAssignment, SupervisorError, SupervisorReassignment,
    ValidationError,
};
pub use users::{UserAdminError, UserAdminService};

/// Normalize an email for lookup and storage: trim and ASCII-lowercase.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Syntactic email check: exactly one `@`, a non-empty local part, and a
/// dot-bearing, whitespace-free domain. Deliverability is the transport's
/// problem.
pub fn is_valid_email(email: &str) -> bool {
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = match parts.next() {
        Some(d) => d,
        None => return false,
    };

    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if domain.contains('@') || !domain.contains('.') {
        return false;
    }
    if domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }
    !email.chars().any(|c| c.is_whitespace())
}
