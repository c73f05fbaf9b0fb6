//! Helpers for classifying PostgreSQL errors surfaced through sqlx.

/// Name of the unique constraint on `users.email`.
pub const USERS_EMAIL_CONSTRAINT: &str = "users_email_key";

/// Returns true when `e` is a unique violation on the users email constraint.
///
/// The service pre-checks email availability, but two concurrent creates can
/// both pass that check; this is how the loser's insert is recognised.
pub fn is_unique_violation_on_email(e: &sqlx::Error) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    matches!(db_err.constraint(), Some(USERS_EMAIL_CONSTRAINT))
}
