//! Translation of pool and Diesel failures into port error constructors.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map a pool failure through the port's connection constructor.
pub(super) fn map_pool_error<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map a Diesel failure through the port's query and connection
/// constructors. Unique violations are routed to `query` too; repositories
/// with a duplicate variant check [`is_unique_violation`] first.
pub(super) fn map_diesel_error<E>(
    error: &DieselError,
    query: impl FnOnce(&'static str) -> E,
    connection: impl FnOnce(&'static str) -> E,
) -> E {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        _ => query("database error"),
    }
}

/// The constraint name of a unique violation, if `error` is one.
pub(super) fn unique_violation(error: &DieselError) -> Option<&str> {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            Some(info.constraint_name().unwrap_or("unique"))
        }
        _ => None,
    }
}

/// True when `error` is a unique violation.
pub(super) fn is_unique_violation(error: &DieselError) -> bool {
    unique_violation(error).is_some()
}

/// Escape `%`, `_` and `\` and wrap `needle` for a substring `ILIKE`.
pub(super) fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.trim().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// A non-blank search term, if any.
pub(super) fn search_term(search: Option<String>) -> Option<String> {
    search
        .map(|term| term.trim().to_owned())
        .filter(|term| !term.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq, Eq)]
    enum Mapped {
        Query(&'static str),
        Connection(&'static str),
    }

    fn map(error: &DieselError) -> Mapped {
        map_diesel_error(error, Mapped::Query, Mapped::Connection)
    }

    #[rstest]
    fn not_found_is_a_query_error() {
        assert_eq!(map(&DieselError::NotFound), Mapped::Query("record not found"));
    }

    #[rstest]
    fn closed_connections_are_connection_errors() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection".to_owned()),
        );

        assert_eq!(map(&error), Mapped::Connection("database connection error"));
        assert!(!is_unique_violation(&error));
    }

    #[rstest]
    fn unique_violations_are_detected() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key".to_owned()),
        );

        assert!(is_unique_violation(&error));
    }

    #[rstest]
    fn pool_errors_use_the_connection_constructor() {
        let mapped = map_pool_error(PoolError::checkout("timed out"), |message| message);
        assert_eq!(mapped, "timed out");
    }

    #[rstest]
    #[case("rust", "%rust%")]
    #[case(" 50%_off ", "%50\\%\\_off%")]
    fn like_patterns_escape_wildcards(#[case] needle: &str, #[case] expected: &str) {
        assert_eq!(like_pattern(needle), expected);
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("   "), None)]
    #[case(Some(" ada "), Some("ada"))]
    fn blank_searches_are_ignored(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
        assert_eq!(search_term(raw.map(str::to_owned)).as_deref(), expected);
    }
}
