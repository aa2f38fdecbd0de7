use uuid::Uuid;

use crate::db::error::{DbError, DbResult};

/// Parse a UUID stored as TEXT, surfacing corruption instead of panicking.
pub fn parse_uuid(s: &str) -> DbResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| DbError::Corrupted(format!("invalid UUID: {}", e)))
}

/// Parse a status column through the enum's `parse` constructor; an unknown
/// value means the row was edited outside the application.
pub fn parse_status<T>(column: &str, raw: &str, parse: fn(&str) -> Option<T>) -> DbResult<T> {
    parse(raw).ok_or_else(|| DbError::Corrupted(format!("unknown {} '{}'", column, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_uuid_reports_corruption() {
        assert!(matches!(parse_uuid("nope"), Err(DbError::Corrupted(_))));
    }

    #[test]
    fn unknown_status_names_the_column() {
        let result = parse_status("archive status", "bogus", crate::models::ArchiveStatus::parse);
        match result {
            Err(DbError::Corrupted(msg)) => assert!(msg.contains("archive status 'bogus'")),
            other => panic!("expected Corrupted, got {:?}", other),
        }
    }
}
