//! Search projection over the entity cache.
//!
//! A record matches when its display name (`firstName lastName`, trimmed)
//! contains the query as a case-insensitive substring. The projection holds no
//! state; callers recompute it whenever the cache or the query changes.

use crate::domain::UserRecord;

/// Returns the records matching `query`, in cache order.
///
/// An empty query returns every record.
///
/// # Example
///
/// ```
/// # use usergrid::app::projection::project;
/// # use usergrid::domain::{UserRecord, UserStatus};
/// # use chrono::NaiveDate;
/// let users = vec![UserRecord {
///     id: "1".into(),
///     first_name: "John".into(),
///     last_name: Some("Doe".into()),
///     email: "john@example.com".into(),
///     status: UserStatus::Active,
///     date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
/// }];
///
/// assert_eq!(project(&users, "doe").len(), 1);
/// assert!(project(&users, "zzz").is_empty());
/// ```
#[must_use]
pub fn project<'a>(records: &'a [UserRecord], query: &str) -> Vec<&'a UserRecord> {
    if query.is_empty() {
        return records.iter().collect();
    }

    let needle = query.to_lowercase();
    records.iter().filter(|record| matches(record, &needle)).collect()
}

/// `needle` must already be lowercased.
fn matches(record: &UserRecord, needle: &str) -> bool {
    record.display_name().to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserStatus;
    use chrono::NaiveDate;

    fn user(id: &str, first: &str, last: Option<&str>) -> UserRecord {
        UserRecord {
            id: id.into(),
            first_name: first.into(),
            last_name: last.map(Into::into),
            email: "someone@example.com".into(),
            status: UserStatus::Active,
            date_of_birth: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        }
    }

    fn ids(records: &[&UserRecord]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    fn cache() -> Vec<UserRecord> {
        vec![
            user("1", "John", Some("Doe")),
            user("2", "Jane", Some("Roe")),
            user("3", "Doedre", None),
            user("4", "Émile", Some("Zola")),
        ]
    }

    #[test]
    fn empty_query_is_identity() {
        let cache = cache();
        assert_eq!(ids(&project(&cache, "")), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn case_insensitive_substring_in_cache_order() {
        let cache = cache();
        assert_eq!(ids(&project(&cache, "DOE")), vec!["1", "3"]);
        assert_eq!(ids(&project(&cache, "n d")), vec!["1"]);
        assert_eq!(ids(&project(&cache, "émile z")), vec!["4"]);
    }

    #[test]
    fn email_is_not_searched() {
        let cache = cache();
        assert!(project(&cache, "example.com").is_empty());
    }

    #[test]
    fn matches_exactly_the_display_name_containment() {
        let cache = cache();
        for query in ["o", "J", "e R", "zzz", " ", "Doe "] {
            let expected: Vec<String> = cache
                .iter()
                .filter(|r| r.display_name().to_lowercase().contains(&query.to_lowercase()))
                .map(|r| r.id.clone())
                .collect();
            assert_eq!(ids(&project(&cache, query)), expected, "query {query:?}");
        }
    }
}
