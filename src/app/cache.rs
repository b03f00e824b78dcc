//! The authoritative in-memory user collection for one session.
//!
//! Order is the server's response order, with newly created records
//! prepended. The cache is only written after a remote operation has
//! confirmed success; it never holds speculative state.

use crate::domain::{UserPatch, UserRecord};
use chrono::{DateTime, Duration, Utc};

/// Ordered collection of [`UserRecord`]s keyed by unique `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityCache {
    records: Vec<UserRecord>,
    loaded_at: Option<DateTime<Utc>>,
}

impl EntityCache {
    #[must_use]
    pub const fn new() -> Self {
        Self { records: Vec::new(), loaded_at: None }
    }

    #[must_use]
    pub fn records(&self) -> &[UserRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub const fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&UserRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Whether a load should be issued.
    ///
    /// An empty cache always needs loading. A populated cache is considered
    /// fresh for the rest of the session unless `stale_after` is set and that
    /// much time has passed since the last load.
    ///
    /// # Example
    ///
    /// ```
    /// use usergrid::app::cache::EntityCache;
    /// use chrono::Utc;
    ///
    /// let cache = EntityCache::new();
    /// assert!(cache.needs_load(Utc::now(), None));
    /// ```
    #[must_use]
    pub fn needs_load(&self, now: DateTime<Utc>, stale_after: Option<Duration>) -> bool {
        if self.records.is_empty() {
            return true;
        }

        match (self.loaded_at, stale_after) {
            (Some(loaded_at), Some(stale_after)) => now - loaded_at >= stale_after,
            (None, _) => true,
            (Some(_), None) => false,
        }
    }

    /// Replaces the whole collection with a fresh server copy.
    pub fn replace(&mut self, records: Vec<UserRecord>, now: DateTime<Utc>) {
        tracing::debug!(
            previous = self.records.len(),
            loaded = records.len(),
            "cache replaced"
        );
        self.records = records;
        self.loaded_at = Some(now);
    }

    /// Prepends a newly created record.
    ///
    /// A record already cached under the same id is dropped first so ids stay
    /// unique.
    pub fn apply_create(&mut self, record: UserRecord) {
        self.records.retain(|r| r.id != record.id);
        tracing::debug!(user_id = %record.id, "cache create applied");
        self.records.insert(0, record);
    }

    /// Merges `patch` into the record with `id`. Returns `false` if absent.
    pub fn apply_update(&mut self, id: &str, patch: &UserPatch) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            tracing::debug!(user_id = %id, "cache update skipped, record absent");
            return false;
        };

        record.merge(patch);
        tracing::debug!(user_id = %id, "cache update applied");
        true
    }

    /// Removes the record with `id`. Unknown ids are a no-op.
    pub fn apply_delete(&mut self, id: &str) -> Option<UserRecord> {
        let position = self.records.iter().position(|r| r.id == id)?;
        tracing::debug!(user_id = %id, "cache delete applied");
        Some(self.records.remove(position))
    }

    /// Destroys the contents at session teardown.
    pub fn clear(&mut self) {
        self.records.clear();
        self.loaded_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserStatus;
    use chrono::NaiveDate;

    fn user(id: &str, first: &str) -> UserRecord {
        UserRecord {
            id: id.into(),
            first_name: first.into(),
            last_name: None,
            email: format!("{first}@example.com").to_lowercase(),
            status: UserStatus::Active,
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
        }
    }

    #[test]
    fn populated_cache_is_fresh_without_stale_after() {
        let now = Utc::now();
        let mut cache = EntityCache::new();
        assert!(cache.needs_load(now, None));

        cache.replace(vec![user("1", "Ann")], now);
        assert!(!cache.needs_load(now + Duration::days(30), None));
    }

    #[test]
    fn stale_after_expires_cache() {
        let now = Utc::now();
        let mut cache = EntityCache::new();
        cache.replace(vec![user("1", "Ann")], now);

        let window = Some(Duration::minutes(5));
        assert!(!cache.needs_load(now + Duration::minutes(4), window));
        assert!(cache.needs_load(now + Duration::minutes(5), window));
    }

    #[test]
    fn loaded_but_empty_still_needs_load() {
        let now = Utc::now();
        let mut cache = EntityCache::new();
        cache.replace(vec![], now);
        assert!(cache.needs_load(now, None));
    }

    #[test]
    fn create_prepends_and_keeps_ids_unique() {
        let mut cache = EntityCache::new();
        cache.replace(vec![user("1", "Ann"), user("2", "Bob")], Utc::now());

        cache.apply_create(user("9", "Zed"));
        let ids: Vec<_> = cache.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["9", "1", "2"]);

        cache.apply_create(user("2", "Bobby"));
        let ids: Vec<_> = cache.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "9", "1"]);
        assert_eq!(cache.get("2").unwrap().first_name, "Bobby");
    }

    #[test]
    fn update_merges_in_place() {
        let mut cache = EntityCache::new();
        cache.replace(vec![user("1", "Ann"), user("2", "Bob")], Utc::now());

        let patch = UserPatch { email: Some("x@example.com".into()), ..UserPatch::default() };
        assert!(cache.apply_update("2", &patch));
        assert!(!cache.apply_update("404", &patch));

        assert_eq!(cache.records()[1].email, "x@example.com");
        assert_eq!(cache.records()[1].first_name, "Bob");
        assert_eq!(cache.records()[0].email, "ann@example.com");
    }

    #[test]
    fn delete_is_idempotent() {
        let mut cache = EntityCache::new();
        cache.replace(vec![user("1", "Ann")], Utc::now());

        assert_eq!(cache.apply_delete("1").map(|r| r.id), Some("1".to_string()));
        assert_eq!(cache.apply_delete("1"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_forgets_load_time() {
        let mut cache = EntityCache::new();
        cache.replace(vec![user("1", "Ann")], Utc::now());
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.loaded_at(), None);
    }
}
