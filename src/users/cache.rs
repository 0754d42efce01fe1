use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use super::SyncedUser;

const TTL: Duration = Duration::from_secs(5 * 60);
const PRUNE_ABOVE: usize = 1000;

/// Remembers recent sync results per `email-role` so repeated page loads do
/// not hit the database.
#[derive(Clone)]
pub struct UserCache {
    entries: Arc<Mutex<HashMap<String, (Instant, SyncedUser)>>>,
    ttl: Duration,
}

impl Default for UserCache {
    fn default() -> Self {
        Self::with_ttl(TTL)
    }
}

impl UserCache {
    pub fn with_ttl(ttl: Duration) -> Self {
        UserCache {
            entries: Arc::default(),
            ttl,
        }
    }

    pub fn key(email: &str, role: &str) -> String {
        format!("{email}-{role}")
    }

    pub fn get(&self, key: &str) -> Option<SyncedUser> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .filter(|(at, _)| at.elapsed() < self.ttl)
            .map(|(_, user)| user.clone())
    }

    pub fn insert(&self, key: String, user: SyncedUser) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key, (Instant::now(), user));

        if entries.len() > PRUNE_ABOVE {
            let ttl = self.ttl;
            entries.retain(|_, (at, _)| at.elapsed() < ttl);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use crate::{db::Role, users::SyncedStudent};

    use super::*;

    fn student(id: &str) -> SyncedUser {
        SyncedUser::Student(SyncedStudent {
            id: id.to_owned(),
            identifier: "20XXXXH".to_owned(),
            role: Role::Student,
        })
    }

    #[test]
    fn hit_within_ttl() {
        let cache = UserCache::default();
        cache.insert(UserCache::key("a@x", "student"), student("1"));
        assert!(cache.get("a@x-student").is_some());
        assert!(cache.get("a@x-alumnus").is_none());
    }

    #[test]
    fn expired_entries_miss_and_get_pruned() {
        let cache = UserCache::with_ttl(Duration::ZERO);
        for i in 0..=PRUNE_ABOVE {
            cache.insert(format!("{i}"), student(&i.to_string()));
        }
        assert!(cache.get("0").is_none());
        assert!(cache.is_empty());
    }
}
