//! Key-value settings store holding election keys and state

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{Result, VoteCryptoError};

/// String-valued settings store
///
/// Key storage is a single authoritative slot: writers that must not clobber
/// a concurrent writer go through [`SettingsStore::compare_and_set`].
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Atomically apply every entry of `updates` iff each `(key, expected)`
    /// in `guards` holds (`None` meaning absent). Returns whether it applied.
    fn compare_and_set(
        &self,
        guards: &[(&str, Option<&str>)],
        updates: &[(&str, String)],
    ) -> Result<bool>;

    fn get_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self.get(key)?.unwrap_or_else(|| default.to_string()))
    }
}

/// In-process settings store
#[derive(Debug, Default)]
pub struct MemorySettings {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> VoteCryptoError {
    VoteCryptoError::Settings("settings lock poisoned".to_string())
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn compare_and_set(
        &self,
        guards: &[(&str, Option<&str>)],
        updates: &[(&str, String)],
    ) -> Result<bool> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;

        let held = guards
            .iter()
            .all(|(key, expected)| entries.get(*key).map(String::as_str) == *expected);
        if !held {
            return Ok(false);
        }

        for (key, value) in updates {
            entries.insert((*key).to_string(), value.clone());
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_get_set_and_default() {
        let settings = MemorySettings::new();
        assert_eq!(settings.get("template").unwrap(), None);
        assert_eq!(settings.get_or("template", "default").unwrap(), "default");

        settings.set("template", "classic").unwrap();
        settings.set("template", "modern").unwrap();
        assert_eq!(settings.get("template").unwrap().as_deref(), Some("modern"));
    }

    #[test]
    fn test_compare_and_set() {
        let settings = MemorySettings::new();
        let updates = [("a", "1".to_string()), ("b", "2".to_string())];

        assert!(!settings.compare_and_set(&[("a", Some("0"))], &updates).unwrap());
        assert_eq!(settings.get("b").unwrap(), None);

        assert!(settings.compare_and_set(&[("a", None)], &updates).unwrap());
        assert_eq!(settings.get("b").unwrap().as_deref(), Some("2"));

        assert!(!settings.compare_and_set(&[("a", None)], &updates).unwrap());
        assert!(settings
            .compare_and_set(&[("a", Some("1"))], &[("a", "3".to_string())])
            .unwrap());
        assert_eq!(settings.get("a").unwrap().as_deref(), Some("3"));
    }

    #[test]
    fn test_compare_and_set_checks_every_guard() {
        let settings = MemorySettings::new();
        settings.set("key", "k1").unwrap();
        settings.set("state", "closed").unwrap();
        let updates = [("key", "k2".to_string())];

        // One stale guard is enough to refuse the write
        assert!(!settings
            .compare_and_set(&[("key", Some("k1")), ("state", Some("open"))], &updates)
            .unwrap());
        assert!(!settings
            .compare_and_set(&[("key", Some("k0")), ("state", Some("closed"))], &updates)
            .unwrap());
        assert_eq!(settings.get("key").unwrap().as_deref(), Some("k1"));

        assert!(settings
            .compare_and_set(&[("key", Some("k1")), ("state", Some("closed"))], &updates)
            .unwrap());
        assert_eq!(settings.get("key").unwrap().as_deref(), Some("k2"));

        // No guards: unconditional
        assert!(settings.compare_and_set(&[], &updates).unwrap());
    }

    #[test]
    fn test_compare_and_set_single_winner() {
        let settings = Arc::new(MemorySettings::new());

        let winners: usize = (0..8)
            .map(|i| {
                let settings = Arc::clone(&settings);
                thread::spawn(move || {
                    settings
                        .compare_and_set(&[("slot", None)], &[("slot", i.to_string())])
                        .unwrap()
                })
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap() as usize)
            .sum();

        assert_eq!(winners, 1);
    }
}
