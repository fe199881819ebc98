//! Static, ordered host registry.

use std::collections::HashSet;

use crate::config::HostConfig;

/// One node of the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEntry {
    pub id: String,
    pub message_url: String,
    pub health_url: String,
}

impl HostEntry {
    pub fn new(
        id: impl Into<String>,
        message_url: impl Into<String>,
        health_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            message_url: message_url.into(),
            health_url: health_url.into(),
        }
    }
}

impl From<&HostConfig> for HostEntry {
    fn from(config: &HostConfig) -> Self {
        Self::new(&config.id, &config.message_url, &config.health_url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("host registry must contain at least one entry")]
    Empty,
    #[error("duplicate host id '{0}'")]
    Duplicate(String),
}

/// Ordered list of chain nodes.
///
/// Order is fixed for the lifetime of the process and defines the rotation.
/// The registry is never empty and ids are unique.
#[derive(Debug, Clone)]
pub struct HostRegistry {
    entries: Vec<HostEntry>,
}

impl HostRegistry {
    pub fn new(entries: Vec<HostEntry>) -> Result<Self, RegistryError> {
        if entries.is_empty() {
            return Err(RegistryError::Empty);
        }
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.id.as_str()) {
                return Err(RegistryError::Duplicate(entry.id.clone()));
            }
        }
        Ok(Self { entries })
    }

    pub fn from_config(hosts: &[HostConfig]) -> Result<Self, RegistryError> {
        Self::new(hosts.iter().map(HostEntry::from).collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// A built registry always holds at least one entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HostEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&HostEntry> {
        self.entries.get(index)
    }

    /// The entry whose selection completes a chain.
    pub fn first(&self) -> &HostEntry {
        &self.entries[0]
    }

    /// Rotation position of `id`, if registered.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn lookup(&self, id: &str) -> Option<&HostEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn message_url(&self, id: &str) -> Option<&str> {
        self.lookup(id).map(|e| e.message_url.as_str())
    }

    pub fn health_url(&self, id: &str) -> Option<&str> {
        self.lookup(id).map(|e| e.health_url.as_str())
    }
}
