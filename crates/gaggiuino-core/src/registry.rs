// ── Integration registry ──
//
// Owns one coordinator per configured entry. Explicitly constructed and
// passed around by the host application.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry as Slot;
use tracing::info;
use uuid::Uuid;

use crate::config::CoordinatorConfig;
use crate::coordinator::Coordinator;
use crate::entity::DOMAIN;
use crate::error::CoreError;

/// A set-up entry: a titled, running coordinator.
#[derive(Clone)]
pub struct Entry {
    pub id: Uuid,
    pub title: String,
    pub coordinator: Coordinator,
}

/// Coordinators keyed by entry id.
#[derive(Default)]
pub struct IntegrationRegistry {
    entries: DashMap<Uuid, Arc<Entry>>,
}

impl IntegrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a coordinator for `config`, refresh it once and start polling.
    ///
    /// Fails with [`CoreError::NotReady`] if the machine cannot be read;
    /// nothing is registered in that case.
    pub async fn setup_entry(&self, config: CoordinatorConfig) -> Result<Uuid, CoreError> {
        self.setup_entry_with_id(Uuid::new_v4(), config).await
    }

    pub async fn setup_entry_with_id(
        &self,
        id: Uuid,
        config: CoordinatorConfig,
    ) -> Result<Uuid, CoreError> {
        if self.entries.contains_key(&id) {
            return Err(already_set_up(id));
        }

        let title = entry_title(config.host.as_str().trim_end_matches('/'));
        let coordinator = Coordinator::new(config)?;
        if let Err(e) = coordinator.first_refresh().await {
            coordinator.shutdown().await;
            return Err(e);
        }
        coordinator.start().await?;

        // A concurrent setup for the same id may have won the race meanwhile.
        let inserted = match self.entries.entry(id) {
            Slot::Occupied(_) => false,
            Slot::Vacant(slot) => {
                slot.insert(Arc::new(Entry {
                    id,
                    title: title.clone(),
                    coordinator: coordinator.clone(),
                }));
                true
            }
        };
        if !inserted {
            coordinator.shutdown().await;
            return Err(already_set_up(id));
        }

        info!(entry = %id, %title, "entry set up");
        Ok(id)
    }

    /// Remove an entry and shut its coordinator down.
    pub async fn unload_entry(&self, id: Uuid) -> Result<(), CoreError> {
        let (_, entry) = self
            .entries
            .remove(&id)
            .ok_or_else(|| CoreError::EntryNotFound { id: id.to_string() })?;
        entry.coordinator.shutdown().await;
        info!(entry = %id, "entry unloaded");
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<Entry>> {
        self.entries.get(&id).map(|e| Arc::clone(e.value()))
    }

    pub fn entry_ids(&self) -> Vec<Uuid> {
        self.entries.iter().map(|e| *e.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unload every entry.
    pub async fn shutdown_all(&self) {
        for id in self.entry_ids() {
            let _ = self.unload_entry(id).await;
        }
    }
}

fn already_set_up(id: Uuid) -> CoreError {
    CoreError::Validation {
        message: format!("entry {id} is already set up"),
    }
}

/// Title shown for an entry: `"gaggiuino (<host>)"`.
pub fn entry_title(host: &str) -> String {
    format!("{DOMAIN} ({host})")
}
