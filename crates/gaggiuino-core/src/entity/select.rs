use gaggiuino_api::Profile;

use super::{EntityDescriptor, Platform};
use crate::command::WriteOutcome;
use crate::config::ProfileNaming;
use crate::coordinator::Coordinator;
use crate::error::CoreError;
use crate::snapshot::DeviceSnapshot;

/// Brew profile selector.
///
/// Options are display names built from the cached profile list. With
/// [`ProfileNaming::NameWithId`] every option is unique even when two
/// profiles share a name.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileSelect {
    naming: ProfileNaming,
}

impl ProfileSelect {
    pub fn new(naming: ProfileNaming) -> Self {
        Self { naming }
    }

    pub fn descriptor(&self) -> EntityDescriptor {
        EntityDescriptor {
            icon: Some("mdi:coffee"),
            ..EntityDescriptor::new(Platform::Select, "profile", "Profile")
        }
    }

    pub fn display_name(&self, profile: &Profile) -> String {
        match self.naming {
            ProfileNaming::NameOnly => profile.name.clone(),
            ProfileNaming::NameWithId => format!("{} (ID: {})", profile.name, profile.id),
        }
    }

    /// Available options in device order, without duplicates.
    pub fn options(&self, snapshot: &DeviceSnapshot) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for profile in snapshot.profiles.iter().flatten() {
            let name = self.display_name(profile);
            if !out.contains(&name) {
                out.push(name);
            }
        }
        out
    }

    pub fn current_option(&self, snapshot: &DeviceSnapshot) -> Option<String> {
        snapshot.profile.as_ref().map(|p| self.display_name(p))
    }

    /// Map an option back to its profile id.
    pub fn resolve(&self, snapshot: &DeviceSnapshot, option: &str) -> Result<u32, CoreError> {
        let mut matches = snapshot
            .profiles
            .iter()
            .flatten()
            .filter(|p| self.display_name(p) == option)
            .map(|p| p.id);

        match (matches.next(), matches.next()) {
            (Some(id), None) => Ok(id),
            (Some(_), Some(_)) => Err(CoreError::Validation {
                message: format!("Ambiguous profile selection: {option}"),
            }),
            (None, _) => Err(CoreError::Validation {
                message: format!("Invalid profile selection: {option}"),
            }),
        }
    }

    pub async fn select_option(
        &self,
        coordinator: &Coordinator,
        option: &str,
    ) -> Result<WriteOutcome, CoreError> {
        let id = self.resolve(&coordinator.snapshot(), option)?;
        coordinator.select_profile(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn snapshot() -> DeviceSnapshot {
        let mut current = Profile::new(1, "Espresso");
        current.selected = true;
        DeviceSnapshot {
            profile: Some(current.clone()),
            profiles: Some(vec![
                current,
                Profile::new(2, "Espresso"),
                Profile::new(3, "Lungo"),
            ]),
            ..DeviceSnapshot::default()
        }
    }

    #[test]
    fn duplicate_names_are_selectable_by_id() {
        let select = ProfileSelect::new(ProfileNaming::NameWithId);
        let snap = snapshot();
        assert_eq!(
            select.options(&snap),
            vec!["Espresso (ID: 1)", "Espresso (ID: 2)", "Lungo (ID: 3)"]
        );
        assert_eq!(select.resolve(&snap, "Espresso (ID: 2)").unwrap(), 2);
        assert_eq!(select.current_option(&snap).as_deref(), Some("Espresso (ID: 1)"));
    }

    #[test]
    fn name_only_reports_ambiguity() {
        let select = ProfileSelect::new(ProfileNaming::NameOnly);
        let snap = snapshot();
        assert_eq!(select.options(&snap), vec!["Espresso", "Lungo"]);
        assert_eq!(select.resolve(&snap, "Lungo").unwrap(), 3);
        let err = select.resolve(&snap, "Espresso").unwrap_err();
        assert!(err.to_string().contains("Ambiguous"));
    }

    #[test]
    fn unknown_option_is_rejected() {
        let select = ProfileSelect::default();
        let err = select.resolve(&snapshot(), "Ristretto (ID: 9)").unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
        assert!(select.options(&DeviceSnapshot::default()).is_empty());
        assert!(select.current_option(&DeviceSnapshot::default()).is_none());
    }
}
