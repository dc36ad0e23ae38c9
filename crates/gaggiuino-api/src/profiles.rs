// Brew profile endpoints

use tracing::debug;

use crate::client::GaggiuinoClient;
use crate::error::Error;
use crate::models::Profile;

impl GaggiuinoClient {
    /// List every profile stored on the controller.
    ///
    /// `GET /api/profiles/all`
    pub async fn get_profiles(&self) -> Result<Vec<Profile>, Error> {
        let url = self.api_url("profiles/all")?;
        debug!("listing profiles");
        self.get_json(url).await
    }

    /// The active profile, derived from the profile list's `selected` flag.
    ///
    /// Pass the status record's profile id as a fallback for firmware that
    /// does not flag the selection.
    pub async fn get_current_profile(
        &self,
        status_profile_id: Option<u32>,
    ) -> Result<Option<Profile>, Error> {
        let profiles = self.get_profiles().await?;
        Ok(Profile::active_in(&profiles, status_profile_id).cloned())
    }

    /// Make `id` the active profile.
    ///
    /// `POST /api/profile-select/{id}`
    ///
    /// Returns `false` if the controller refused the selection.
    pub async fn select_profile(&self, id: u32) -> Result<bool, Error> {
        let url = self.api_url(&format!("profile-select/{id}"))?;
        debug!(profile_id = id, "selecting profile");
        self.post_empty(url).await
    }
}
