// Machine status, health probe and latest shot

use tracing::debug;

use crate::client::GaggiuinoClient;
use crate::error::Error;
use crate::models::{LatestShot, OneOrMany, Status};

impl GaggiuinoClient {
    /// Read the live machine status.
    ///
    /// `GET /api/system/status`
    ///
    /// The controller wraps the record in a single-element array.
    pub async fn get_status(&self) -> Result<Status, Error> {
        let url = self.api_url("system/status")?;
        debug!("fetching status");
        let body: OneOrMany<Status> = self.get_json(url).await?;
        body.into_first().ok_or(Error::EmptyResponse {
            endpoint: "system/status",
        })
    }

    /// Health probe: `true` when `GET /api/health` answers 2xx.
    ///
    /// Connectivity failures are still returned as errors; callers that
    /// want a plain boolean map them to `false` themselves.
    pub async fn healthy(&self) -> Result<bool, Error> {
        let url = self.api_url("health")?;
        self.probe(url).await
    }

    /// Id of the most recently recorded shot.
    ///
    /// `GET /api/shots/latest`
    ///
    /// `None` when no shot has been pulled yet or the firmware lacks the
    /// endpoint.
    pub async fn get_latest_shot_id(&self) -> Result<Option<u64>, Error> {
        let url = self.api_url("shots/latest")?;
        debug!("fetching latest shot id");
        let body: Option<OneOrMany<LatestShot>> = self.get_optional(url).await?;
        Ok(body
            .and_then(OneOrMany::into_first)
            .and_then(|shot| shot.last_shot_id))
    }
}
