// Firmware update progress

use tracing::debug;

use crate::client::GaggiuinoClient;
use crate::error::Error;
use crate::models::FirmwareProgress;

impl GaggiuinoClient {
    /// Progress of an OTA update, if one has been started.
    ///
    /// `GET /api/firmware/progress`
    ///
    /// Older firmware has no such endpoint; that is reported as `None`.
    pub async fn get_firmware_progress(&self) -> Result<Option<FirmwareProgress>, Error> {
        let url = self.api_url("firmware/progress")?;
        debug!("fetching firmware progress");
        self.get_optional(url).await
    }
}
