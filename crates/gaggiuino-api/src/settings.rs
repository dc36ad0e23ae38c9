// Settings endpoints
//
// Each group is read and written as a whole document. Writes send the
// full group, so callers read, modify a copy, then write it back.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::GaggiuinoClient;
use crate::error::Error;
use crate::models::{
    BoilerSettings, LedSettings, ScalesSettings, Settings, SettingsGroup, SystemSettings,
};

impl GaggiuinoClient {
    /// `GET /api/settings`: every group plus component versions.
    pub async fn get_settings(&self) -> Result<Settings, Error> {
        let url = self.api_url("settings")?;
        debug!("fetching settings");
        self.get_json(url).await
    }

    async fn get_group<T: DeserializeOwned>(&self, group: SettingsGroup) -> Result<T, Error> {
        let url = self.api_url(&format!("settings/{group}"))?;
        debug!(%group, "fetching settings group");
        self.get_json(url).await
    }

    async fn put_group<T: Serialize>(&self, group: SettingsGroup, body: &T) -> Result<bool, Error> {
        let url = self.api_url(&format!("settings/{group}"))?;
        debug!(%group, "updating settings group");
        self.put_json(url, body).await
    }

    pub async fn get_boiler_settings(&self) -> Result<BoilerSettings, Error> {
        self.get_group(SettingsGroup::Boiler).await
    }

    pub async fn get_system_settings(&self) -> Result<SystemSettings, Error> {
        self.get_group(SettingsGroup::System).await
    }

    pub async fn get_led_settings(&self) -> Result<LedSettings, Error> {
        self.get_group(SettingsGroup::Led).await
    }

    pub async fn get_scales_settings(&self) -> Result<ScalesSettings, Error> {
        self.get_group(SettingsGroup::Scales).await
    }

    /// `PUT /api/settings/boiler`. `false` means the device rejected it.
    pub async fn update_boiler_settings(&self, settings: &BoilerSettings) -> Result<bool, Error> {
        self.put_group(SettingsGroup::Boiler, settings).await
    }

    /// `PUT /api/settings/system`. `false` means the device rejected it.
    pub async fn update_system_settings(&self, settings: &SystemSettings) -> Result<bool, Error> {
        self.put_group(SettingsGroup::System, settings).await
    }

    /// `PUT /api/settings/led`. `false` means the device rejected it.
    pub async fn update_led_settings(&self, settings: &LedSettings) -> Result<bool, Error> {
        self.put_group(SettingsGroup::Led, settings).await
    }

    /// `PUT /api/settings/scales`. `false` means the device rejected it.
    pub async fn update_scales_settings(&self, settings: &ScalesSettings) -> Result<bool, Error> {
        self.put_group(SettingsGroup::Scales, settings).await
    }
}
