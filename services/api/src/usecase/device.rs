//! Controller self-identification and IP reporting.

use uuid::Uuid;

use crate::domain::repository::DeviceRepository;
use crate::domain::types::Device;
use crate::error::ApiError;

pub struct IdentifyDeviceUseCase<D>
where
    D: DeviceRepository,
{
    pub devices: D,
}

impl<D> IdentifyDeviceUseCase<D>
where
    D: DeviceRepository,
{
    /// Called by a controller on boot. First contact creates an unauthorized
    /// device row; every call rotates the api token, so a token leaked from
    /// a decommissioned controller dies on its next boot.
    pub async fn execute(&self, mac_address: &str) -> Result<Device, ApiError> {
        if mac_address.is_empty() {
            return Err(ApiError::MissingData);
        }
        let token = Uuid::new_v4().to_string();
        self.devices.identify(mac_address, &token).await
    }
}

pub struct SetDeviceIpUseCase<D>
where
    D: DeviceRepository,
{
    pub devices: D,
}

impl<D> SetDeviceIpUseCase<D>
where
    D: DeviceRepository,
{
    pub async fn execute(&self, api_token: &str, ip: &str) -> Result<(), ApiError> {
        let Some(device) = self.devices.find_by_api_token(api_token).await? else {
            return Err(ApiError::InvalidApiToken);
        };
        if ip.is_empty() {
            return Err(ApiError::MissingData);
        }
        self.devices.set_ip(device.id, ip).await
    }
}
