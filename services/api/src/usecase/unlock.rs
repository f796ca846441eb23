//! Remote lab unlock from the dashboard.
//!
//! Authorization is three-tiered: superuser, standing lab membership, then
//! an active reservation. The audit row is appended before the outbound
//! relay call so a dead controller still leaves a record.

use chrono::Utc;
use uuid::Uuid;

use morea_domain::access::is_superuser;

use crate::domain::repository::{
    AccessLogRepository, LabRepository, ReservationRepository, UnlockPort, UserRepository,
};
use crate::error::ApiError;

pub struct UnlockLabInput {
    pub user_id: Uuid,
    pub lab_id: Uuid,
}

pub struct UnlockLabUseCase<U, L, R, A, P>
where
    U: UserRepository,
    L: LabRepository,
    R: ReservationRepository,
    A: AccessLogRepository,
    P: UnlockPort,
{
    pub users: U,
    pub labs: L,
    pub reservations: R,
    pub access_logs: A,
    pub unlock: P,
}

impl<U, L, R, A, P> UnlockLabUseCase<U, L, R, A, P>
where
    U: UserRepository,
    L: LabRepository,
    R: ReservationRepository,
    A: AccessLogRepository,
    P: UnlockPort,
{
    pub async fn execute(&self, input: UnlockLabInput) -> Result<(), ApiError> {
        if self.labs.find_by_id(input.lab_id).await?.is_none() {
            return Err(ApiError::LabNotFound);
        }
        // A lab without a door device is a 404 before any permission check.
        let Some(device) = self.labs.find_device(input.lab_id).await? else {
            return Err(ApiError::DeviceNotFound);
        };

        // Roles come from the database, not the session token. Revoking a
        // role takes effect on the next unlock, not the next login.
        let roles = self.users.role_names(input.user_id).await?;

        let granted = if is_superuser(&roles) {
            true
        } else if self
            .labs
            .find_member(input.user_id, input.lab_id)
            .await?
            .is_some()
        {
            true
        } else {
            self.reservations
                .find_active(input.user_id, input.lab_id, Utc::now())
                .await?
                .is_some()
        };

        self.access_logs
            .append(input.user_id, device.id, granted)
            .await?;

        if !granted {
            return Err(ApiError::Forbidden);
        }

        let Some(ip) = device.ip_address.as_deref() else {
            return Err(ApiError::DeviceNotFound);
        };

        // Best effort. The decision and the audit row stand even if the
        // controller is unreachable.
        if let Err(e) = self.unlock.trigger_unlock(ip, &device.api_token).await {
            tracing::warn!(
                lab_id = %input.lab_id,
                device_id = %device.id,
                error = %e,
                "unlock relay call failed"
            );
        }

        Ok(())
    }
}
