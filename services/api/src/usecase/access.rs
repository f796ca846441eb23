//! The access-decision engine: card and PIN authorization for door
//! controllers.
//!
//! Both flows share the same shape: resolve the credential and the device,
//! compute the decision, then append exactly one audit row. Denials before
//! both the device and the user resolve are pre-checks and produce no row.

use chrono::Utc;

use morea_domain::access::{AccessDecision, is_superuser, roles_intersect};

use crate::domain::repository::{
    AccessLogRepository, CardRepository, DeviceRepository, ReservationRepository, UserRepository,
};
use crate::error::ApiError;

// ── Card decision ────────────────────────────────────────────────────────────

pub struct ValidateCardInput {
    pub card_hex: String,
    pub mac_address: String,
}

pub struct ValidateCardUseCase<C, D, L>
where
    C: CardRepository,
    D: DeviceRepository,
    L: AccessLogRepository,
{
    pub cards: C,
    pub devices: D,
    pub access_logs: L,
}

impl<C, D, L> ValidateCardUseCase<C, D, L>
where
    C: CardRepository,
    D: DeviceRepository,
    L: AccessLogRepository,
{
    pub async fn execute(&self, input: ValidateCardInput) -> Result<AccessDecision, ApiError> {
        // Unknown cards self-register disabled so an admin can enable them
        // later. The insert is ON CONFLICT DO NOTHING: a concurrent scan of
        // the same card cannot fail on the unique hex id.
        let Some(card) = self.cards.find_by_hex(&input.card_hex).await? else {
            self.cards.register_unknown(&input.card_hex).await?;
            tracing::info!(card_hex = %input.card_hex, "unrecognized card self-registered");
            return Ok(AccessDecision::Unauthorized);
        };

        if !card.permission {
            return Ok(AccessDecision::Unauthorized);
        }

        let Some(device) = self.devices.find_by_mac_with_roles(&input.mac_address).await? else {
            return Ok(AccessDecision::Unauthorized);
        };

        let Some(linked) = self.cards.find_linked_user(card.id).await? else {
            return Ok(AccessDecision::Unauthorized);
        };

        let granted = roles_intersect(&device.role_names, &linked.role_names);

        // Device and user both resolved: always exactly one audit row,
        // granted or not.
        self.access_logs
            .append(linked.user.id, device.device.id, granted)
            .await?;

        if granted {
            Ok(AccessDecision::Authorized {
                username: linked.user.username,
            })
        } else {
            Ok(AccessDecision::Unauthorized)
        }
    }
}

// ── PIN decision ─────────────────────────────────────────────────────────────

pub struct ValidatePinInput {
    pub pin: String,
    pub mac_address: String,
}

pub struct ValidatePinUseCase<D, U, R, L>
where
    D: DeviceRepository,
    U: UserRepository,
    R: ReservationRepository,
    L: AccessLogRepository,
{
    pub devices: D,
    pub users: U,
    pub reservations: R,
    pub access_logs: L,
}

impl<D, U, R, L> ValidatePinUseCase<D, U, R, L>
where
    D: DeviceRepository,
    U: UserRepository,
    R: ReservationRepository,
    L: AccessLogRepository,
{
    pub async fn execute(&self, input: ValidatePinInput) -> Result<AccessDecision, ApiError> {
        let Some(device) = self.devices.find_by_mac_with_roles(&input.mac_address).await? else {
            return Ok(AccessDecision::Unauthorized);
        };

        let Some(user) = self.users.find_by_pin(&input.pin).await? else {
            return Ok(AccessDecision::Unauthorized);
        };
        if !user.user.is_active {
            return Ok(AccessDecision::Unauthorized);
        }

        // Superusers bypass the intersection entirely.
        let mut granted = is_superuser(&user.role_names)
            || roles_intersect(&device.role_names, &user.role_names);

        // Fall back to an active reservation when the device guards a lab.
        if !granted {
            if let Some(lab_id) = device.device.lab_id {
                let now = Utc::now();
                if self
                    .reservations
                    .find_active(user.user.id, lab_id, now)
                    .await?
                    .is_some()
                {
                    granted = true;
                    tracing::info!(
                        username = %user.user.username,
                        %lab_id,
                        "pin access granted by active reservation"
                    );
                }
            }
        }

        self.access_logs
            .append(user.user.id, device.device.id, granted)
            .await?;

        if granted {
            Ok(AccessDecision::Authorized {
                username: user.user.username,
            })
        } else {
            Ok(AccessDecision::Unauthorized)
        }
    }
}
