//! Reservation booking.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::repository::{LabRepository, ReservationRepository};
use crate::domain::types::Reservation;
use crate::error::ApiError;

pub struct CreateReservationInput {
    pub user_id: Uuid,
    pub lab_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

pub struct CreateReservationUseCase<R, L>
where
    R: ReservationRepository,
    L: LabRepository,
{
    pub reservations: R,
    pub labs: L,
}

impl<R, L> CreateReservationUseCase<R, L>
where
    R: ReservationRepository,
    L: LabRepository,
{
    pub async fn execute(&self, input: CreateReservationInput) -> Result<Reservation, ApiError> {
        if input.end_time <= input.start_time {
            return Err(ApiError::InvalidTimeRange);
        }
        if self.labs.find_by_id(input.lab_id).await?.is_none() {
            return Err(ApiError::LabNotFound);
        }
        if self
            .reservations
            .find_overlapping(input.lab_id, input.start_time, input.end_time)
            .await?
            .is_some()
        {
            return Err(ApiError::ReservationConflict);
        }

        let reservation = Reservation {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            lab_id: input.lab_id,
            start_time: input.start_time,
            end_time: input.end_time,
            created_at: Utc::now(),
        };
        self.reservations.create(&reservation).await?;
        Ok(reservation)
    }
}
