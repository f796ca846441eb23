//! Per-lab audit trail, resolved through the lab's door device.

use uuid::Uuid;

use morea_domain::pagination::PageRequest;

use crate::domain::repository::{AccessLogRepository, LabRepository};
use crate::domain::types::AccessLogEntry;
use crate::error::ApiError;

pub struct LabAccessLogsUseCase<L, A>
where
    L: LabRepository,
    A: AccessLogRepository,
{
    pub labs: L,
    pub access_logs: A,
}

impl<L, A> LabAccessLogsUseCase<L, A>
where
    L: LabRepository,
    A: AccessLogRepository,
{
    pub async fn execute(
        &self,
        lab_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<AccessLogEntry>, ApiError> {
        if self.labs.find_by_id(lab_id).await?.is_none() {
            return Err(ApiError::LabNotFound);
        }
        // A lab with no door device has no trail to show.
        let Some(device) = self.labs.find_device(lab_id).await? else {
            return Ok(Vec::new());
        };
        self.access_logs.list_by_device(device.id, page).await
    }
}
