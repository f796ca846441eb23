use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbAccessLogRepository, DbCardRepository, DbDeviceRepository, DbLabRepository,
    DbMeterReadingRepository, DbReservationRepository, DbRoleRepository, DbUserRepository,
};
use crate::infra::device_client::HttpUnlockClient;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub http: reqwest::Client,
    pub jwt_secret: String,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn card_repo(&self) -> DbCardRepository {
        DbCardRepository {
            db: self.db.clone(),
        }
    }

    pub fn device_repo(&self) -> DbDeviceRepository {
        DbDeviceRepository {
            db: self.db.clone(),
        }
    }

    pub fn lab_repo(&self) -> DbLabRepository {
        DbLabRepository {
            db: self.db.clone(),
        }
    }

    pub fn role_repo(&self) -> DbRoleRepository {
        DbRoleRepository {
            db: self.db.clone(),
        }
    }

    pub fn reservation_repo(&self) -> DbReservationRepository {
        DbReservationRepository {
            db: self.db.clone(),
        }
    }

    pub fn access_log_repo(&self) -> DbAccessLogRepository {
        DbAccessLogRepository {
            db: self.db.clone(),
        }
    }

    pub fn meter_reading_repo(&self) -> DbMeterReadingRepository {
        DbMeterReadingRepository {
            db: self.db.clone(),
        }
    }

    pub fn unlock_client(&self) -> HttpUnlockClient {
        HttpUnlockClient {
            http: self.http.clone(),
        }
    }
}
