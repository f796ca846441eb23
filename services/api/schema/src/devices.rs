use sea_orm::entity::prelude::*;

/// A network-addressable physical controller (door lock or meter).
///
/// `api_token` is rotated on every identify call; `ip_address` is reported
/// by the device after boot and used for the outbound unlock call.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "devices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub mac_address: String,
    pub api_token: String,
    #[sea_orm(nullable)]
    pub ip_address: Option<String>,
    pub is_authorized: bool,
    /// "WATER_METER", "ENERGY_METER", or unset for door locks.
    #[sea_orm(nullable)]
    pub kind: Option<String>,
    #[sea_orm(unique, nullable)]
    pub lab_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::labs::Entity",
        from = "Column::LabId",
        to = "super::labs::Column::Id"
    )]
    Lab,
    #[sea_orm(has_many = "super::device_roles::Entity")]
    DeviceRoles,
    #[sea_orm(has_many = "super::access_logs::Entity")]
    AccessLogs,
    #[sea_orm(has_many = "super::meter_readings::Entity")]
    MeterReadings,
}

impl Related<super::labs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lab.def()
    }
}

impl Related<super::device_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeviceRoles.def()
    }
}

impl Related<super::access_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccessLogs.def()
    }
}

impl Related<super::meter_readings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MeterReadings.def()
    }
}

impl Related<super::roles::Entity> for Entity {
    fn to() -> RelationDef {
        super::device_roles::Relation::Role.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::device_roles::Relation::Device.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
