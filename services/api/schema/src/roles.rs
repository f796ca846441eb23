use sea_orm::entity::prelude::*;

/// Named permission bucket ("superuser", "staff", arbitrary others).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_roles::Entity")]
    UserRoles,
    #[sea_orm(has_many = "super::device_roles::Entity")]
    DeviceRoles,
}

impl Related<super::user_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRoles.def()
    }
}

impl Related<super::device_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeviceRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
