use sea_orm::entity::prelude::*;

/// An RFID card, keyed by the hex id printed in its chip.
///
/// Unknown cards are self-registered with `permission = false` on first
/// scan; an admin later enables them and links a user.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub card_id: String,
    pub permission: bool,
    #[sea_orm(nullable)]
    pub name: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_cards::Entity")]
    UserCards,
}

impl Related<super::user_cards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserCards.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
