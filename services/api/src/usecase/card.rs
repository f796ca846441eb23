//! Card registration and the User↔Card link.

use uuid::Uuid;

use crate::domain::repository::{CardRepository, UserRepository};
use crate::error::ApiError;

pub struct LinkCardInput {
    pub user_id: Uuid,
    pub card_hex: String,
}

pub struct LinkCardUseCase<C, U>
where
    C: CardRepository,
    U: UserRepository,
{
    pub cards: C,
    pub users: U,
}

impl<C, U> LinkCardUseCase<C, U>
where
    C: CardRepository,
    U: UserRepository,
{
    /// Links a previously scanned card to a user. The card must already be
    /// in the registry (scanned at least once); linking does not enable it.
    pub async fn execute(&self, input: LinkCardInput) -> Result<(), ApiError> {
        let Some(card) = self.cards.find_by_hex(&input.card_hex).await? else {
            return Err(ApiError::CardNotFound);
        };
        if self.users.find_by_id(input.user_id).await?.is_none() {
            return Err(ApiError::UserNotFound);
        }
        if self.cards.is_linked(input.user_id, card.id).await? {
            return Err(ApiError::CardAlreadyLinked);
        }
        self.cards.link_user(input.user_id, card.id).await
    }
}

pub struct UnlinkCardUseCase<C>
where
    C: CardRepository,
{
    pub cards: C,
}

impl<C> UnlinkCardUseCase<C>
where
    C: CardRepository,
{
    pub async fn execute(&self, user_id: Uuid, card_id: Uuid) -> Result<(), ApiError> {
        if !self.cards.unlink_user(user_id, card_id).await? {
            return Err(ApiError::CardNotFound);
        }
        Ok(())
    }
}
