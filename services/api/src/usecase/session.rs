//! Login and signup.

use anyhow::Context;
use chrono::Utc;
use uuid::Uuid;

use morea_auth::token::issue_session_token;
use morea_domain::access::is_superuser;

use crate::domain::repository::{LabRepository, UserRepository};
use crate::domain::types::{User, validate_pin};
use crate::error::ApiError;

/// The dashboard login form accepts either credential.
pub struct LoginInput {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: String,
}

pub struct LoginOutput {
    pub token: String,
    pub user: User,
    pub roles: Vec<String>,
}

pub struct LoginUseCase<U>
where
    U: UserRepository,
{
    pub users: U,
    pub jwt_secret: String,
}

impl<U> LoginUseCase<U>
where
    U: UserRepository,
{
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, ApiError> {
        let found = match (&input.email, &input.username) {
            (Some(email), _) => self.users.find_by_email(email).await?,
            (None, Some(username)) => self.users.find_by_username(username).await?,
            (None, None) => return Err(ApiError::MissingData),
        };
        // Same error for unknown account and wrong password.
        let Some(user) = found else {
            return Err(ApiError::InvalidCredentials);
        };

        let valid = bcrypt::verify(&input.password, &user.password_hash)
            .context("bcrypt verify failed")?;
        if !valid || !user.is_active {
            return Err(ApiError::InvalidCredentials);
        }

        let roles = self.users.role_names(user.id).await?;
        let token = issue_session_token(user.id, &user.username, roles.clone(), &self.jwt_secret)
            .context("failed to sign session token")?;

        Ok(LoginOutput { token, user, roles })
    }
}

pub struct SignupInput {
    /// The logged-in user performing the signup.
    pub actor_id: Uuid,
    pub actor_roles: Vec<String>,
    pub username: String,
    pub email: String,
    pub password: String,
    pub access_pin: Option<String>,
    /// Labs the new user joins immediately.
    pub lab_ids: Vec<Uuid>,
}

pub struct SignupUseCase<U, L>
where
    U: UserRepository,
    L: LabRepository,
{
    pub users: U,
    pub labs: L,
}

impl<U, L> SignupUseCase<U, L>
where
    U: UserRepository,
    L: LabRepository,
{
    pub async fn execute(&self, input: SignupInput) -> Result<User, ApiError> {
        // Superusers may register anyone. Lab staff may register new members
        // only into labs where they hold the staff flag.
        if !is_superuser(&input.actor_roles) {
            if input.lab_ids.is_empty() {
                return Err(ApiError::Forbidden);
            }
            for lab_id in &input.lab_ids {
                let member = self.labs.find_member(input.actor_id, *lab_id).await?;
                if !member.is_some_and(|m| m.is_staff) {
                    return Err(ApiError::Forbidden);
                }
            }
        }

        if input.username.is_empty() || input.email.is_empty() || input.password.is_empty() {
            return Err(ApiError::MissingData);
        }
        if let Some(ref pin) = input.access_pin {
            if !validate_pin(pin) {
                return Err(ApiError::InvalidPin);
            }
        }
        for lab_id in &input.lab_ids {
            if self.labs.find_by_id(*lab_id).await?.is_none() {
                return Err(ApiError::LabNotFound);
            }
        }
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(ApiError::EmailAlreadyExists);
        }

        let password_hash =
            bcrypt::hash(&input.password, bcrypt::DEFAULT_COST).context("bcrypt hash failed")?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: input.username,
            email: input.email,
            password_hash,
            is_active: true,
            access_pin: input.access_pin,
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).await?;

        for lab_id in &input.lab_ids {
            self.labs.add_members(*lab_id, &[(user.id, false)]).await?;
        }

        Ok(user)
    }
}
