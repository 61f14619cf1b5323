//! User service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use dailyflip_common::{AppError, AppResult, IdGenerator};
use dailyflip_db::{
    entities::{
        profile,
        user::{self, Role},
    },
    repositories::{ProfileRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    profile_repo: ProfileRepository,
    id_gen: IdGenerator,
}

/// Input for registering a new account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Input for updating a user and their profile.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(length(max = 2048))]
    pub image: Option<String>,

    #[validate(length(max = 2048))]
    pub bio: Option<String>,

    #[validate(length(max = 2048))]
    pub background_image: Option<String>,
}

/// A user together with their profile.
#[derive(Debug, Clone)]
pub struct UserWithProfile {
    pub user: user::Model,
    pub profile: profile::Model,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, profile_repo: ProfileRepository) -> Self {
        Self {
            user_repo,
            profile_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new member account with an empty profile.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let user_id = self.id_gen.generate();
        let now = chrono::Utc::now();

        let user_model = user::ActiveModel {
            id: Set(user_id.clone()),
            name: Set(input.name),
            email: Set(email),
            password: Set(password_hash),
            image: Set(None),
            role: Set(Role::Member),
            token: Set(self.id_gen.generate_token()),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let profile_model = profile::ActiveModel {
            user_id: Set(user_id),
            bio: Set(String::new()),
            background_image: Set(String::new()),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let user = self
            .user_repo
            .create_with_profile(user_model, profile_model)
            .await?;

        tracing::info!(user_id = %user.id, "User registered");

        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Get a user and their profile.
    pub async fn get_with_profile(&self, id: &str) -> AppResult<UserWithProfile> {
        let user = self.user_repo.get_by_id(id).await?;
        let profile = self.profile_or_empty(&user.id).await?;

        Ok(UserWithProfile { user, profile })
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Authenticate a user by email and password.
    ///
    /// Unknown emails and wrong passwords are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_email(email.trim())
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password)? {
            tracing::debug!(user_id = %user.id, "Rejected sign-in with wrong password");
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Regenerate a user's token, ending the current session.
    pub async fn sign_out(&self, user: user::Model) -> AppResult<()> {
        let user_id = user.id.clone();

        let mut active: user::ActiveModel = user.into();
        active.token = Set(self.id_gen.generate_token());
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await?;

        tracing::info!(user_id = %user_id, "User signed out");

        Ok(())
    }

    /// Whether the user holds the admin role, as currently stored.
    pub async fn is_admin(&self, user_id: &str) -> AppResult<bool> {
        Ok(self
            .user_repo
            .find_by_id(user_id)
            .await?
            .is_some_and(|u| u.is_admin()))
    }

    /// Update a user and their profile.
    ///
    /// Only the user themselves or an admin may edit. Absent fields are left
    /// unchanged.
    pub async fn update(
        &self,
        actor_id: &str,
        id: &str,
        input: UpdateUserInput,
    ) -> AppResult<UserWithProfile> {
        input.validate()?;

        if actor_id != id && !self.is_admin(actor_id).await? {
            tracing::warn!(actor_id = %actor_id, user_id = %id, "Refused profile edit");
            return Err(AppError::Forbidden(
                "You can only edit your own profile".to_string(),
            ));
        }

        let mut user = self.user_repo.get_by_id(id).await?;
        let now = chrono::Utc::now();

        if input.name.is_some() || input.image.is_some() {
            let mut active: user::ActiveModel = user.into();
            if let Some(name) = input.name {
                active.name = Set(name);
            }
            if let Some(image) = input.image {
                active.image = Set(Some(image).filter(|i| !i.is_empty()));
            }
            active.updated_at = Set(Some(now.into()));
            user = self.user_repo.update(active).await?;
        }

        let profile = match self.profile_repo.find_by_user_id(id).await? {
            Some(existing) => {
                if input.bio.is_none() && input.background_image.is_none() {
                    existing
                } else {
                    let mut active: profile::ActiveModel = existing.into();
                    if let Some(bio) = input.bio {
                        active.bio = Set(bio);
                    }
                    if let Some(background_image) = input.background_image {
                        active.background_image = Set(background_image);
                    }
                    active.updated_at = Set(Some(now.into()));
                    self.profile_repo.update(active).await?
                }
            }
            None => {
                let model = profile::ActiveModel {
                    user_id: Set(id.to_string()),
                    bio: Set(input.bio.unwrap_or_default()),
                    background_image: Set(input.background_image.unwrap_or_default()),
                    created_at: Set(now.into()),
                    updated_at: Set(None),
                };
                self.profile_repo.create(model).await?
            }
        };

        tracing::info!(user_id = %id, actor_id = %actor_id, "User profile updated");

        Ok(UserWithProfile { user, profile })
    }

    async fn profile_or_empty(&self, user_id: &str) -> AppResult<profile::Model> {
        let profile = self.profile_repo.find_by_user_id(user_id).await?;

        Ok(profile.unwrap_or_else(|| profile::Model {
            user_id: user_id.to_string(),
            bio: String::new(),
            background_image: String::new(),
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        }))
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
