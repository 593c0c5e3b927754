//! Account registration and self-service profile management.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{User, UserRole};
use crate::error::{DomainError, RepoError};
use crate::ports::{PasswordService, UserRepository};

use super::validation::{
    base_username, normalize_name, validate_email, validate_password, validate_password_length,
};

/// Registration input.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
}

/// Partial profile update; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }

    pub async fn register(&self, new_user: NewUser) -> Result<User, DomainError> {
        let email = new_user.email.trim().to_string();
        validate_email(&email)?;
        validate_password(&new_user.password)?;
        self.ensure_email_available(&email, None).await?;

        let password_hash = self.passwords.hash(&new_user.password)?;
        let username = self.generate_username(&email).await?;

        let user = User::new(email, password_hash, username, new_user.role).with_names(
            normalize_name(new_user.first_name),
            normalize_name(new_user.last_name),
        );

        self.users.create(user).await.map_err(uniqueness_as_validation)
    }

    /// Look up an account that has not been deleted.
    pub async fn get(&self, id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_active_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> Result<User, DomainError> {
        let mut user = self.get(id).await?;

        if let Some(email) = changes.email {
            let email = email.trim().to_string();
            if email != user.email {
                validate_email(&email)?;
                self.ensure_email_available(&email, Some(user.id)).await?;
                user.email = email;
            }
        }
        if changes.first_name.is_some() {
            user.first_name = normalize_name(changes.first_name);
        }
        if changes.last_name.is_some() {
            user.last_name = normalize_name(changes.last_name);
        }
        user.touch();

        self.users.update(user).await.map_err(uniqueness_as_validation)
    }

    pub async fn change_password(&self, id: Uuid, change: PasswordChange) -> Result<(), DomainError> {
        validate_password(&change.new_password)?;

        let mut user = self.get(id).await?;
        if !self
            .passwords
            .verify(&change.current_password, &user.password_hash)?
        {
            return Err(DomainError::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }

        if change.new_password != change.confirm_password {
            return Err(DomainError::Validation(
                "New password and confirm password do not match".to_string(),
            ));
        }

        user.password_hash = self.passwords.hash(&change.new_password)?;
        user.touch();
        self.users.update(user).await?;
        Ok(())
    }

    /// Soft-delete the account once the password has been confirmed.
    pub async fn delete_account(&self, id: Uuid, password: &str) -> Result<(), DomainError> {
        validate_password_length(password)?;

        let mut user = self.get(id).await?;
        if !self.passwords.verify(password, &user.password_hash)? {
            return Err(DomainError::Unauthorized(
                "Password is incorrect".to_string(),
            ));
        }

        user.soft_delete();
        self.users.update(user).await?;
        Ok(())
    }

    async fn ensure_email_available(
        &self,
        email: &str,
        owner: Option<Uuid>,
    ) -> Result<(), DomainError> {
        match self.users.find_active_by_email(email).await? {
            Some(existing) if Some(existing.id) != owner => Err(DomainError::Validation(
                "Email is already in use".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// First free name among `base`, `base1`, `base2`, ...
    ///
    /// Not atomic: two concurrent registrations can pick the same name, in
    /// which case the unique constraint rejects the second insert.
    async fn generate_username(&self, email: &str) -> Result<String, DomainError> {
        let base = base_username(email);
        let mut candidate = base.clone();
        let mut suffix: u32 = 1;

        while self.users.username_exists(&candidate).await? {
            candidate = format!("{base}{suffix}");
            suffix += 1;
        }

        Ok(candidate)
    }
}

fn uniqueness_as_validation(err: RepoError) -> DomainError {
    match err {
        RepoError::Constraint(_) => {
            DomainError::Validation("Email or username is already in use".to_string())
        }
        other => other.into(),
    }
}
