use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Argon2,
};

use crate::domain::{ApiError, NewUser, Role, User, UserStore};
use crate::interface_adapters::protocol::CreateUserRequest;
use crate::use_cases::validation::{is_valid_email, FieldErrors};

const USERNAME_MIN_LEN: usize = 3;
const USERNAME_MAX_LEN: usize = 32;
const PASSWORD_MIN_LEN: usize = 8;

// Argon2id PHC string with a fresh random salt.
pub(crate) fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::internal(&e))?;
    Ok(hash.to_string())
}

pub(crate) fn verify_password(user: &User, password: &str) -> bool {
    let parsed = match PasswordHash::new(&user.password_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::error!(user_id = user.id, error = %e, "stored password hash is unreadable");
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub struct CreateUserUseCase<'a, U: ?Sized> {
    pub store: &'a U,
}

impl<U> CreateUserUseCase<'_, U>
where
    U: UserStore + ?Sized,
{
    pub async fn execute(&self, payload: CreateUserRequest) -> Result<User, ApiError> {
        let mut errors = FieldErrors::new();

        let username = payload.username.trim().to_string();
        if let Err(message) = validate_username(&username) {
            errors.push("username", message);
        }
        let email = payload.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            errors.push("email", "Email inválido");
        }
        if payload.password.chars().count() < PASSWORD_MIN_LEN {
            errors.push(
                "password",
                format!("La contraseña debe tener al menos {PASSWORD_MIN_LEN} caracteres"),
            );
        }
        let role = match payload.role.as_deref() {
            None => Some(Role::Seller),
            Some(value) => Role::parse(value),
        };
        if role.is_none() {
            errors.push("role", "El rol debe ser admin o seller");
        }
        errors.finish()?;

        let user = NewUser {
            username,
            email,
            role: role.unwrap_or(Role::Seller),
            password_hash: hash_password(&payload.password)?,
        };

        Ok(self.store.insert_user(user).await?)
    }
}

fn validate_username(value: &str) -> Result<(), &'static str> {
    let len = value.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err("El usuario debe tener entre 3 y 32 caracteres");
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("El usuario solo admite letras, números y guión bajo");
    }
    Ok(())
}

// Ensures the configured administrator exists. Returns true when it was created.
pub struct SeedAdminUseCase<'a, U: ?Sized> {
    pub store: &'a U,
}

impl<U> SeedAdminUseCase<'_, U>
where
    U: UserStore + ?Sized,
{
    pub async fn execute(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<bool, ApiError> {
        if self.store.find_by_username(username).await?.is_some() {
            return Ok(false);
        }

        CreateUserUseCase { store: self.store }
            .execute(CreateUserRequest {
                username: username.to_string(),
                email: email.to_string(),
                password: password.to_string(),
                role: Some(Role::Admin.as_str().to_string()),
            })
            .await?;
        Ok(true)
    }
}
