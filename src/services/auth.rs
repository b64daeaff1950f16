// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{Store, UserRepository},
    models::auth::{
        AuthResponse, Claims, LoginUserPayload, RegisterUserPayload, UpdateUserPayload, User,
        UserProfile, UserStatus,
    },
};

const TOKEN_LIFETIME_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AuthService {
    store: Store,
    user_repo: UserRepository,
    jwt_secret: String,
    hash_cost: u32,
}

impl AuthService {
    pub fn new(store: Store, jwt_secret: String) -> Self {
        Self {
            user_repo: UserRepository::new(store.clone()),
            store,
            jwt_secret,
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Custo do bcrypt; os testes usam o mínimo.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    pub async fn register_user(&self, payload: RegisterUserPayload) -> Result<UserProfile, AppError> {
        payload.validate()?;

        // O hashing fica fora da transação, não toca no armazenamento
        let password_hash = self.hash_password(payload.password).await?;
        let status = payload.status.unwrap_or_default();

        let user = User {
            id: Uuid::new_v4(),
            username: payload.username.trim().to_string(),
            email: payload.email.trim().to_string(),
            password_hash,
            first_name: payload.first_name.trim().to_string(),
            last_name: payload.last_name.trim().to_string(),
            phone: payload.phone,
            role: payload.role.trim().to_string(),
            department: payload.department,
            status,
            is_active: payload.is_active.unwrap_or(status == UserStatus::Active),
            is_staff: payload.is_staff.unwrap_or(false),
            last_login: None,
            date_joined: Some(Utc::now()),
        };

        let mut tx = self.store.begin().await;
        let user = self.user_repo.create_user(&mut tx, user).await?;
        tx.commit().await?;

        tracing::info!(username = %user.username, "👤 Usuário registrado");
        Ok(user.into())
    }

    pub async fn login_user(&self, payload: LoginUserPayload) -> Result<AuthResponse, AppError> {
        payload.validate()?;

        // O campo `username` aceita também o e-mail
        let user = match self.user_repo.find_by_username(&payload.username).await? {
            Some(user) => user,
            None => self
                .user_repo
                .find_by_email(&payload.username)
                .await?
                .ok_or(AppError::InvalidCredentials)?,
        };

        if !user.can_sign_in() {
            return Err(AppError::InvalidCredentials);
        }

        let password = payload.password;
        let password_hash = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let mut tx = self.store.begin().await;
        let mut user = self.user_repo.find_by_id_in(&mut tx, user.id).await?;
        user.last_login = Some(Utc::now());
        let user = self.user_repo.save_user(&mut tx, user).await?;
        tx.commit().await?;

        self.create_token(user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        let user = self
            .user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)?;

        // Usuário desativado perde o acesso mesmo com token válido
        if !user.can_sign_in() {
            return Err(AppError::InvalidToken);
        }
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<UserProfile>, AppError> {
        Ok(self.user_repo.list().await?.into_iter().map(UserProfile::from).collect())
    }

    pub async fn update_user(&self, id: Uuid, payload: UpdateUserPayload) -> Result<UserProfile, AppError> {
        payload.validate()?;

        let password_hash = match payload.password {
            Some(password) => Some(self.hash_password(password).await?),
            None => None,
        };

        let mut tx = self.store.begin().await;
        let mut user = self.user_repo.find_by_id_in(&mut tx, id).await?;

        if let Some(username) = payload.username {
            user.username = username.trim().to_string();
        }
        if let Some(email) = payload.email {
            user.email = email.trim().to_string();
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }
        if let Some(first_name) = payload.first_name {
            user.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = payload.last_name {
            user.last_name = last_name.trim().to_string();
        }
        if payload.phone.is_some() {
            user.phone = payload.phone;
        }
        if let Some(role) = payload.role {
            user.role = role.trim().to_string();
        }
        if payload.department.is_some() {
            user.department = payload.department;
        }
        if let Some(status) = payload.status {
            user.status = status;
        }
        if let Some(is_active) = payload.is_active {
            user.is_active = is_active;
        }
        if let Some(is_staff) = payload.is_staff {
            user.is_staff = is_staff;
        }

        let user = self.user_repo.save_user(&mut tx, user).await?;
        tx.commit().await?;
        Ok(user.into())
    }

    /// Exclusão lógica: o usuário fica inativo e não consegue mais entrar.
    pub async fn deactivate_user(&self, id: Uuid) -> Result<UserProfile, AppError> {
        let mut tx = self.store.begin().await;
        let mut user = self.user_repo.find_by_id_in(&mut tx, id).await?;
        user.status = UserStatus::Inactive;
        user.is_active = false;
        let user = self.user_repo.save_user(&mut tx, user).await?;
        tx.commit().await?;

        tracing::info!(username = %user.username, "Usuário desativado");
        Ok(user.into())
    }

    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let cost = self.hash_cost;
        let hashed = tokio::task::spawn_blocking(move || hash(&password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }

    fn create_token(&self, user_id: Uuid) -> Result<AuthResponse, AppError> {
        let now = Utc::now();
        let lifetime = chrono::Duration::days(TOKEN_LIFETIME_DAYS);
        let expires_at = now + lifetime;

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let access = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?;

        Ok(AuthResponse {
            access,
            token_type: "Bearer",
            expires_in: lifetime.num_seconds(),
        })
    }
}

/// Menor custo aceito pelo bcrypt; deixa os testes rápidos.
#[cfg(test)]
pub const TEST_HASH_COST: u32 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(Store::in_memory(), "test-secret".into()).with_hash_cost(TEST_HASH_COST)
    }

    fn register(username: &str, email: &str) -> RegisterUserPayload {
        RegisterUserPayload {
            username: username.into(),
            email: email.into(),
            password: "palengke123".into(),
            first_name: "Maria".into(),
            last_name: "Santos".into(),
            phone: None,
            role: "market_manager".into(),
            department: Some("Administration".into()),
            status: None,
            is_active: None,
            is_staff: None,
        }
    }

    fn login(username: &str, password: &str) -> LoginUserPayload {
        LoginUserPayload {
            username: username.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn register_then_login_by_username_or_email() {
        let service = service();
        let profile = service.register_user(register("maria", "maria@palengke.ph")).await.unwrap();
        assert!(profile.is_active);
        assert!(profile.date_joined.is_some());

        let by_name = service.login_user(login("maria", "palengke123")).await.unwrap();
        let by_email = service.login_user(login("MARIA@palengke.ph", "palengke123")).await.unwrap();
        assert_eq!(by_name.token_type, "Bearer");
        assert_eq!(by_name.expires_in, 7 * 24 * 3600);

        let user = service.validate_token(&by_email.access).await.unwrap();
        assert_eq!(user.id, profile.id);
        assert!(user.last_login.is_some());
    }

    #[tokio::test]
    async fn wrong_password_and_bad_token_are_refused() {
        let service = service();
        service.register_user(register("maria", "maria@palengke.ph")).await.unwrap();

        let err = service.login_user(login("maria", "wrong-pass")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
        assert!(matches!(
            service.login_user(login("nobody", "palengke123")).await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(service.validate_token("garbage").await, Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn duplicates_and_short_passwords_are_rejected() {
        let service = service();
        service.register_user(register("maria", "maria@palengke.ph")).await.unwrap();

        assert!(matches!(
            service.register_user(register("maria", "other@palengke.ph")).await,
            Err(AppError::UsernameAlreadyExists)
        ));
        assert!(matches!(
            service.register_user(register("juan", "Maria@Palengke.ph")).await,
            Err(AppError::EmailAlreadyExists)
        ));

        let mut short = register("juan", "juan@palengke.ph");
        short.password = "short".into();
        assert!(matches!(service.register_user(short).await, Err(AppError::ValidationError(_))));
        assert_eq!(service.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_can_change_password() {
        let service = service();
        let profile = service.register_user(register("maria", "maria@palengke.ph")).await.unwrap();

        let updated = service
            .update_user(
                profile.id,
                UpdateUserPayload {
                    password: Some("new-password".into()),
                    department: Some("Finance".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.department.as_deref(), Some("Finance"));
        assert_eq!(updated.first_name, "Maria");

        assert!(service.login_user(login("maria", "palengke123")).await.is_err());
        assert!(service.login_user(login("maria", "new-password")).await.is_ok());
    }

    #[tokio::test]
    async fn deactivated_users_lose_access() {
        let service = service();
        let profile = service.register_user(register("maria", "maria@palengke.ph")).await.unwrap();
        let token = service.login_user(login("maria", "palengke123")).await.unwrap();

        let removed = service.deactivate_user(profile.id).await.unwrap();
        assert_eq!(removed.status, UserStatus::Inactive);
        assert!(!removed.is_active);

        assert!(service.login_user(login("maria", "palengke123")).await.is_err());
        assert!(service.validate_token(&token.access).await.is_err());
        assert_eq!(service.list_users().await.unwrap().len(), 1);
        assert!(matches!(service.deactivate_user(Uuid::new_v4()).await, Err(AppError::UserNotFound)));
    }

    #[tokio::test]
    async fn inactive_status_alone_revokes_tokens() {
        let service = service();
        let profile = service.register_user(register("maria", "maria@palengke.ph")).await.unwrap();
        let token = service.login_user(login("maria", "palengke123")).await.unwrap();

        let update: UpdateUserPayload = serde_json::from_value(serde_json::json!({
            "status": "inactive",
            "is_active": true,
        }))
        .unwrap();
        let updated = service.update_user(profile.id, update).await.unwrap();
        assert_eq!(updated.status, UserStatus::Inactive);
        assert!(updated.is_active);

        assert!(matches!(service.validate_token(&token.access).await, Err(AppError::InvalidToken)));
        assert!(matches!(
            service.login_user(login("maria", "palengke123")).await,
            Err(AppError::InvalidCredentials)
        ));
    }
}
