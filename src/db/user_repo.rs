// src/db/user_repo.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::record_store::{Collection, Store, Transaction},
    models::auth::User,
};

// O repositório de usuários, responsável pela coleção `palengke_users`
#[derive(Clone)]
pub struct UserRepository {
    store: Store,
}

impl UserRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        self.store.load(Collection::Users).await
    }

    // Busca um usuário pelo seu e-mail (sem diferenciar maiúsculas)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.trim();
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|u| u.email.eq_ignore_ascii_case(email)))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let username = username.trim();
        Ok(self.list().await?.into_iter().find(|u| u.username == username))
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.list().await?.into_iter().find(|u| u.id == id))
    }

    // Cria um novo usuário, recusando username ou e-mail já usados
    pub async fn create_user(&self, tx: &mut Transaction, user: User) -> Result<User, AppError> {
        let mut users: Vec<User> = tx.load(Collection::Users).await?;
        ensure_unique(&users, &user)?;

        users.push(user.clone());
        tx.stage(Collection::Users, &users)?;
        Ok(user)
    }

    /// Substitui o usuário inteiro, mantendo as mesmas regras de unicidade.
    pub async fn save_user(&self, tx: &mut Transaction, user: User) -> Result<User, AppError> {
        let mut users: Vec<User> = tx.load(Collection::Users).await?;
        ensure_unique(&users, &user)?;

        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(AppError::UserNotFound)?;
        *slot = user.clone();

        tx.stage(Collection::Users, &users)?;
        Ok(user)
    }

    pub async fn find_by_id_in(&self, tx: &mut Transaction, id: Uuid) -> Result<User, AppError> {
        let users: Vec<User> = tx.load(Collection::Users).await?;
        users
            .into_iter()
            .find(|u| u.id == id)
            .ok_or(AppError::UserNotFound)
    }
}

fn ensure_unique(users: &[User], candidate: &User) -> Result<(), AppError> {
    let others = users.iter().filter(|u| u.id != candidate.id);
    for other in others {
        if other.username == candidate.username {
            return Err(AppError::UsernameAlreadyExists);
        }
        if !candidate.email.is_empty() && other.email.eq_ignore_ascii_case(&candidate.email) {
            return Err(AppError::EmailAlreadyExists);
        }
    }
    Ok(())
}
