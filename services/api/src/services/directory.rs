//! Users, sections and login verification

use std::sync::Arc;

use anyhow::Context;
use domain::{NewSection, NewUser, Section, SectionLookup, User};
use tracing::{info, warn};

use super::log_failure;
use crate::{
    config::BootstrapAdmin,
    password::{hash_password, verify_password},
    repositories::{SectionStore, StoreError, StoreResult, UserStore},
};

#[derive(Clone)]
pub struct DirectoryService {
    users: Arc<dyn UserStore>,
    sections: Arc<dyn SectionStore>,
}

impl DirectoryService {
    pub fn new(users: Arc<dyn UserStore>, sections: Arc<dyn SectionStore>) -> Self {
        Self { users, sections }
    }

    pub async fn create_user(
        &self,
        login: &str,
        password: &str,
        role: &str,
        full_name: &str,
    ) -> StoreResult<User> {
        let new_user = NewUser::new(login, password, role, full_name)
            .map_err(StoreError::from)
            .inspect_err(|e| log_failure("User creation", e))?;
        let hash = hash_password(&new_user.password)
            .await
            .map_err(StoreError::from)
            .inspect_err(|e| log_failure("User creation", e))?;

        let user = self
            .users
            .insert(&new_user, &hash)
            .await
            .inspect_err(|e| log_failure("User creation", e))?;

        info!("Created {} account '{}' ({})", user.role, user.login, user.id);
        Ok(user)
    }

    pub async fn delete_user(&self, user_id: i64) -> StoreResult<()> {
        self.users
            .delete(user_id)
            .await
            .inspect_err(|e| log_failure("User deletion", e))?;

        info!("Deleted user {}", user_id);
        Ok(())
    }

    pub async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.users
            .list()
            .await
            .inspect_err(|e| log_failure("User listing", e))
    }

    pub async fn find_user(&self, user_id: i64) -> StoreResult<Option<User>> {
        self.users
            .find(user_id)
            .await
            .inspect_err(|e| log_failure("User lookup", e))
    }

    /// Check a login/password pair; `None` means the pair does not match
    pub async fn authenticate(&self, login: &str, password: &str) -> StoreResult<Option<User>> {
        let credentials = self
            .users
            .find_credentials(login.trim())
            .await
            .inspect_err(|e| log_failure("Login lookup", e))?;

        let Some(credentials) = credentials else {
            warn!("Login attempt for unknown account '{}'", login);
            return Ok(None);
        };

        let matches = verify_password(password, &credentials.password_hash)
            .await
            .map_err(StoreError::from)
            .inspect_err(|e| log_failure("Password check", e))?;
        if matches {
            Ok(Some(credentials.user))
        } else {
            warn!("Wrong password for account '{}'", credentials.user.login);
            Ok(None)
        }
    }

    /// Create the configured admin when the directory is empty
    pub async fn bootstrap_admin(&self, admin: Option<&BootstrapAdmin>) -> anyhow::Result<()> {
        let Some(admin) = admin else {
            return Ok(());
        };
        if self.users.count().await? > 0 {
            return Ok(());
        }

        let user = self
            .create_user(&admin.login, &admin.password, "admin", &admin.full_name)
            .await
            .context("Failed to create bootstrap admin")?;
        info!("Bootstrapped admin account '{}'", user.login);
        Ok(())
    }

    pub async fn create_section(&self, name: &str, description: &str) -> StoreResult<Section> {
        let new_section = NewSection::new(name, description)
            .map_err(StoreError::from)
            .inspect_err(|e| log_failure("Section creation", e))?;

        let section = self
            .sections
            .insert(&new_section)
            .await
            .inspect_err(|e| log_failure("Section creation", e))?;

        info!("Created section {} '{}'", section.id, section.name);
        Ok(section)
    }

    /// Materials in the section keep pointing at it and render as "no section"
    pub async fn delete_section(&self, section_id: i64) -> StoreResult<()> {
        self.sections
            .delete(section_id)
            .await
            .inspect_err(|e| log_failure("Section deletion", e))?;

        info!("Deleted section {}", section_id);
        Ok(())
    }

    pub async fn list_sections(&self) -> StoreResult<Vec<Section>> {
        self.sections
            .list()
            .await
            .inspect_err(|e| log_failure("Section listing", e))
    }

    pub async fn section_lookup(&self) -> StoreResult<SectionLookup> {
        Ok(SectionLookup::new(&self.list_sections().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemoryStore;
    use domain::{DomainError, NO_SECTION, Role};

    fn service() -> DirectoryService {
        let store = MemoryStore::default();
        DirectoryService::new(Arc::new(store.clone()), Arc::new(store))
    }

    fn admin() -> BootstrapAdmin {
        BootstrapAdmin {
            login: "admin".to_string(),
            password: "change-me".to_string(),
            full_name: "Administrator".to_string(),
        }
    }

    #[tokio::test]
    async fn authenticate_checks_the_hash() {
        let service = service();
        service
            .create_user("ann", "s3cret", "worker", "Ann")
            .await
            .unwrap();

        let user = service.authenticate("ann", "s3cret").await.unwrap().unwrap();
        assert_eq!(user.role, Role::Worker);
        assert!(service.authenticate("ann", "nope").await.unwrap().is_none());
        assert!(service.authenticate("bob", "s3cret").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_logins_all_verify() {
        let service = service();
        service
            .create_user("ann", "s3cret", "worker", "Ann")
            .await
            .unwrap();

        let attempts: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                let password = if i % 2 == 0 { "s3cret" } else { "nope" };
                tokio::spawn(async move { service.authenticate("ann", password).await })
            })
            .collect();

        let mut accepted = 0;
        for attempt in attempts {
            if attempt.await.unwrap().unwrap().is_some() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 4);
    }

    #[tokio::test]
    async fn unknown_role_is_rejected() {
        let service = service();
        assert!(matches!(
            service.create_user("ann", "pw", "boss", "Ann").await,
            Err(StoreError::Domain(DomainError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn duplicate_login_is_a_conflict() {
        let service = service();
        service.create_user("ann", "pw", "worker", "Ann").await.unwrap();
        assert!(matches!(
            service.create_user("ann", "pw2", "manager", "Ann B").await,
            Err(StoreError::Domain(DomainError::Conflict(_)))
        ));
    }

    #[tokio::test]
    async fn bootstrap_only_fills_an_empty_directory() {
        let service = service();
        service.bootstrap_admin(Some(&admin())).await.unwrap();
        service.bootstrap_admin(Some(&admin())).await.unwrap();

        let users = service.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, Role::Admin);

        service.bootstrap_admin(None).await.unwrap();
    }

    #[tokio::test]
    async fn deleted_section_resolves_to_sentinel() {
        let service = service();
        let section = service.create_section("Cutting", "").await.unwrap();
        assert_eq!(
            service.section_lookup().await.unwrap().label(Some(section.id)),
            "Cutting"
        );

        service.delete_section(section.id).await.unwrap();
        assert_eq!(
            service.section_lookup().await.unwrap().label(Some(section.id)),
            NO_SECTION
        );
    }
}
