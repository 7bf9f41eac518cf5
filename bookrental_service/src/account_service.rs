use std::sync::Arc;

use crate::accounts_repository::AccountsRepository;
use crate::api::{Account, AccountId, NewAccount, RoleType};
use crate::errors::ServiceError;
use crate::password::{hash_password, verify_password};

#[derive(Clone)]
pub struct AccountService {
    accounts_repository: Arc<dyn AccountsRepository>,
}

impl AccountService {
    pub fn new(accounts_repository: Arc<dyn AccountsRepository>) -> Self {
        Self {
            accounts_repository,
        }
    }

    /// Checks email and password. Unknown email and wrong password fail the same way
    #[tracing::instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Account, ServiceError> {
        let Some(account) = self.accounts_repository.find_by_email(email).await? else {
            return Err(ServiceError::InvalidCredentials);
        };

        if verify_password(password, &account.password)? {
            Ok(account)
        } else {
            Err(ServiceError::InvalidCredentials)
        }
    }

    /// Fails unless the account exists and has the admin role
    #[tracing::instrument(skip(self))]
    pub async fn require_admin(&self, account_id: AccountId) -> Result<Account, ServiceError> {
        let account = self
            .accounts_repository
            .find_by_id(account_id)
            .await?
            .ok_or(ServiceError::AccountNotFound(account_id))?;

        match account.role {
            RoleType::Admin => Ok(account),
            RoleType::User => Err(ServiceError::NotAdmin(account_id)),
        }
    }

    /// Creates an account with a freshly hashed password
    #[tracing::instrument(skip(self, password))]
    pub async fn provision(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: RoleType,
    ) -> Result<AccountId, ServiceError> {
        let account_id = self
            .accounts_repository
            .add_account(NewAccount {
                email: email.to_string(),
                password: hash_password(password)?,
                name: name.to_string(),
                role,
            })
            .await?;
        tracing::info!(account_id, %role, "Account provisioned");
        Ok(account_id)
    }

    /// Provisions the account unless one with the same email exists, returns its id either way.
    /// The password of an existing account is left untouched
    #[tracing::instrument(skip(self, password))]
    pub async fn provision_if_missing(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: RoleType,
    ) -> Result<AccountId, ServiceError> {
        match self.accounts_repository.find_by_email(email).await? {
            Some(existing) => Ok(existing.id),
            None => self.provision(email, password, name, role).await,
        }
    }
}

#[cfg(test)]
mod account_service_tests {
    use crate::database::InMemoryDatabase;
    use crate::errors::ErrorKind;

    use super::*;

    #[tokio::test]
    async fn authenticate_checks_password() {
        let service = AccountService::new(Arc::new(InMemoryDatabase::default()));
        let id = service
            .provision("user@example.com", "password1", "User", RoleType::User)
            .await
            .unwrap();

        let account = service
            .authenticate("user@example.com", "password1")
            .await
            .unwrap();
        assert_eq!(account.id, id);
        assert_ne!(account.password, "password1");

        let wrong_password = service
            .authenticate("user@example.com", "password2")
            .await
            .unwrap_err();
        assert!(matches!(wrong_password, ServiceError::InvalidCredentials));
        assert_eq!(wrong_password.kind(), ErrorKind::Unauthorized);

        assert!(matches!(
            service.authenticate("nobody@example.com", "password1").await,
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn require_admin_checks_role() {
        let service = AccountService::new(Arc::new(InMemoryDatabase::default()));
        let admin_id = service
            .provision("admin@example.com", "password", "Admin", RoleType::Admin)
            .await
            .unwrap();
        let user_id = service
            .provision("user@example.com", "password", "User", RoleType::User)
            .await
            .unwrap();

        assert_eq!(service.require_admin(admin_id).await.unwrap().id, admin_id);

        let not_admin = service.require_admin(user_id).await.unwrap_err();
        assert!(matches!(not_admin, ServiceError::NotAdmin(..)));
        assert_eq!(not_admin.kind(), ErrorKind::Forbidden);

        assert!(matches!(
            service.require_admin(999).await,
            Err(ServiceError::AccountNotFound(999))
        ));
    }

    #[tokio::test]
    async fn provision_if_missing_keeps_existing_account() {
        let service = AccountService::new(Arc::new(InMemoryDatabase::default()));
        let first = service
            .provision_if_missing("admin@example.com", "first", "Admin", RoleType::Admin)
            .await
            .unwrap();
        let second = service
            .provision_if_missing("admin@example.com", "second", "Admin", RoleType::Admin)
            .await
            .unwrap();
        assert_eq!(first, second);

        assert!(service
            .authenticate("admin@example.com", "first")
            .await
            .is_ok());
        assert!(service
            .authenticate("admin@example.com", "second")
            .await
            .is_err());
    }
}
