//! User service - the four record operations over the document store

use crate::{
    config::{UpdatePolicy, UsersConfig},
    db::DocumentStore,
    models::{User, UserFields, USERS_COLLECTION},
    Error, Result,
};
use std::sync::Arc;

pub struct UserService {
    store: Arc<dyn DocumentStore>,
    update_policy: UpdatePolicy,
    report_missing: bool,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_config(store, &UsersConfig::default())
    }

    pub fn with_config(store: Arc<dyn DocumentStore>, config: &UsersConfig) -> Self {
        Self {
            store,
            update_policy: config.update_policy,
            report_missing: config.report_missing,
        }
    }

    /// Every stored user, in store order.
    ///
    /// Documents whose fields no longer coerce (written outside this service)
    /// are left out of the result and logged.
    pub async fn list(&self) -> Result<Vec<User>> {
        let documents = self.store.find_all(USERS_COLLECTION).await?;
        Ok(documents
            .into_iter()
            .filter_map(|document| {
                let id = document.id;
                match User::try_from(document) {
                    Ok(user) => Some(user),
                    Err(e) => {
                        tracing::warn!(user_id = %id, error = %e, "Skipping unreadable user document");
                        None
                    }
                }
            })
            .collect())
    }

    /// Insert a user built from whichever fields were supplied.
    pub async fn create(&self, fields: UserFields) -> Result<User> {
        let document = self
            .store
            .insert(USERS_COLLECTION, fields.to_document())
            .await?;

        tracing::debug!(user_id = %document.id, "User created");
        User::try_from(document)
    }

    /// Apply `fields` to the user with `id` according to the update policy.
    ///
    /// Returns `None` for an unknown id unless `report_missing` is set, in
    /// which case that is a `NotFound` error.
    pub async fn update(&self, id: &str, fields: UserFields) -> Result<Option<User>> {
        let changes = match self.update_policy {
            UpdatePolicy::Replace => fields.to_replacement(),
            UpdatePolicy::Merge => fields.to_merge(),
        };

        let updated = self
            .store
            .update_by_id(USERS_COLLECTION, id, changes)
            .await?;

        match updated {
            Some(document) => {
                tracing::debug!(user_id = %document.id, policy = ?self.update_policy, "User updated");
                User::try_from(document).map(Some)
            }
            None => self.missing(id),
        }
    }

    /// Remove the user with `id`. Unknown ids behave as in [`UserService::update`].
    pub async fn delete(&self, id: &str) -> Result<Option<User>> {
        match self.store.delete_by_id(USERS_COLLECTION, id).await? {
            Some(document) => {
                tracing::debug!(user_id = %document.id, "User deleted");
                User::try_from(document).map(Some)
            }
            None => self.missing(id),
        }
    }

    fn missing(&self, id: &str) -> Result<Option<User>> {
        if self.report_missing {
            return Err(Error::NotFound(format!("{USERS_COLLECTION}/{id}")));
        }
        tracing::debug!(user_id = id, "No user with this id; nothing changed");
        Ok(None)
    }
}
