//! InMemory Session Repository 実装
//!
//! Both directions of the identity/username mapping sit behind one lock, so
//! every login and logout is observed atomically.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ClientIdentity, RepositoryError, SessionRepository, Username};

#[derive(Debug, Default)]
struct SessionTable {
    by_identity: HashMap<ClientIdentity, Username>,
    by_username: HashMap<Username, ClientIdentity>,
}

/// インメモリ Session Repository 実装
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    table: Mutex<SessionTable>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions
    pub async fn count(&self) -> usize {
        self.table.lock().await.by_identity.len()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn login(
        &self,
        identity: ClientIdentity,
        username: Username,
    ) -> Result<Option<Username>, RepositoryError> {
        let mut table = self.table.lock().await;

        if let Some(holder) = table.by_username.get(&username)
            && *holder != identity
        {
            return Err(RepositoryError::UsernameExists);
        }

        let previous = table.by_identity.insert(identity, username.clone());
        if let Some(previous) = &previous
            && *previous != username
        {
            table.by_username.remove(previous);
        }
        table.by_username.insert(username, identity);

        Ok(previous)
    }

    async fn logout(&self, identity: &ClientIdentity) -> Option<Username> {
        let mut table = self.table.lock().await;
        let username = table.by_identity.remove(identity)?;
        table.by_username.remove(&username);
        Some(username)
    }

    async fn username_of(&self, identity: &ClientIdentity) -> Option<Username> {
        self.table.lock().await.by_identity.get(identity).cloned()
    }

    async fn identity_of(&self, username: &Username) -> Option<ClientIdentity> {
        self.table.lock().await.by_username.get(username).copied()
    }

    async fn usernames_of(&self, identities: &[ClientIdentity]) -> Vec<Username> {
        let table = self.table.lock().await;
        identities
            .iter()
            .filter_map(|identity| table.by_identity.get(identity).cloned())
            .collect()
    }
}
