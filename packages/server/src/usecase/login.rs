//! UseCase: ログイン処理
//!
//! Binds a username to the requesting identity. A second login from the same
//! identity silently replaces its previous name; room membership is not
//! touched.

use std::sync::Arc;

use crate::domain::{ClientIdentity, SessionRepository, Username};

use super::error::UseCaseError;

/// ログインのユースケース
pub struct LoginUseCase {
    sessions: Arc<dyn SessionRepository>,
}

impl LoginUseCase {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    /// ログインを実行
    ///
    /// # Returns
    ///
    /// * `Ok(Username)` - the bound username
    /// * `Err(UseCaseError::InvalidUsername)` - syntax rule failed or reserved name
    /// * `Err(UseCaseError::UsernameExists)` - name held by another identity
    pub async fn execute(
        &self,
        identity: ClientIdentity,
        requested: String,
    ) -> Result<Username, UseCaseError> {
        let username = Username::new(requested).map_err(|e| {
            tracing::debug!("Rejected login from {}: {}", identity, e);
            UseCaseError::InvalidUsername
        })?;

        let previous = self.sessions.login(identity, username.clone()).await?;
        match previous {
            Some(previous) if previous != username => {
                tracing::info!("{} logged in as '{}' (was '{}')", identity, username, previous)
            }
            _ => tracing::info!("{} logged in as '{}'", identity, username),
        }

        Ok(username)
    }
}
