//! Login use case.
//!
//! Verifies an API key against the agent service and, only when the service
//! accepts it, stores it as the process credential. A rejected key leaves
//! whatever was stored before untouched, so a failed re-login does not log
//! the caller out.

use crate::ports::agent_gateway::{AgentError, AgentGateway};
use crate::ports::credentials::CredentialStore;
use desk_domain::{AuthReceipt, Credential};
use std::sync::Arc;
use tracing::{debug, info};

/// Input for the [`LoginUseCase`].
#[derive(Debug, Clone)]
pub struct LoginInput {
    /// The API key to verify.
    pub api_key: String,
}

impl LoginInput {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

/// Use case for logging in to the agent service.
pub struct LoginUseCase {
    gateway: Arc<dyn AgentGateway>,
    credentials: Arc<dyn CredentialStore>,
}

impl LoginUseCase {
    pub fn new(gateway: Arc<dyn AgentGateway>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            gateway,
            credentials,
        }
    }

    /// Verify the key and store it on acceptance.
    pub async fn execute(&self, input: LoginInput) -> Result<AuthReceipt, AgentError> {
        debug!("Verifying API key against the agent service");
        let receipt = self.gateway.login(&input.api_key).await?;

        // Only a key the service accepted is worth keeping
        self.credentials.store(Credential::new(input.api_key));
        info!(username = %receipt.username, "Login accepted");

        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::agent_gateway::StreamHandle;
    use crate::ports::credentials::{CredentialsProvider, InMemoryCredentialStore};
    use async_trait::async_trait;
    use desk_domain::{
        AgentSettings, AgentStatus, Answer, InitReceipt, Query, ServiceHealth,
    };
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio_util::sync::CancellationToken;

    // ==================== Test Mocks ====================

    struct MockGateway {
        login_results: Mutex<VecDeque<Result<AuthReceipt, AgentError>>>,
    }

    impl MockGateway {
        fn new(results: Vec<Result<AuthReceipt, AgentError>>) -> Self {
            Self {
                login_results: Mutex::new(VecDeque::from(results)),
            }
        }
    }

    #[async_trait]
    impl AgentGateway for MockGateway {
        async fn login(&self, _api_key: &str) -> Result<AuthReceipt, AgentError> {
            self.login_results
                .lock()
                .unwrap()
                .pop_front()
                .expect("no more scripted login results")
        }

        async fn health(&self) -> Result<ServiceHealth, AgentError> {
            unreachable!("not scripted")
        }

        async fn initialize(&self, _force_reinit: bool) -> Result<InitReceipt, AgentError> {
            unreachable!("not scripted")
        }

        async fn status(&self) -> Result<AgentStatus, AgentError> {
            unreachable!("not scripted")
        }

        async fn settings(&self) -> Result<AgentSettings, AgentError> {
            unreachable!("not scripted")
        }

        async fn ask(&self, _query: &Query) -> Result<Answer, AgentError> {
            unreachable!("not scripted")
        }

        async fn open_stream(&self, _query: &Query, _cancel: CancellationToken) -> StreamHandle {
            unreachable!("not scripted")
        }
    }

    fn accepted(username: &str) -> AuthReceipt {
        AuthReceipt {
            success: true,
            message: "Login successful".to_string(),
            username: username.to_string(),
            timestamp: "2025-01-15T10:30:00".to_string(),
        }
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_accepted_key_is_stored() {
        let gateway = Arc::new(MockGateway::new(vec![Ok(accepted("user_12345"))]));
        let store = Arc::new(InMemoryCredentialStore::new());
        let use_case = LoginUseCase::new(gateway, store.clone());

        let receipt = use_case
            .execute(LoginInput::new("valid-key"))
            .await
            .unwrap();

        assert_eq!(receipt.username, "user_12345");
        assert_eq!(store.current(), Some(Credential::new("valid-key")));
    }

    #[tokio::test]
    async fn test_rejected_key_is_not_stored() {
        let gateway = Arc::new(MockGateway::new(vec![Err(AgentError::RequestFailed {
            status: Some(401),
            message: "Invalid API key".to_string(),
        })]));
        let store = Arc::new(InMemoryCredentialStore::new());
        let use_case = LoginUseCase::new(gateway, store.clone());

        let result = use_case.execute(LoginInput::new("bad-key")).await;

        assert!(result.is_err());
        assert_eq!(store.current(), None);
    }

    #[tokio::test]
    async fn test_failed_relogin_keeps_previous_credential() {
        let gateway = Arc::new(MockGateway::new(vec![
            Ok(accepted("user_12345")),
            Err(AgentError::RequestFailed {
                status: Some(401),
                message: "Invalid API key".to_string(),
            }),
        ]));
        let store = Arc::new(InMemoryCredentialStore::new());
        let use_case = LoginUseCase::new(gateway, store.clone());

        use_case.execute(LoginInput::new("good-key")).await.unwrap();
        let result = use_case.execute(LoginInput::new("bad-key")).await;

        assert!(result.is_err());
        assert_eq!(store.current(), Some(Credential::new("good-key")));
    }

    #[tokio::test]
    async fn test_relogin_overwrites_credential() {
        let gateway = Arc::new(MockGateway::new(vec![
            Ok(accepted("user_1")),
            Ok(accepted("user_2")),
        ]));
        let store = Arc::new(InMemoryCredentialStore::new());
        let use_case = LoginUseCase::new(gateway, store.clone());

        use_case.execute(LoginInput::new("first-key")).await.unwrap();
        use_case
            .execute(LoginInput::new("second-key"))
            .await
            .unwrap();

        assert_eq!(store.current(), Some(Credential::new("second-key")));
    }
}
