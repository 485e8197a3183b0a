//! Repository traits and in-memory implementations.
//!
//! Durable persistence is an external collaborator; the traits below are the
//! seam where a database-backed implementation plugs in. The in-memory
//! implementations back local runs and the test suite. Relationships between
//! entities are plain ID references resolved through the stores.

mod lock;
mod memory;

pub use lock::OperationLocks;
pub use memory::{
    InMemoryAuthenticationRepository, InMemoryCredentialDefinitionRepository,
    InMemoryCredentialRepository, InMemoryOperationConfigRepository, InMemoryOperationRepository,
    InMemoryOrganizationRepository, InMemoryOtpDefinitionRepository, InMemoryOtpRepository,
    InMemoryStepDefinitionRepository, InMemoryUserRepository,
};

use async_trait::async_trait;

use crate::models::{
    AuthenticationRecord, Credential, CredentialDefinition, Operation, OperationConfig,
    OperationMethodConfig, Organization, Otp, OtpDefinition, StepDefinition, UserIdentity,
};

type StoreResult<T> = Result<T, anyhow::Error>;

/// Durable record of operations and their step history.
#[async_trait]
pub trait OperationRepository: Send + Sync {
    async fn get(&self, operation_id: &str) -> StoreResult<Option<Operation>>;
    async fn save(&self, operation: Operation) -> StoreResult<()>;
    /// Pending (result CONTINUE) operations for a user, newest first.
    async fn find_pending(&self, user_id: &str, mobile_token_only: bool)
        -> StoreResult<Vec<Operation>>;
    async fn find_by_external_transaction_id(
        &self,
        external_transaction_id: &str,
    ) -> StoreResult<Vec<Operation>>;
}

/// Method-chain configuration lookup.
#[async_trait]
pub trait StepDefinitionRepository: Send + Sync {
    /// Definitions for an operation name, ordered by response priority.
    async fn find_by_operation_name(&self, operation_name: &str)
        -> StoreResult<Vec<StepDefinition>>;
    async fn save(&self, definition: StepDefinition) -> StoreResult<()>;
    /// Returns false when no such definition exists.
    async fn delete(&self, operation_name: &str, step_definition_id: u64) -> StoreResult<bool>;
}

#[async_trait]
pub trait OperationConfigRepository: Send + Sync {
    async fn get(&self, operation_name: &str) -> StoreResult<Option<OperationConfig>>;
    async fn save(&self, config: OperationConfig) -> StoreResult<()>;
    async fn delete(&self, operation_name: &str) -> StoreResult<bool>;
    async fn list(&self) -> StoreResult<Vec<OperationConfig>>;
    async fn get_method_config(
        &self,
        operation_name: &str,
        auth_method: crate::models::AuthMethod,
    ) -> StoreResult<Option<OperationMethodConfig>>;
    async fn save_method_config(&self, config: OperationMethodConfig) -> StoreResult<()>;
    async fn delete_method_config(
        &self,
        operation_name: &str,
        auth_method: crate::models::AuthMethod,
    ) -> StoreResult<bool>;
}

#[async_trait]
pub trait CredentialDefinitionRepository: Send + Sync {
    async fn get(&self, name: &str) -> StoreResult<Option<CredentialDefinition>>;
    async fn save(&self, definition: CredentialDefinition) -> StoreResult<()>;
    async fn delete(&self, name: &str) -> StoreResult<bool>;
    async fn list(&self) -> StoreResult<Vec<CredentialDefinition>>;
}

#[async_trait]
pub trait CredentialRepository: Send + Sync {
    async fn find(&self, credential_name: &str, user_id: &str)
        -> StoreResult<Option<Credential>>;
    async fn save(&self, credential: Credential) -> StoreResult<()>;
    async fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<Credential>>;
}

#[async_trait]
pub trait OtpDefinitionRepository: Send + Sync {
    async fn get(&self, name: &str) -> StoreResult<Option<OtpDefinition>>;
    async fn save(&self, definition: OtpDefinition) -> StoreResult<()>;
    async fn delete(&self, name: &str) -> StoreResult<bool>;
    async fn list(&self) -> StoreResult<Vec<OtpDefinition>>;
}

#[async_trait]
pub trait OtpRepository: Send + Sync {
    async fn get(&self, otp_id: &str) -> StoreResult<Option<Otp>>;
    async fn save(&self, otp: Otp) -> StoreResult<()>;
    /// Most recently created OTP issued for an operation.
    async fn find_latest_by_operation(&self, operation_id: &str) -> StoreResult<Option<Otp>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get(&self, user_id: &str) -> StoreResult<Option<UserIdentity>>;
    async fn save(&self, user: UserIdentity) -> StoreResult<()>;
}

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn get(&self, organization_id: &str) -> StoreResult<Option<Organization>>;
    async fn save(&self, organization: Organization) -> StoreResult<()>;
    async fn delete(&self, organization_id: &str) -> StoreResult<bool>;
    async fn list(&self) -> StoreResult<Vec<Organization>>;
}

#[async_trait]
pub trait AuthenticationRepository: Send + Sync {
    async fn save(&self, record: AuthenticationRecord) -> StoreResult<()>;
    async fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<AuthenticationRecord>>;
}
