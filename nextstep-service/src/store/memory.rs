//! DashMap-backed repositories for local runs and tests.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::models::{
    AuthMethod, AuthResult, AuthenticationRecord, Credential, CredentialDefinition, Operation,
    OperationConfig, OperationMethodConfig, Organization, Otp, OtpDefinition, StepDefinition,
    UserIdentity,
};

use super::{
    AuthenticationRepository, CredentialDefinitionRepository, CredentialRepository,
    OperationConfigRepository, OperationRepository, OrganizationRepository, OtpDefinitionRepository,
    OtpRepository, StepDefinitionRepository, UserRepository,
};

type StoreResult<T> = Result<T, anyhow::Error>;

#[derive(Default)]
pub struct InMemoryOperationRepository {
    operations: DashMap<String, Operation>,
}

impl InMemoryOperationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OperationRepository for InMemoryOperationRepository {
    async fn get(&self, operation_id: &str) -> StoreResult<Option<Operation>> {
        Ok(self.operations.get(operation_id).map(|e| e.value().clone()))
    }

    async fn save(&self, operation: Operation) -> StoreResult<()> {
        self.operations
            .insert(operation.operation_id.clone(), operation);
        Ok(())
    }

    async fn find_pending(
        &self,
        user_id: &str,
        mobile_token_only: bool,
    ) -> StoreResult<Vec<Operation>> {
        let mut pending: Vec<Operation> = self
            .operations
            .iter()
            .filter(|e| {
                let op = e.value();
                op.user_id.as_deref() == Some(user_id)
                    && op.result == AuthResult::Continue
                    && (!mobile_token_only || op.mobile_token_active)
            })
            .map(|e| e.value().clone())
            .collect();
        pending.sort_by(|a, b| b.timestamp_created.cmp(&a.timestamp_created));
        Ok(pending)
    }

    async fn find_by_external_transaction_id(
        &self,
        external_transaction_id: &str,
    ) -> StoreResult<Vec<Operation>> {
        let mut found: Vec<Operation> = self
            .operations
            .iter()
            .filter(|e| {
                e.value().external_transaction_id.as_deref() == Some(external_transaction_id)
            })
            .map(|e| e.value().clone())
            .collect();
        found.sort_by(|a, b| b.timestamp_created.cmp(&a.timestamp_created));
        Ok(found)
    }
}

#[derive(Default)]
pub struct InMemoryStepDefinitionRepository {
    definitions: DashMap<String, Vec<StepDefinition>>,
}

impl InMemoryStepDefinitionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StepDefinitionRepository for InMemoryStepDefinitionRepository {
    async fn find_by_operation_name(
        &self,
        operation_name: &str,
    ) -> StoreResult<Vec<StepDefinition>> {
        let mut definitions = self
            .definitions
            .get(operation_name)
            .map(|e| e.value().clone())
            .unwrap_or_default();
        definitions.sort_by_key(|d| d.response_priority);
        Ok(definitions)
    }

    async fn save(&self, definition: StepDefinition) -> StoreResult<()> {
        let mut entry = self
            .definitions
            .entry(definition.operation_name.clone())
            .or_default();
        entry.retain(|d| d.step_definition_id != definition.step_definition_id);
        entry.push(definition);
        Ok(())
    }

    async fn delete(&self, operation_name: &str, step_definition_id: u64) -> StoreResult<bool> {
        let Some(mut entry) = self.definitions.get_mut(operation_name) else {
            return Ok(false);
        };
        let before = entry.len();
        entry.retain(|d| d.step_definition_id != step_definition_id);
        Ok(entry.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryOperationConfigRepository {
    configs: DashMap<String, OperationConfig>,
    method_configs: DashMap<(String, AuthMethod), OperationMethodConfig>,
}

impl InMemoryOperationConfigRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OperationConfigRepository for InMemoryOperationConfigRepository {
    async fn get(&self, operation_name: &str) -> StoreResult<Option<OperationConfig>> {
        Ok(self.configs.get(operation_name).map(|e| e.value().clone()))
    }

    async fn save(&self, config: OperationConfig) -> StoreResult<()> {
        self.configs.insert(config.operation_name.clone(), config);
        Ok(())
    }

    async fn delete(&self, operation_name: &str) -> StoreResult<bool> {
        Ok(self.configs.remove(operation_name).is_some())
    }

    async fn list(&self) -> StoreResult<Vec<OperationConfig>> {
        let mut configs: Vec<OperationConfig> =
            self.configs.iter().map(|e| e.value().clone()).collect();
        configs.sort_by(|a, b| a.operation_name.cmp(&b.operation_name));
        Ok(configs)
    }

    async fn get_method_config(
        &self,
        operation_name: &str,
        auth_method: AuthMethod,
    ) -> StoreResult<Option<OperationMethodConfig>> {
        Ok(self
            .method_configs
            .get(&(operation_name.to_string(), auth_method))
            .map(|e| e.value().clone()))
    }

    async fn save_method_config(&self, config: OperationMethodConfig) -> StoreResult<()> {
        self.method_configs
            .insert((config.operation_name.clone(), config.auth_method), config);
        Ok(())
    }

    async fn delete_method_config(
        &self,
        operation_name: &str,
        auth_method: AuthMethod,
    ) -> StoreResult<bool> {
        Ok(self
            .method_configs
            .remove(&(operation_name.to_string(), auth_method))
            .is_some())
    }
}

#[derive(Default)]
pub struct InMemoryCredentialDefinitionRepository {
    definitions: DashMap<String, CredentialDefinition>,
}

impl InMemoryCredentialDefinitionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialDefinitionRepository for InMemoryCredentialDefinitionRepository {
    async fn get(&self, name: &str) -> StoreResult<Option<CredentialDefinition>> {
        Ok(self.definitions.get(name).map(|e| e.value().clone()))
    }

    async fn save(&self, definition: CredentialDefinition) -> StoreResult<()> {
        self.definitions.insert(definition.name.clone(), definition);
        Ok(())
    }

    async fn delete(&self, name: &str) -> StoreResult<bool> {
        Ok(self.definitions.remove(name).is_some())
    }

    async fn list(&self) -> StoreResult<Vec<CredentialDefinition>> {
        let mut definitions: Vec<CredentialDefinition> =
            self.definitions.iter().map(|e| e.value().clone()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(definitions)
    }
}

#[derive(Default)]
pub struct InMemoryCredentialRepository {
    // Keyed by (credential definition name, user id).
    credentials: DashMap<(String, String), Credential>,
}

impl InMemoryCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn find(
        &self,
        credential_name: &str,
        user_id: &str,
    ) -> StoreResult<Option<Credential>> {
        Ok(self
            .credentials
            .get(&(credential_name.to_string(), user_id.to_string()))
            .map(|e| e.value().clone()))
    }

    async fn save(&self, credential: Credential) -> StoreResult<()> {
        self.credentials.insert(
            (credential.credential_name.clone(), credential.user_id.clone()),
            credential,
        );
        Ok(())
    }

    async fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<Credential>> {
        let mut credentials: Vec<Credential> = self
            .credentials
            .iter()
            .filter(|e| e.value().user_id == user_id)
            .map(|e| e.value().clone())
            .collect();
        credentials.sort_by(|a, b| a.credential_name.cmp(&b.credential_name));
        Ok(credentials)
    }
}

#[derive(Default)]
pub struct InMemoryOtpDefinitionRepository {
    definitions: DashMap<String, OtpDefinition>,
}

impl InMemoryOtpDefinitionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OtpDefinitionRepository for InMemoryOtpDefinitionRepository {
    async fn get(&self, name: &str) -> StoreResult<Option<OtpDefinition>> {
        Ok(self.definitions.get(name).map(|e| e.value().clone()))
    }

    async fn save(&self, definition: OtpDefinition) -> StoreResult<()> {
        self.definitions.insert(definition.name.clone(), definition);
        Ok(())
    }

    async fn delete(&self, name: &str) -> StoreResult<bool> {
        Ok(self.definitions.remove(name).is_some())
    }

    async fn list(&self) -> StoreResult<Vec<OtpDefinition>> {
        let mut definitions: Vec<OtpDefinition> =
            self.definitions.iter().map(|e| e.value().clone()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(definitions)
    }
}

#[derive(Default)]
pub struct InMemoryOtpRepository {
    otps: DashMap<String, Otp>,
}

impl InMemoryOtpRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OtpRepository for InMemoryOtpRepository {
    async fn get(&self, otp_id: &str) -> StoreResult<Option<Otp>> {
        Ok(self.otps.get(otp_id).map(|e| e.value().clone()))
    }

    async fn save(&self, otp: Otp) -> StoreResult<()> {
        self.otps.insert(otp.otp_id.clone(), otp);
        Ok(())
    }

    async fn find_latest_by_operation(&self, operation_id: &str) -> StoreResult<Option<Otp>> {
        Ok(self
            .otps
            .iter()
            .filter(|e| e.value().operation_id.as_deref() == Some(operation_id))
            .max_by_key(|e| e.value().timestamp_created)
            .map(|e| e.value().clone()))
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: DashMap<String, UserIdentity>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, user_id: &str) -> StoreResult<Option<UserIdentity>> {
        Ok(self.users.get(user_id).map(|e| e.value().clone()))
    }

    async fn save(&self, user: UserIdentity) -> StoreResult<()> {
        self.users.insert(user.user_id.clone(), user);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryOrganizationRepository {
    organizations: DashMap<String, Organization>,
}

impl InMemoryOrganizationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryOrganizationRepository {
    async fn get(&self, organization_id: &str) -> StoreResult<Option<Organization>> {
        Ok(self
            .organizations
            .get(organization_id)
            .map(|e| e.value().clone()))
    }

    async fn save(&self, organization: Organization) -> StoreResult<()> {
        self.organizations
            .insert(organization.organization_id.clone(), organization);
        Ok(())
    }

    async fn delete(&self, organization_id: &str) -> StoreResult<bool> {
        Ok(self.organizations.remove(organization_id).is_some())
    }

    async fn list(&self) -> StoreResult<Vec<Organization>> {
        let mut organizations: Vec<Organization> = self
            .organizations
            .iter()
            .map(|e| e.value().clone())
            .collect();
        organizations.sort_by_key(|o| o.order_number);
        Ok(organizations)
    }
}

#[derive(Default)]
pub struct InMemoryAuthenticationRepository {
    records: DashMap<String, AuthenticationRecord>,
}

impl InMemoryAuthenticationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthenticationRepository for InMemoryAuthenticationRepository {
    async fn save(&self, record: AuthenticationRecord) -> StoreResult<()> {
        self.records.insert(record.authentication_id.clone(), record);
        Ok(())
    }

    async fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<AuthenticationRecord>> {
        let mut records: Vec<AuthenticationRecord> = self
            .records
            .iter()
            .filter(|e| e.value().user_id.as_deref() == Some(user_id))
            .map(|e| e.value().clone())
            .collect();
        records.sort_by(|a, b| a.timestamp_created.cmp(&b.timestamp_created));
        Ok(records)
    }
}
