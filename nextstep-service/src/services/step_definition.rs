//! Step-definition and operation-config administration.

use std::sync::Arc;

use tracing::info;

use crate::models::{
    AuthMethod, AuthResult, AuthStepResult, OperationConfig, OperationMethodConfig,
    StepDefinition, StepRequestType,
};
use crate::store::{OperationConfigRepository, StepDefinitionRepository};

use super::error::{NextStepError, ServiceResult};

pub struct StepDefinitionService {
    step_definitions: Arc<dyn StepDefinitionRepository>,
    operation_configs: Arc<dyn OperationConfigRepository>,
}

impl StepDefinitionService {
    pub fn new(
        step_definitions: Arc<dyn StepDefinitionRepository>,
        operation_configs: Arc<dyn OperationConfigRepository>,
    ) -> Self {
        Self {
            step_definitions,
            operation_configs,
        }
    }

    pub async fn create_step_definition(
        &self,
        definition: StepDefinition,
    ) -> ServiceResult<StepDefinition> {
        let existing = self
            .step_definitions
            .find_by_operation_name(&definition.operation_name)
            .await?;
        if existing
            .iter()
            .any(|d| d.step_definition_id == definition.step_definition_id)
        {
            return Err(NextStepError::StepDefinitionAlreadyExists(format!(
                "{}/{}",
                definition.operation_name, definition.step_definition_id
            )));
        }
        self.step_definitions.save(definition.clone()).await?;
        info!(
            operation_name = %definition.operation_name,
            step_definition_id = definition.step_definition_id,
            "step definition created"
        );
        Ok(definition)
    }

    pub async fn list_step_definitions(
        &self,
        operation_name: &str,
    ) -> ServiceResult<Vec<StepDefinition>> {
        Ok(self
            .step_definitions
            .find_by_operation_name(operation_name)
            .await?)
    }

    pub async fn delete_step_definition(
        &self,
        operation_name: &str,
        step_definition_id: u64,
    ) -> ServiceResult<()> {
        if !self
            .step_definitions
            .delete(operation_name, step_definition_id)
            .await?
        {
            return Err(NextStepError::StepDefinitionNotFound(format!(
                "{}/{}",
                operation_name, step_definition_id
            )));
        }
        info!(operation_name, step_definition_id, "step definition deleted");
        Ok(())
    }

    pub async fn create_operation_config(
        &self,
        config: OperationConfig,
    ) -> ServiceResult<OperationConfig> {
        if self
            .operation_configs
            .get(&config.operation_name)
            .await?
            .is_some()
        {
            return Err(NextStepError::OperationConfigAlreadyExists(
                config.operation_name,
            ));
        }
        self.operation_configs.save(config.clone()).await?;
        info!(operation_name = %config.operation_name, "operation config created");
        Ok(config)
    }

    pub async fn get_operation_config(
        &self,
        operation_name: &str,
    ) -> ServiceResult<OperationConfig> {
        self.operation_configs
            .get(operation_name)
            .await?
            .ok_or_else(|| NextStepError::OperationConfigNotFound(operation_name.to_string()))
    }

    pub async fn list_operation_configs(&self) -> ServiceResult<Vec<OperationConfig>> {
        Ok(self.operation_configs.list().await?)
    }

    pub async fn delete_operation_config(&self, operation_name: &str) -> ServiceResult<()> {
        if !self.operation_configs.delete(operation_name).await? {
            return Err(NextStepError::OperationConfigNotFound(
                operation_name.to_string(),
            ));
        }
        info!(operation_name, "operation config deleted");
        Ok(())
    }

    pub async fn save_method_config(
        &self,
        config: OperationMethodConfig,
    ) -> ServiceResult<OperationMethodConfig> {
        self.operation_configs
            .save_method_config(config.clone())
            .await?;
        Ok(config)
    }

    pub async fn delete_method_config(
        &self,
        operation_name: &str,
        auth_method: AuthMethod,
    ) -> ServiceResult<()> {
        if !self
            .operation_configs
            .delete_method_config(operation_name, auth_method)
            .await?
        {
            return Err(NextStepError::OperationConfigNotFound(format!(
                "{}/{}",
                operation_name, auth_method
            )));
        }
        Ok(())
    }

    /// Seeds the default method chains for the login and payment operations.
    ///
    /// Existing definitions win; seeding only fills operation names that have
    /// no definitions yet.
    pub async fn bootstrap_default_definitions(&self) -> ServiceResult<()> {
        if self
            .step_definitions
            .find_by_operation_name("login")
            .await?
            .is_empty()
        {
            for definition in default_login_definitions() {
                self.step_definitions.save(definition).await?;
            }
            info!(operation_name = "login", "default step definitions seeded");
        }
        if self
            .step_definitions
            .find_by_operation_name("authorize_payment")
            .await?
            .is_empty()
        {
            for definition in default_payment_definitions() {
                self.step_definitions.save(definition).await?;
            }
            info!(
                operation_name = "authorize_payment",
                "default step definitions seeded"
            );
        }
        Ok(())
    }
}

fn definition(
    id: u64,
    operation_name: &str,
    operation_type: StepRequestType,
    request_auth_method: Option<AuthMethod>,
    request_auth_step_result: Option<AuthStepResult>,
    response_priority: u32,
    response_auth_method: Option<AuthMethod>,
    response_result: AuthResult,
) -> StepDefinition {
    StepDefinition {
        step_definition_id: id,
        operation_name: operation_name.to_string(),
        operation_type,
        request_auth_method,
        request_auth_step_result,
        response_priority,
        response_auth_method,
        response_result,
    }
}

/// Username/password login: one form step, confirmed means done.
fn default_login_definitions() -> Vec<StepDefinition> {
    use AuthMethod::*;
    use AuthResult::*;
    use AuthStepResult::*;
    use StepRequestType::*;
    vec![
        definition(
            1,
            "login",
            Create,
            None,
            None,
            1,
            Some(UsernamePasswordAuth),
            Continue,
        ),
        definition(
            2,
            "login",
            Update,
            Some(UsernamePasswordAuth),
            Some(Confirmed),
            1,
            None,
            Done,
        ),
        definition(
            3,
            "login",
            Update,
            Some(UsernamePasswordAuth),
            Some(AuthMethodFailed),
            1,
            None,
            Failed,
        ),
        definition(
            4,
            "login",
            Update,
            Some(UsernamePasswordAuth),
            Some(Canceled),
            1,
            None,
            Failed,
        ),
    ]
}

/// Payment authorization: SMS key or mobile token, either confirms the
/// payment.
fn default_payment_definitions() -> Vec<StepDefinition> {
    use AuthMethod::*;
    use AuthResult::*;
    use AuthStepResult::*;
    use StepRequestType::*;
    vec![
        definition(
            1,
            "authorize_payment",
            Create,
            None,
            None,
            1,
            Some(SmsKey),
            Continue,
        ),
        definition(
            2,
            "authorize_payment",
            Create,
            None,
            None,
            2,
            Some(MobileToken),
            Continue,
        ),
        definition(
            3,
            "authorize_payment",
            Update,
            Some(SmsKey),
            Some(Confirmed),
            1,
            None,
            Done,
        ),
        definition(
            4,
            "authorize_payment",
            Update,
            Some(SmsKey),
            Some(AuthMethodFailed),
            1,
            None,
            Failed,
        ),
        definition(
            5,
            "authorize_payment",
            Update,
            Some(SmsKey),
            Some(Canceled),
            1,
            None,
            Failed,
        ),
        definition(
            6,
            "authorize_payment",
            Update,
            Some(MobileToken),
            Some(Confirmed),
            1,
            None,
            Done,
        ),
        definition(
            7,
            "authorize_payment",
            Update,
            Some(MobileToken),
            Some(AuthMethodFailed),
            1,
            None,
            Failed,
        ),
        definition(
            8,
            "authorize_payment",
            Update,
            Some(MobileToken),
            Some(Canceled),
            1,
            None,
            Failed,
        ),
    ]
}
