//! Step-resolution engine.
//!
//! Resolution is a pure function over the ordered step definitions for an
//! operation name. The same definitions and the same input always produce the
//! same outcome.

use std::collections::HashSet;

use crate::models::{AuthMethod, AuthResult, AuthStep, AuthStepResult, StepDefinition};

use super::error::{NextStepError, ServiceResult};

/// Input to one resolution round.
#[derive(Debug, Clone, Copy)]
pub enum StepInput {
    /// Operation creation; matches CREATE definitions.
    Create,
    /// A completed step; matches UPDATE definitions keyed on the finished
    /// method and its result.
    Update {
        auth_method: AuthMethod,
        step_result: AuthStepResult,
    },
}

/// Outcome of one resolution round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResolution {
    pub result: AuthResult,
    /// Candidate next steps in priority order; empty when the operation
    /// reached a terminal result.
    pub steps: Vec<AuthStep>,
}

/// Resolves the next steps for an operation from its step definitions.
///
/// Matching definitions are taken in ascending response priority. A FAILED
/// response in any matching definition dominates the overall result.
/// Duplicate candidate methods keep their first (highest-priority) position.
pub fn resolve(definitions: &[StepDefinition], input: StepInput) -> ServiceResult<StepResolution> {
    let mut matching: Vec<&StepDefinition> = definitions
        .iter()
        .filter(|d| match input {
            StepInput::Create => d.matches_create(),
            StepInput::Update {
                auth_method,
                step_result,
            } => d.matches_update(auth_method, step_result),
        })
        .collect();

    if matching.is_empty() {
        return Err(NextStepError::InvalidConfiguration(format!(
            "no step definition matches input {:?}",
            input
        )));
    }

    // Stable sort keeps definition order for equal priorities.
    matching.sort_by_key(|d| d.response_priority);

    if matching
        .iter()
        .any(|d| d.response_result == AuthResult::Failed)
    {
        return Ok(StepResolution {
            result: AuthResult::Failed,
            steps: Vec::new(),
        });
    }

    let result = if matching
        .iter()
        .all(|d| d.response_result == AuthResult::Done)
    {
        AuthResult::Done
    } else {
        AuthResult::Continue
    };

    let mut seen = HashSet::new();
    let steps: Vec<AuthStep> = matching
        .iter()
        .filter(|d| d.response_result == AuthResult::Continue)
        .filter_map(|d| d.response_auth_method)
        .filter(|m| seen.insert(*m))
        .map(AuthStep::new)
        .collect();

    // A CONTINUE result with no eligible next method would stall the
    // operation forever.
    if result == AuthResult::Continue && steps.is_empty() {
        return Err(NextStepError::InvalidConfiguration(format!(
            "resolution for input {:?} continues with no next step",
            input
        )));
    }

    Ok(StepResolution { result, steps })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StepRequestType;

    fn create_def(priority: u32, method: Option<AuthMethod>, result: AuthResult) -> StepDefinition {
        StepDefinition {
            step_definition_id: priority as u64,
            operation_name: "login".to_string(),
            operation_type: StepRequestType::Create,
            request_auth_method: None,
            request_auth_step_result: None,
            response_priority: priority,
            response_auth_method: method,
            response_result: result,
        }
    }

    fn update_def(
        id: u64,
        request_method: AuthMethod,
        request_result: AuthStepResult,
        priority: u32,
        method: Option<AuthMethod>,
        result: AuthResult,
    ) -> StepDefinition {
        StepDefinition {
            step_definition_id: id,
            operation_name: "login".to_string(),
            operation_type: StepRequestType::Update,
            request_auth_method: Some(request_method),
            request_auth_step_result: Some(request_result),
            response_priority: priority,
            response_auth_method: method,
            response_result: result,
        }
    }

    #[test]
    fn create_resolves_ordered_candidates() {
        let definitions = vec![
            create_def(2, Some(AuthMethod::MobileToken), AuthResult::Continue),
            create_def(1, Some(AuthMethod::SmsKey), AuthResult::Continue),
        ];
        let resolution = resolve(&definitions, StepInput::Create).unwrap();
        assert_eq!(resolution.result, AuthResult::Continue);
        assert_eq!(
            resolution.steps,
            vec![
                AuthStep::new(AuthMethod::SmsKey),
                AuthStep::new(AuthMethod::MobileToken)
            ]
        );
    }

    #[test]
    fn failed_definition_dominates() {
        let definitions = vec![
            update_def(
                1,
                AuthMethod::SmsKey,
                AuthStepResult::AuthMethodFailed,
                1,
                Some(AuthMethod::MobileToken),
                AuthResult::Continue,
            ),
            update_def(
                2,
                AuthMethod::SmsKey,
                AuthStepResult::AuthMethodFailed,
                2,
                None,
                AuthResult::Failed,
            ),
        ];
        let resolution = resolve(
            &definitions,
            StepInput::Update {
                auth_method: AuthMethod::SmsKey,
                step_result: AuthStepResult::AuthMethodFailed,
            },
        )
        .unwrap();
        assert_eq!(resolution.result, AuthResult::Failed);
        assert!(resolution.steps.is_empty());
    }

    #[test]
    fn confirmed_final_step_resolves_done() {
        let definitions = vec![update_def(
            1,
            AuthMethod::UsernamePasswordAuth,
            AuthStepResult::Confirmed,
            1,
            None,
            AuthResult::Done,
        )];
        let resolution = resolve(
            &definitions,
            StepInput::Update {
                auth_method: AuthMethod::UsernamePasswordAuth,
                step_result: AuthStepResult::Confirmed,
            },
        )
        .unwrap();
        assert_eq!(resolution.result, AuthResult::Done);
        assert!(resolution.steps.is_empty());
    }

    #[test]
    fn unmatched_input_is_configuration_error() {
        let definitions = vec![create_def(
            1,
            Some(AuthMethod::SmsKey),
            AuthResult::Continue,
        )];
        let err = resolve(
            &definitions,
            StepInput::Update {
                auth_method: AuthMethod::SmsKey,
                step_result: AuthStepResult::Confirmed,
            },
        )
        .unwrap_err();
        assert!(matches!(err, NextStepError::InvalidConfiguration(_)));
    }

    #[test]
    fn continue_without_candidates_is_configuration_error() {
        let definitions = vec![create_def(1, None, AuthResult::Continue)];
        let err = resolve(&definitions, StepInput::Create).unwrap_err();
        assert!(matches!(err, NextStepError::InvalidConfiguration(_)));
    }

    #[test]
    fn duplicate_candidates_keep_first_position() {
        let definitions = vec![
            create_def(1, Some(AuthMethod::SmsKey), AuthResult::Continue),
            create_def(2, Some(AuthMethod::MobileToken), AuthResult::Continue),
            create_def(3, Some(AuthMethod::SmsKey), AuthResult::Continue),
        ];
        let resolution = resolve(&definitions, StepInput::Create).unwrap();
        assert_eq!(
            resolution.steps,
            vec![
                AuthStep::new(AuthMethod::SmsKey),
                AuthStep::new(AuthMethod::MobileToken)
            ]
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let definitions = vec![
            create_def(1, Some(AuthMethod::SmsKey), AuthResult::Continue),
            create_def(2, Some(AuthMethod::MobileToken), AuthResult::Continue),
        ];
        let first = resolve(&definitions, StepInput::Create).unwrap();
        for _ in 0..10 {
            assert_eq!(resolve(&definitions, StepInput::Create).unwrap(), first);
        }
    }
}
