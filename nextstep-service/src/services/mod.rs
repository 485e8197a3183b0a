//! Business services.

pub mod attempt_limit;
pub mod authentication;
pub mod credential;
pub mod error;
pub mod operation;
pub mod organization;
pub mod otp;
pub mod step_definition;
pub mod step_resolution;
pub mod user;

pub use attempt_limit::RemainingAttempts;
pub use authentication::{
    AuthenticationOutcome, AuthenticationService, CombinedAuthInput, CredentialAuthInput,
    CredentialValueValidator, OtpAuthInput, PlaintextValueValidator,
};
pub use credential::CredentialService;
pub use error::{NextStepError, ServiceResult};
pub use operation::{
    CreateOperationInput, OperationDefaults, OperationService, UpdateOperationInput,
};
pub use organization::OrganizationService;
pub use otp::OtpService;
pub use step_definition::StepDefinitionService;
pub use user::UserService;
