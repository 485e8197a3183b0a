pub mod auth_method;
pub mod authentication;
pub mod credential;
pub mod operation;
pub mod organization;
pub mod otp;
pub mod step_definition;
pub mod user;

pub use auth_method::AuthMethod;
pub use authentication::{AuthenticationRecord, AuthenticationResult, AuthenticationType};
pub use credential::{Credential, CredentialDefinition, CredentialStatus};
pub use operation::{
    ApplicationContext, AuthResult, AuthStep, AuthStepResult, Operation, OperationCancelReason,
    OperationHistoryEntry, UserAccountStatus,
};
pub use organization::Organization;
pub use otp::{Otp, OtpDefinition, OtpStatus};
pub use step_definition::{OperationConfig, OperationMethodConfig, StepDefinition, StepRequestType};
pub use user::{UserIdentity, UserIdentityStatus};
