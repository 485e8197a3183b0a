//! OTP definitions and OTP issuance.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::Rng;
use tracing::info;

use crate::models::{Otp, OtpDefinition, OtpStatus};
use crate::store::{OperationRepository, OtpDefinitionRepository, OtpRepository};

use super::error::{NextStepError, ServiceResult};

pub struct OtpService {
    definitions: Arc<dyn OtpDefinitionRepository>,
    otps: Arc<dyn OtpRepository>,
    operations: Arc<dyn OperationRepository>,
}

impl OtpService {
    pub fn new(
        definitions: Arc<dyn OtpDefinitionRepository>,
        otps: Arc<dyn OtpRepository>,
        operations: Arc<dyn OperationRepository>,
    ) -> Self {
        Self {
            definitions,
            otps,
            operations,
        }
    }

    pub async fn create_definition(
        &self,
        name: String,
        organization_id: String,
        length: u32,
        attempt_limit: Option<u32>,
        expiration_seconds: Option<i64>,
    ) -> ServiceResult<OtpDefinition> {
        if self.definitions.get(&name).await?.is_some() {
            return Err(NextStepError::OtpDefinitionAlreadyExists(name));
        }
        let definition = OtpDefinition {
            name,
            organization_id,
            length,
            attempt_limit,
            expiration_seconds,
            active: true,
            timestamp_created: Utc::now(),
        };
        self.definitions.save(definition.clone()).await?;
        info!(name = %definition.name, "otp definition created");
        Ok(definition)
    }

    pub async fn get_definition(&self, name: &str) -> ServiceResult<OtpDefinition> {
        self.definitions
            .get(name)
            .await?
            .ok_or_else(|| NextStepError::OtpDefinitionNotFound(name.to_string()))
    }

    pub async fn list_definitions(&self) -> ServiceResult<Vec<OtpDefinition>> {
        Ok(self.definitions.list().await?)
    }

    pub async fn delete_definition(&self, name: &str) -> ServiceResult<()> {
        if !self.definitions.delete(name).await? {
            return Err(NextStepError::OtpDefinitionNotFound(name.to_string()));
        }
        info!(name, "otp definition deleted");
        Ok(())
    }

    /// Generates an OTP. The seed data comes from the request, falling back
    /// to the operation data when the OTP is bound to an operation.
    pub async fn create_otp(
        &self,
        otp_name: String,
        user_id: Option<String>,
        operation_id: Option<String>,
        otp_data: Option<String>,
    ) -> ServiceResult<Otp> {
        let definition = self.get_definition(&otp_name).await?;
        if !definition.active {
            return Err(NextStepError::OtpDefinitionNotFound(format!(
                "otp definition is not active: {}",
                otp_name
            )));
        }

        let otp_data = match otp_data {
            Some(data) => data,
            None => match &operation_id {
                Some(operation_id) => self
                    .operations
                    .get(operation_id)
                    .await?
                    .ok_or_else(|| NextStepError::OperationNotFound(operation_id.clone()))?
                    .operation_data,
                None => {
                    return Err(NextStepError::InvalidRequest(
                        "OTP data is not available".to_string(),
                    ))
                }
            },
        };

        let value = generate_otp_value(definition.length);
        let timestamp_expires = definition
            .expiration_seconds
            .map(|seconds| Utc::now() + Duration::seconds(seconds));
        let otp = Otp::new(
            otp_name,
            user_id,
            operation_id,
            otp_data,
            value,
            timestamp_expires,
        );
        self.otps.save(otp.clone()).await?;
        info!(otp_id = %otp.otp_id, otp_name = %otp.otp_name, "otp created");
        Ok(otp)
    }

    pub async fn get_otp(&self, otp_id: &str) -> ServiceResult<Otp> {
        self.otps
            .get(otp_id)
            .await?
            .ok_or_else(|| NextStepError::OtpNotFound(otp_id.to_string()))
    }

    /// Latest OTP issued for an operation.
    pub async fn get_otp_for_operation(&self, operation_id: &str) -> ServiceResult<Otp> {
        self.otps
            .find_latest_by_operation(operation_id)
            .await?
            .ok_or_else(|| {
                NextStepError::OtpNotFound(format!("no OTP for operation: {}", operation_id))
            })
    }

    /// Loads an OTP for verification, expiring it first when its deadline
    /// passed.
    pub(crate) async fn get_active_otp(&self, otp_id: &str) -> ServiceResult<Otp> {
        let mut otp = self.get_otp(otp_id).await?;
        if otp.status == OtpStatus::Active && otp.is_expired(Utc::now()) {
            otp.status = OtpStatus::Expired;
            self.otps.save(otp.clone()).await?;
        }
        if otp.status != OtpStatus::Active {
            return Err(NextStepError::OtpNotActive(format!(
                "otp {} has status {:?}",
                otp.otp_id, otp.status
            )));
        }
        Ok(otp)
    }

    pub(crate) async fn persist(&self, otp: Otp) -> ServiceResult<()> {
        self.otps.save(otp).await?;
        Ok(())
    }
}

fn generate_otp_value(length: u32) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_value_has_requested_length_and_digits_only() {
        for length in [4, 6, 8] {
            let value = generate_otp_value(length);
            assert_eq!(value.len(), length as usize);
            assert!(value.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
