//! Attempt counting and lockout transitions for credentials and OTPs.

use crate::models::{Credential, CredentialDefinition, CredentialStatus, Otp, OtpStatus};

/// Attempts left before lockout. Definitions without a limit report
/// `NoLimit` rather than a large sentinel number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainingAttempts {
    NoLimit,
    Count(u32),
}

impl RemainingAttempts {
    pub fn from_limit(limit: Option<u32>, failed: u32) -> Self {
        match limit {
            Some(limit) => RemainingAttempts::Count(limit.saturating_sub(failed)),
            None => RemainingAttempts::NoLimit,
        }
    }

    /// The tighter of two remaining-attempt values.
    pub fn min_with(self, other: RemainingAttempts) -> RemainingAttempts {
        match (self, other) {
            (RemainingAttempts::NoLimit, other) => other,
            (this, RemainingAttempts::NoLimit) => this,
            (RemainingAttempts::Count(a), RemainingAttempts::Count(b)) => {
                RemainingAttempts::Count(a.min(b))
            }
        }
    }

    pub fn is_exhausted(self) -> bool {
        matches!(self, RemainingAttempts::Count(0))
    }

    /// Count for response payloads; `None` means unlimited.
    pub fn as_option(self) -> Option<u32> {
        match self {
            RemainingAttempts::NoLimit => None,
            RemainingAttempts::Count(count) => Some(count),
        }
    }
}

/// Result of recording one authentication attempt against a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptOutcome {
    pub remaining: RemainingAttempts,
    /// Status the credential transitioned to during this attempt, if any.
    pub lockout: Option<CredentialStatus>,
}

/// Remaining attempts before the credential hits its hard limit.
pub fn remaining_credential_attempts(
    credential: &Credential,
    definition: &CredentialDefinition,
) -> RemainingAttempts {
    RemainingAttempts::from_limit(definition.limit_hard, credential.failed_attempt_counter_hard)
}

/// Records one authentication attempt and applies lockout transitions.
///
/// Success resets both failed counters but never unblocks. Failure bumps the
/// counters and blocks the credential when a limit is reached; the hard limit
/// dominates when both trip on the same attempt. The soft counter only drives
/// a transition out of ACTIVE, so a temporary block is never downgraded and a
/// permanent block is never overwritten by a later soft trip.
pub fn record_credential_attempt(
    credential: &mut Credential,
    definition: &CredentialDefinition,
    success: bool,
) -> AttemptOutcome {
    credential.attempt_counter += 1;

    if success {
        credential.reset_counters();
        return AttemptOutcome {
            remaining: remaining_credential_attempts(credential, definition),
            lockout: None,
        };
    }

    credential.failed_attempt_counter_soft += 1;
    credential.failed_attempt_counter_hard += 1;

    let mut lockout = None;
    if let Some(hard) = definition.limit_hard {
        if credential.failed_attempt_counter_hard >= hard
            && credential.status != CredentialStatus::BlockedPermanent
        {
            credential.status = CredentialStatus::BlockedPermanent;
            lockout = Some(CredentialStatus::BlockedPermanent);
        }
    }
    if lockout.is_none() {
        if let Some(soft) = definition.limit_soft {
            if credential.failed_attempt_counter_soft >= soft
                && credential.status == CredentialStatus::Active
            {
                credential.status = CredentialStatus::BlockedTemporary;
                lockout = Some(CredentialStatus::BlockedTemporary);
            }
        }
    }

    AttemptOutcome {
        remaining: remaining_credential_attempts(credential, definition),
        lockout,
    }
}

/// Remaining attempts before the OTP is blocked.
pub fn remaining_otp_attempts(otp: &Otp, attempt_limit: Option<u32>) -> RemainingAttempts {
    RemainingAttempts::from_limit(attempt_limit, otp.failed_attempt_counter)
}

/// Records one verification attempt against an OTP.
///
/// A successful attempt marks the OTP USED. A failed attempt bumps the
/// counter and blocks the OTP once the limit is reached.
pub fn record_otp_attempt(
    otp: &mut Otp,
    attempt_limit: Option<u32>,
    success: bool,
) -> RemainingAttempts {
    otp.attempt_counter += 1;

    if success {
        otp.status = OtpStatus::Used;
        return remaining_otp_attempts(otp, attempt_limit);
    }

    otp.failed_attempt_counter += 1;
    if let Some(limit) = attempt_limit {
        if otp.failed_attempt_counter >= limit && otp.status == OtpStatus::Active {
            otp.status = OtpStatus::Blocked;
        }
    }
    remaining_otp_attempts(otp, attempt_limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn definition(limit_soft: Option<u32>, limit_hard: Option<u32>) -> CredentialDefinition {
        CredentialDefinition {
            name: "PASSWORD".to_string(),
            organization_id: "RETAIL".to_string(),
            description: None,
            limit_soft,
            limit_hard,
            active: true,
            timestamp_created: Utc::now(),
        }
    }

    fn credential() -> Credential {
        Credential::new(
            "PASSWORD".to_string(),
            "user-1".to_string(),
            "s3cret".to_string(),
        )
    }

    #[test]
    fn soft_limit_blocks_temporarily() {
        let definition = definition(Some(2), Some(5));
        let mut credential = credential();

        let first = record_credential_attempt(&mut credential, &definition, false);
        assert_eq!(first.lockout, None);
        assert_eq!(credential.status, CredentialStatus::Active);

        let second = record_credential_attempt(&mut credential, &definition, false);
        assert_eq!(second.lockout, Some(CredentialStatus::BlockedTemporary));
        assert_eq!(credential.status, CredentialStatus::BlockedTemporary);
        assert_eq!(second.remaining, RemainingAttempts::Count(3));
    }

    #[test]
    fn hard_limit_blocks_permanently() {
        let definition = definition(Some(1), Some(3));
        let mut credential = credential();

        for _ in 0..2 {
            record_credential_attempt(&mut credential, &definition, false);
        }
        assert_eq!(credential.status, CredentialStatus::BlockedTemporary);

        let third = record_credential_attempt(&mut credential, &definition, false);
        assert_eq!(third.lockout, Some(CredentialStatus::BlockedPermanent));
        assert_eq!(credential.status, CredentialStatus::BlockedPermanent);
        assert!(third.remaining.is_exhausted());
    }

    #[test]
    fn hard_limit_dominates_when_both_trip() {
        let definition = definition(Some(1), Some(1));
        let mut credential = credential();

        let outcome = record_credential_attempt(&mut credential, &definition, false);
        assert_eq!(outcome.lockout, Some(CredentialStatus::BlockedPermanent));
    }

    #[test]
    fn success_resets_counters_but_never_unblocks() {
        let definition = definition(Some(2), Some(5));
        let mut credential = credential();

        record_credential_attempt(&mut credential, &definition, false);
        record_credential_attempt(&mut credential, &definition, false);
        assert_eq!(credential.status, CredentialStatus::BlockedTemporary);

        let outcome = record_credential_attempt(&mut credential, &definition, true);
        assert_eq!(credential.failed_attempt_counter_soft, 0);
        assert_eq!(credential.failed_attempt_counter_hard, 0);
        assert_eq!(credential.status, CredentialStatus::BlockedTemporary);
        assert_eq!(outcome.remaining, RemainingAttempts::Count(5));
    }

    #[test]
    fn no_limit_never_exhausts() {
        let definition = definition(None, None);
        let mut credential = credential();

        for _ in 0..50 {
            let outcome = record_credential_attempt(&mut credential, &definition, false);
            assert_eq!(outcome.remaining, RemainingAttempts::NoLimit);
            assert_eq!(outcome.lockout, None);
        }
        assert_eq!(credential.status, CredentialStatus::Active);
    }

    #[test]
    fn remaining_is_floored_at_zero() {
        assert_eq!(
            RemainingAttempts::from_limit(Some(3), 10),
            RemainingAttempts::Count(0)
        );
    }

    #[test]
    fn min_with_prefers_tighter_limit() {
        assert_eq!(
            RemainingAttempts::NoLimit.min_with(RemainingAttempts::Count(2)),
            RemainingAttempts::Count(2)
        );
        assert_eq!(
            RemainingAttempts::Count(4).min_with(RemainingAttempts::Count(2)),
            RemainingAttempts::Count(2)
        );
        assert_eq!(
            RemainingAttempts::NoLimit.min_with(RemainingAttempts::NoLimit),
            RemainingAttempts::NoLimit
        );
    }

    #[test]
    fn otp_attempts_block_at_limit() {
        let mut otp = Otp::new(
            "SMS_OTP".to_string(),
            Some("user-1".to_string()),
            None,
            "A1".to_string(),
            "12345678".to_string(),
            None,
        );
        assert_eq!(
            record_otp_attempt(&mut otp, Some(2), false),
            RemainingAttempts::Count(1)
        );
        assert_eq!(
            record_otp_attempt(&mut otp, Some(2), false),
            RemainingAttempts::Count(0)
        );
        assert_eq!(otp.status, OtpStatus::Blocked);
    }

    #[test]
    fn otp_success_marks_used() {
        let mut otp = Otp::new(
            "SMS_OTP".to_string(),
            Some("user-1".to_string()),
            None,
            "A1".to_string(),
            "12345678".to_string(),
            None,
        );
        record_otp_attempt(&mut otp, Some(3), true);
        assert_eq!(otp.status, OtpStatus::Used);
    }
}
