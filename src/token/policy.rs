use std::time::Duration;

use crate::errors::Error;

use super::TokenClaims;

/// Business rules deciding when a cached token must be replaced.
#[derive(Clone, Debug)]
pub struct RefreshPolicy {
    /// Share of the total lifetime that must remain for a token to be served.
    pub refresh_fraction: f64,
    /// Minimum remaining time for tokens that carry no `iat` claim.
    pub absolute_buffer: Duration,
}

impl RefreshPolicy {
    pub fn new(refresh_fraction: f64, absolute_buffer: Duration) -> Result<Self, Error> {
        if !(refresh_fraction > 0.0 && refresh_fraction < 1.0) {
            return Err(Error::Config(
                "Refresh fraction must be between 0 and 1 (exclusive)".into(),
            ));
        }
        if absolute_buffer.is_zero() {
            return Err(Error::Config("Absolute refresh buffer must be > 0".into()));
        }
        Ok(Self {
            refresh_fraction,
            absolute_buffer,
        })
    }

    /// True once less than `refresh_fraction` of the lifetime remains, or,
    /// without `iat`, once less than `absolute_buffer` remains.
    pub fn is_expiring(&self, claims: &TokenClaims, now: i64) -> bool {
        let remaining = claims.remaining(now);
        match claims.lifetime() {
            Some(lifetime) if lifetime <= 0 => true,
            Some(lifetime) => (remaining as f64) < (lifetime as f64) * self.refresh_fraction,
            None => remaining < self.absolute_buffer.as_secs() as i64,
        }
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            refresh_fraction: 0.1,
            absolute_buffer: Duration::from_secs(3600),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(iat: Option<i64>, exp: i64) -> TokenClaims {
        TokenClaims {
            issued_at: iat,
            expires_at: exp,
        }
    }

    #[test]
    fn relative_policy_refreshes_after_ninety_percent_elapsed() {
        let policy = RefreshPolicy::default();
        let token = claims(Some(0), 1000);
        assert!(!policy.is_expiring(&token, 0));
        assert!(!policy.is_expiring(&token, 899));
        assert!(!policy.is_expiring(&token, 900));
        assert!(policy.is_expiring(&token, 901));
        assert!(policy.is_expiring(&token, 2000));
    }

    #[test]
    fn absolute_fallback_without_issued_at() {
        let policy = RefreshPolicy::default();
        let token = claims(None, 10_000);
        assert!(!policy.is_expiring(&token, 10_000 - 3600));
        assert!(policy.is_expiring(&token, 10_000 - 3599));
    }

    #[test]
    fn non_positive_lifetime_is_always_expiring() {
        let policy = RefreshPolicy::default();
        assert!(policy.is_expiring(&claims(Some(50), 50), 0));
        assert!(policy.is_expiring(&claims(Some(60), 50), 0));
    }

    #[test]
    fn extreme_claims_do_not_overflow() {
        let policy = RefreshPolicy::default();
        assert!(!policy.is_expiring(&claims(Some(i64::MIN), i64::MAX), 0));
        assert!(policy.is_expiring(&claims(None, i64::MIN), 1));
        assert!(policy.is_expiring(&claims(Some(i64::MAX), i64::MIN), 0));
    }

    #[test]
    fn rejects_out_of_range_settings() {
        assert!(matches!(
            RefreshPolicy::new(0.0, Duration::from_secs(1)),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            RefreshPolicy::new(1.0, Duration::from_secs(1)),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            RefreshPolicy::new(0.2, Duration::ZERO),
            Err(Error::Config(_))
        ));
        assert!(RefreshPolicy::new(0.2, Duration::from_secs(60)).is_ok());
    }
}
