//! Engine configuration.

use rust_decimal::Decimal;

/// Tunables for the proposal engine, composed once at process startup and
/// passed into the orchestrator.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Platform service fee applied on top of summed role amounts.
    pub service_fee_rate: Decimal,

    /// Floor for a role line's effective amount (fair pricing policy).
    pub min_role_amount: Decimal,

    /// Deliverables must be due at least this many days before the gig's
    /// end date.
    pub deliverable_cutoff_days: i64,

    /// Navigation target for the subscription-required redirect hint.
    pub subscription_redirect: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            service_fee_rate: Decimal::new(5, 2), // 5%
            min_role_amount: Decimal::new(50, 0),
            deliverable_cutoff_days: 3,
            subscription_redirect: "/payments/onboarding".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = EngineConfig::default();
        assert_eq!(config.service_fee_rate, Decimal::new(5, 2));
        assert_eq!(config.min_role_amount, Decimal::new(50, 0));
        assert_eq!(config.deliverable_cutoff_days, 3);
        assert!(!config.subscription_redirect.is_empty());
    }
}
