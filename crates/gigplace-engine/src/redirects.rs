//! Redirect mapper.
//!
//! Translates a small subset of failure codes into a navigation target the
//! interface layer can send the user to. Everything else resolves to no
//! redirect, so callers can decide uniformly between an inline message and
//! a redirect.

use crate::codes::PolicyFailure;
use crate::config::EngineConfig;

/// Navigation target for a failure code, if one exists.
///
/// Currently only the subscription prerequisite maps anywhere: the user can
/// resolve it on the payment page. No other code carries a redirect.
pub fn redirect_for(code: &str, config: &EngineConfig) -> Option<String> {
    if code == PolicyFailure::SUBSCRIPTION_REQUIRED.code {
        Some(config.subscription_redirect.clone())
    } else {
        None
    }
}
