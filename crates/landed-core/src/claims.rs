//! # Identity Claims
//!
//! Derives the access claims carried by a signed-in user's token from their
//! stored profile, and plans the update that keeps the two in sync.
//!
//! Profiles are edited by hand in a sheet, so every flag arrives loosely
//! typed (`1`, `"yes"`, `true`, `"FALSE"`, ...) and is coerced with
//! [`coerce_flag`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::coerce::{coerce_flag, normalize_key};

/// Stored user profile, keyed by email.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub role: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | boolean | string | null")]
    pub active: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | boolean | string | null")]
    pub can_see_price_gbp: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | boolean | string | null")]
    pub can_use_cart: Option<Value>,
}

/// Role carried in a token. Staff roles other than admin sign in as customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ClaimRole {
    Admin,
    #[default]
    Customer,
}

/// Claims attached to a user's token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppClaims {
    pub role: ClaimRole,
    pub active: bool,
    pub can_see_price_gbp: bool,
    pub can_use_cart: bool,
}

impl AppClaims {
    /// Claims for a user whose profile was removed.
    pub fn revoked() -> Self {
        Self {
            role: ClaimRole::Customer,
            active: false,
            can_see_price_gbp: false,
            can_use_cart: false,
        }
    }
}

/// A claims write for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClaimsUpdate {
    pub email: String,
    pub claims: AppClaims,
    /// Existing sessions must be ended; set whenever the account is inactive.
    pub revoke_sessions: bool,
}

/// Builds claims from a profile. A missing profile yields the defaults.
pub fn claims_from_profile(profile: Option<&UserProfile>) -> AppClaims {
    let role = match profile.map(|p| normalize_key(p.role.as_ref())).as_deref() {
        Some("admin") => ClaimRole::Admin,
        _ => ClaimRole::Customer,
    };

    AppClaims {
        role,
        active: coerce_flag(profile.and_then(|p| p.active.as_ref()), true),
        can_see_price_gbp: coerce_flag(profile.and_then(|p| p.can_see_price_gbp.as_ref()), false),
        can_use_cart: coerce_flag(profile.and_then(|p| p.can_use_cart.as_ref()), true),
    }
}

/// Plans the claims write after a profile was created, changed or deleted.
///
/// `profile` is the profile after the write; `None` means it was deleted.
/// Returns `None` when the email is blank.
pub fn plan_claims_sync(email: &str, profile: Option<&UserProfile>) -> Option<ClaimsUpdate> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return None;
    }

    let claims = match profile {
        Some(p) => claims_from_profile(Some(p)),
        None => AppClaims::revoked(),
    };

    Some(ClaimsUpdate {
        email,
        claims,
        revoke_sessions: !claims.active,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile(role: Value, active: Value, gbp: Value, cart: Value) -> UserProfile {
        UserProfile {
            role: Some(role),
            active: Some(active),
            can_see_price_gbp: Some(gbp),
            can_use_cart: Some(cart),
        }
    }

    #[test]
    fn test_defaults_for_empty_profile() {
        let claims = claims_from_profile(Some(&UserProfile::default()));
        assert_eq!(
            claims,
            AppClaims {
                role: ClaimRole::Customer,
                active: true,
                can_see_price_gbp: false,
                can_use_cart: true,
            }
        );
        assert_eq!(claims_from_profile(None), claims);
    }

    #[test]
    fn test_loose_flags() {
        let p = profile(json!(" Admin "), json!("YES"), json!(1), json!("0"));
        let claims = claims_from_profile(Some(&p));
        assert_eq!(claims.role, ClaimRole::Admin);
        assert!(claims.active);
        assert!(claims.can_see_price_gbp);
        assert!(!claims.can_use_cart);

        let p = profile(json!("ops"), json!(false), json!(2), json!("maybe"));
        let claims = claims_from_profile(Some(&p));
        assert_eq!(claims.role, ClaimRole::Customer);
        assert!(!claims.active);
        assert!(!claims.can_see_price_gbp);
        assert!(claims.can_use_cart);
    }

    #[test]
    fn test_sync_normalizes_email() {
        let update = plan_claims_sync("  Shop@Example.COM ", Some(&UserProfile::default())).unwrap();
        assert_eq!(update.email, "shop@example.com");
        assert!(!update.revoke_sessions);
    }

    #[test]
    fn test_sync_blank_email_is_skipped() {
        assert!(plan_claims_sync("   ", Some(&UserProfile::default())).is_none());
        assert!(plan_claims_sync("", None).is_none());
    }

    #[test]
    fn test_deleted_profile_revokes() {
        let update = plan_claims_sync("a@b.co", None).unwrap();
        assert_eq!(update.claims, AppClaims::revoked());
        assert!(update.revoke_sessions);
    }

    #[test]
    fn test_inactive_profile_revokes_sessions() {
        let p = UserProfile {
            active: Some(json!("no")),
            ..Default::default()
        };
        let update = plan_claims_sync("a@b.co", Some(&p)).unwrap();
        assert!(!update.claims.active);
        assert!(update.revoke_sessions);
    }

    #[test]
    fn test_profile_from_json() {
        let p: UserProfile =
            serde_json::from_value(json!({"role": "admin", "active": 1, "extra": "x"})).unwrap();
        assert_eq!(claims_from_profile(Some(&p)).role, ClaimRole::Admin);
    }
}
