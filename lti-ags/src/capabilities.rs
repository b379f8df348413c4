//! The AGS capability set, derived from the platform's scope grant.

use serde::{Deserialize, Serialize};

/// AGS scope URI granting full line-item management.
pub const SCOPE_LINE_ITEM: &str = "https://purl.imsglobal.org/spec/lti-ags/scope/lineitem";
/// AGS scope URI granting read-only line-item access.
pub const SCOPE_LINE_ITEM_READONLY: &str =
    "https://purl.imsglobal.org/spec/lti-ags/scope/lineitem.readonly";
/// AGS scope URI granting result (grade) reads.
pub const SCOPE_RESULT_READONLY: &str =
    "https://purl.imsglobal.org/spec/lti-ags/scope/result.readonly";
/// AGS scope URI granting score publication.
pub const SCOPE_SCORE: &str = "https://purl.imsglobal.org/spec/lti-ags/scope/score";

/// What the platform granted this deployment, out-of-band via the OAuth2
/// scope grant. Every client operation checks its flag before touching
/// the network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgsCapabilities {
    /// May read results for a line item.
    pub can_read_grades: bool,
    /// May read line items.
    pub can_read_line_items: bool,
    /// May create, update and delete line items.
    pub can_manage_line_items: bool,
    /// May publish scores.
    pub can_score: bool,
}

impl AgsCapabilities {
    /// Every capability granted.
    pub fn all() -> Self {
        Self {
            can_read_grades: true,
            can_read_line_items: true,
            can_manage_line_items: true,
            can_score: true,
        }
    }

    /// Nothing granted.
    pub fn none() -> Self {
        Self::default()
    }

    /// Derive the capability set from granted AGS scope URIs.
    ///
    /// The full `lineitem` scope implies read access; `lineitem.readonly`
    /// grants reads only.
    pub fn from_scopes<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut caps = Self::none();
        for scope in scopes {
            match scope.as_ref() {
                SCOPE_LINE_ITEM => {
                    caps.can_manage_line_items = true;
                    caps.can_read_line_items = true;
                }
                SCOPE_LINE_ITEM_READONLY => caps.can_read_line_items = true,
                SCOPE_RESULT_READONLY => caps.can_read_grades = true,
                SCOPE_SCORE => caps.can_score = true,
                _ => {}
            }
        }
        caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_scopes_maps_each_grant() {
        let caps = AgsCapabilities::from_scopes([SCOPE_RESULT_READONLY, SCOPE_SCORE]);
        assert!(caps.can_read_grades);
        assert!(caps.can_score);
        assert!(!caps.can_read_line_items);
        assert!(!caps.can_manage_line_items);
    }

    #[test]
    fn test_full_lineitem_scope_implies_read() {
        let caps = AgsCapabilities::from_scopes([SCOPE_LINE_ITEM]);
        assert!(caps.can_manage_line_items);
        assert!(caps.can_read_line_items);
    }

    #[test]
    fn test_unknown_scopes_grant_nothing() {
        let caps = AgsCapabilities::from_scopes(["openid", "profile"]);
        assert_eq!(caps, AgsCapabilities::none());
    }
}
