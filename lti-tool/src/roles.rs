//! Role vocabulary and the pluggable role mapper.

/// LIS membership role URIs recognized as "learner".
///
/// The bare short names are included because some platforms still emit
/// them in place of the full vocabulary URIs.
pub const LEARNER_ROLES: &[&str] = &[
    "http://purl.imsglobal.org/vocab/lis/v2/membership#Learner",
    "http://purl.imsglobal.org/vocab/lis/v2/institution/person#Student",
    "Learner",
];

/// LIS membership role URIs recognized as "instructor".
pub const INSTRUCTOR_ROLES: &[&str] = &[
    "http://purl.imsglobal.org/vocab/lis/v2/membership#Instructor",
    "http://purl.imsglobal.org/vocab/lis/v2/institution/person#Instructor",
    "http://purl.imsglobal.org/vocab/lis/v2/institution/person#Faculty",
    "Instructor",
];

/// Whether any of the claim's roles is a recognized learner role.
pub fn has_learner_role<'a>(roles: impl IntoIterator<Item = &'a str>) -> bool {
    roles.into_iter().any(|r| LEARNER_ROLES.contains(&r))
}

/// Whether any of the claim's roles is a recognized instructor role.
pub fn has_instructor_role<'a>(roles: impl IntoIterator<Item = &'a str>) -> bool {
    roles.into_iter().any(|r| INSTRUCTOR_ROLES.contains(&r))
}

/// Maps launch role labels to whatever authority vocabulary the host
/// authorization layer speaks.
pub trait RoleMapper: Send + Sync {
    /// Map role labels to granted-authority strings.
    fn map(&self, roles: &[String]) -> Vec<String>;
}

/// Default mapper: labels pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityRoleMapper;

impl RoleMapper for IdentityRoleMapper {
    fn map(&self, roles: &[String]) -> Vec<String> {
        roles.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_learner_uri_recognized() {
        assert!(has_learner_role([
            "http://purl.imsglobal.org/vocab/lis/v2/membership#Learner"
        ]));
        assert!(!has_instructor_role([
            "http://purl.imsglobal.org/vocab/lis/v2/membership#Learner"
        ]));
    }

    #[test]
    fn test_instructor_uri_recognized() {
        assert!(has_instructor_role([
            "http://purl.imsglobal.org/vocab/lis/v2/membership#Instructor"
        ]));
        assert!(!has_learner_role([
            "http://purl.imsglobal.org/vocab/lis/v2/membership#Instructor"
        ]));
    }

    #[test]
    fn test_unrecognized_roles_match_nothing() {
        let roles = ["http://purl.imsglobal.org/vocab/lis/v2/membership#Mentor"];
        assert!(!has_learner_role(roles));
        assert!(!has_instructor_role(roles));
    }

    #[test]
    fn test_identity_mapper_passes_through() {
        let mapper = IdentityRoleMapper;
        let roles = vec!["USER".to_string(), "LEARNER".to_string()];
        assert_eq!(mapper.map(&roles), roles);
    }
}
