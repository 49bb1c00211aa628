//! Caller identity for role-gated operations
//!
//! Authentication happens upstream; by the time a request reaches the
//! services the caller is already verified. An [`Actor`] carries the
//! resolved user row's identity and role, and the services only authorize.

use crate::database::entities::users;
use crate::errors::{TrackerError, TrackerResult};

/// Directory role of a tracker user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Advisor,
    Coordinator,
}

impl Role {
    pub fn from_str(s: &str) -> TrackerResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "advisor" | "lecturer" => Ok(Role::Advisor),
            "coordinator" => Ok(Role::Coordinator),
            _ => Err(TrackerError::validation(format!("invalid role: {}", s))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Advisor => "advisor",
            Role::Coordinator => "coordinator",
        }
    }
}

/// A verified caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Actor {
    /// Build an actor from its directory row; fails on an unknown role value
    pub fn from_user(user: users::Model) -> TrackerResult<Self> {
        let role = Role::from_str(&user.role)?;
        Ok(Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role,
        })
    }

    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }

    pub fn is_advisor(&self) -> bool {
        self.role == Role::Advisor
    }

    pub fn is_coordinator(&self) -> bool {
        self.role == Role::Coordinator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_string() {
        assert_eq!(Role::from_str("student").unwrap(), Role::Student);
        assert_eq!(Role::from_str("ADVISOR").unwrap(), Role::Advisor);
        assert_eq!(Role::from_str("lecturer").unwrap(), Role::Advisor);
        assert_eq!(Role::from_str(" coordinator ").unwrap(), Role::Coordinator);
        assert!(Role::from_str("dean").is_err());
        assert!(Role::from_str("").is_err());
    }

    #[test]
    fn test_role_to_string() {
        assert_eq!(Role::Student.as_str(), "student");
        assert_eq!(Role::Advisor.as_str(), "advisor");
        assert_eq!(Role::Coordinator.as_str(), "coordinator");
    }

    #[test]
    fn test_actor_from_user_rejects_unknown_role() {
        let user = users::Model {
            id: 9,
            name: "Pat".to_string(),
            email: "pat@uni.edu".to_string(),
            role: "registrar".to_string(),
        };
        assert!(Actor::from_user(user).is_err());
    }
}
