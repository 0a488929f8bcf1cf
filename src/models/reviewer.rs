//! Reviewer identity and role capability.
//!
//! The current reviewer is passed explicitly into the orchestrator rather
//! than read from ambient state, so decision rules can be exercised
//! without a running console.

use serde::{Deserialize, Serialize};

/// Staff and user roles known to the console.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// System administrator.
    Admin,
    /// Center manager.
    Manager,
    /// Head of a center.
    CenterHead,
    /// Subject leader (curriculum owner).
    SubjectLeader,
    /// Academic affairs staff, the primary request reviewers.
    AcademicAffairs,
    /// Teacher.
    Teacher,
    /// Student.
    Student,
}

impl Role {
    /// Whether this role may approve or reject teacher requests.
    #[must_use]
    pub const fn can_decide_requests(self) -> bool {
        matches!(
            self,
            Self::Admin | Self::Manager | Self::CenterHead | Self::AcademicAffairs
        )
    }
}

/// The signed-in reviewer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ReviewerContext {
    /// Staff user id.
    pub user_id: i64,
    /// Name shown in decision notices.
    pub display_name: String,
    /// Granted roles.
    pub roles: Vec<Role>,
}

impl ReviewerContext {
    /// Whether any granted role may decide teacher requests.
    #[must_use]
    pub fn can_decide_requests(&self) -> bool {
        self.roles.iter().any(|role| role.can_decide_requests())
    }
}
