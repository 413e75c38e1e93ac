//! Permission system for prayer operations

use crate::error::{Error, Result};
use crate::models::{Actor, Role};

/// Actions that can be performed against the prayer tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrayerAction {
    // Intake
    SubmitRequest,

    // Warrior flows
    ViewActiveRequests,
    Commit,
    LogSession,
    ViewOwnCommitments,

    // Leader flows
    ViewAllRequests,
    MarkAnswered,
    DeleteRequest,
    ReassignCommitment,
    EditTarget,
    ViewOthersCommitments,
    ViewDashboard,
}

impl PrayerAction {
    pub fn name(&self) -> &'static str {
        match self {
            PrayerAction::SubmitRequest => "submit a prayer request",
            PrayerAction::ViewActiveRequests => "view active requests",
            PrayerAction::Commit => "commit to a request",
            PrayerAction::LogSession => "log a prayer session",
            PrayerAction::ViewOwnCommitments => "view own commitments",
            PrayerAction::ViewAllRequests => "view all requests",
            PrayerAction::MarkAnswered => "mark a request answered",
            PrayerAction::DeleteRequest => "delete a request",
            PrayerAction::ReassignCommitment => "reassign a commitment",
            PrayerAction::EditTarget => "edit a commitment target",
            PrayerAction::ViewOthersCommitments => "view other volunteers' commitments",
            PrayerAction::ViewDashboard => "view the prayer dashboard",
        }
    }
}

/// Permission matrix for church roles
pub struct PermissionMatrix;

impl PermissionMatrix {
    /// Check if a role has permission to perform an action
    pub fn can_perform(role: Role, action: PrayerAction) -> bool {
        match action {
            // Anyone, signed in or not, may ask for prayer
            PrayerAction::SubmitRequest => true,

            // Approved members take part in the prayer rota
            PrayerAction::ViewActiveRequests
            | PrayerAction::Commit
            | PrayerAction::LogSession
            | PrayerAction::ViewOwnCommitments => match role {
                Role::Warrior
                | Role::Shepherd
                | Role::BasontaShepherd
                | Role::BacentaLeader
                | Role::Leader => true,
                Role::Guest | Role::Pending => false,
            },

            // Oversight - Leader only
            PrayerAction::ViewAllRequests
            | PrayerAction::MarkAnswered
            | PrayerAction::DeleteRequest
            | PrayerAction::ReassignCommitment
            | PrayerAction::EditTarget
            | PrayerAction::ViewOthersCommitments
            | PrayerAction::ViewDashboard => role == Role::Leader,
        }
    }

    /// Fail with `PermissionDenied` unless the actor may perform the action
    pub fn require(actor: &Actor, action: PrayerAction) -> Result<()> {
        if Self::can_perform(actor.role, action) {
            Ok(())
        } else {
            Err(Error::PermissionDenied(format!(
                "{} may not {}",
                actor.role,
                action.name()
            )))
        }
    }

    /// Owners act on their own commitments; leaders act on anyone's
    pub fn require_owner_or_leader(
        actor: &Actor,
        owner_id: uuid::Uuid,
        action: PrayerAction,
    ) -> Result<()> {
        Self::require(actor, action)?;
        if actor.id == owner_id || actor.is_leader() {
            Ok(())
        } else {
            Err(Error::PermissionDenied(format!(
                "only the assigned volunteer or a leader may {}",
                action.name()
            )))
        }
    }
}
