//! Actor and role models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// Church roles, as assigned by a leader when approving a signup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Unauthenticated visitor (public request form)
    Guest,
    /// Signed up, awaiting leader approval
    Pending,
    /// Prayer warrior - commits to and logs prayer
    Warrior,
    /// Cares for assigned church members
    Shepherd,
    /// Leads a Basonta
    BasontaShepherd,
    /// Leads a Bacenta
    BacentaLeader,
    /// Church leader - full control over prayer requests
    Leader,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Pending => "pending",
            Role::Warrior => "warrior",
            Role::Shepherd => "shepherd",
            Role::BasontaShepherd => "basonta_shepherd",
            Role::BacentaLeader => "bacenta_leader",
            Role::Leader => "leader",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Guest => "Guest",
            Role::Pending => "Pending Approval",
            Role::Warrior => "Prayer Warrior",
            Role::Shepherd => "Shepherd",
            Role::BasontaShepherd => "Basonta Shepherd",
            Role::BacentaLeader => "Bacenta Leader",
            Role::Leader => "Leader",
        }
    }

    /// Approved members who may take part in the prayer rota
    pub fn is_member(&self) -> bool {
        !matches!(self, Role::Guest | Role::Pending)
    }

    pub fn all() -> &'static [Role] {
        &[
            Role::Guest,
            Role::Pending,
            Role::Warrior,
            Role::Shepherd,
            Role::BasontaShepherd,
            Role::BacentaLeader,
            Role::Leader,
        ]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::all()
            .iter()
            .copied()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| Error::InvalidInput(format!("unknown role '{}'", s)))
    }
}

/// The identity performing an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    /// A fresh anonymous visitor
    pub fn guest() -> Self {
        Self::new(Uuid::new_v4(), Role::Guest)
    }

    pub fn is_leader(&self) -> bool {
        self.role == Role::Leader
    }

    /// Volunteer that must still hold a commitment for this actor to write
    /// progress to it; leaders write to any commitment
    pub fn holder_guard(&self) -> Option<Uuid> {
        if self.is_leader() {
            None
        } else {
            Some(self.id)
        }
    }
}
