//! # Authorization Policy
//!
//! Decides whether a requested team assignment is permitted, given the synced
//! server configuration and a live roster snapshot.
//!
//! [`evaluate`] is a pure decision function: no side effects, no transport,
//! no clock. The client session wraps it with the sync gate: until a server
//! push has installed the config replica, every claim is allowed, preserving
//! compatibility with servers that do not run the mod (fail open).
//!
//! ## Decision Table
//! 1. Goalie claims are never capacity-limited.
//! 2. Admins bypass the limit when the server allows it.
//! 3. Balancing is active when always-on, or in goalie-triggered mode when
//!    exactly one team fields a goalie.
//! 4. The effective cap is `max_skaters`, tightened (never loosened) to
//!    `other_team_attackers + offset + 1` while balancing is active.
//! 5. A team at or above its effective cap is denied; the reason code tells
//!    the caller which chat line to show.

use crate::config::ServerConfig;

/// The two teams of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    Blue,
    Red,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::Blue => Team::Red,
            Team::Red => Team::Blue,
        }
    }
}

/// The position kind being claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Attacker,
    Goalie,
}

/// Live position counts for one team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamState {
    pub attackers: i32,
    pub has_goalie: bool,
}

impl TeamState {
    pub fn new(attackers: i32, has_goalie: bool) -> Self {
        Self {
            attackers,
            has_goalie,
        }
    }
}

/// Snapshot of both rosters at the moment a claim arrives.
/// Derived on demand from the host's position state; never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RosterSnapshot {
    pub blue: TeamState,
    pub red: TeamState,
}

impl RosterSnapshot {
    pub fn new(blue: TeamState, red: TeamState) -> Self {
        Self { blue, red }
    }

    pub fn team(&self, team: Team) -> &TeamState {
        match team {
            Team::Blue => &self.blue,
            Team::Red => &self.red,
        }
    }
}

/// A position claim under evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionClaim {
    pub team: Team,
    pub role: Role,
    pub requester_is_admin: bool,
}

/// Why a claim was denied, for caller-side message selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Balancing tightened the cap; the team's goalie slot is still open.
    BalancedAndGoalieOpen,
    /// Balancing tightened the cap; the goalie slot is taken.
    BalancedNoGoalie,
    /// The team is at plain capacity; the goalie slot is still open.
    FullAndGoalieOpen,
    /// The team is at plain capacity; the goalie slot is taken.
    FullNoGoalie,
}

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub reason: Option<DenyReason>,
    /// Cap in force when a capacity comparison was made.
    pub effective_max: Option<i32>,
}

impl Decision {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
            effective_max: None,
        }
    }

    fn allowed_at(effective_max: i32) -> Self {
        Self {
            allowed: true,
            reason: None,
            effective_max: Some(effective_max),
        }
    }

    fn denied(reason: DenyReason, effective_max: i32) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            effective_max: Some(effective_max),
        }
    }
}

/// Evaluate a position claim against the synced config and live roster.
pub fn evaluate(config: &ServerConfig, roster: &RosterSnapshot, claim: &PositionClaim) -> Decision {
    // Goalie assignment is never capacity-limited.
    if claim.role == Role::Goalie {
        return Decision::allowed();
    }

    if config.admin_bypass && claim.requester_is_admin {
        return Decision::allowed();
    }

    let balancing = balancing_active(config, roster);
    let own = roster.team(claim.team);
    let other = roster.team(claim.team.opponent());

    let mut effective_max = config.max_skaters;
    if balancing {
        // Balancing only ever tightens the cap, never loosens it.
        let candidate = other.attackers + config.team_balance_offset + 1;
        effective_max = effective_max.min(candidate);
    }

    // A team exactly at its cap is rejected, not grandfathered.
    if own.attackers >= effective_max {
        let reason = match (balancing, own.has_goalie) {
            (true, false) => DenyReason::BalancedAndGoalieOpen,
            (true, true) => DenyReason::BalancedNoGoalie,
            (false, false) => DenyReason::FullAndGoalieOpen,
            (false, true) => DenyReason::FullNoGoalie,
        };
        return Decision::denied(reason, effective_max);
    }

    Decision::allowed_at(effective_max)
}

/// Whether balancing applies to the current rosters.
///
/// Goalie-triggered mode fires only while exactly one team has a goalie;
/// both-have and neither-have leave the plain cap in force.
pub fn balancing_active(config: &ServerConfig, roster: &RosterSnapshot) -> bool {
    if config.team_balancing {
        return true;
    }
    if !config.team_balancing_goalie {
        return false;
    }
    roster.blue.has_goalie != roster.red.has_goalie
}

/// User-facing chat line for a denied claim.
pub fn deny_chat_line(reason: DenyReason, effective_max: i32) -> String {
    match reason {
        DenyReason::BalancedAndGoalieOpen => {
            format!("Teams are unbalanced ({effective_max}). Go goalie or switch teams.")
        }
        DenyReason::BalancedNoGoalie => {
            format!("Teams are unbalanced ({effective_max}). Switch teams.")
        }
        DenyReason::FullAndGoalieOpen => {
            format!("Team is full ({effective_max}). Only the goalie position is available.")
        }
        DenyReason::FullNoGoalie => {
            format!("Team is full ({effective_max}). Switch teams.")
        }
    }
}
