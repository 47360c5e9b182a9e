//! Teams and the invitations that grow them.
//!
//! A team has an owner and members. Anyone already in a team may invite a
//! user by username; the invitee accepts or rejects the pending invitation
//! exactly once, and accepting makes them a member.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use uuid::Uuid;

use super::sanitize::{FieldViolation, bounded_text, clean_text, required_text};
use super::{AuthorSummary, UserId};

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 64;

static HANDLE_RE: OnceLock<Regex> = OnceLock::new();

fn handle_regex() -> &'static Regex {
    HANDLE_RE.get_or_init(|| {
        Regex::new(r"^[a-z]+[a-z0-9_.]{3,}$")
            .unwrap_or_else(|error| panic!("team handle regex failed to compile: {error}"))
    })
}

/// Unique public name of a team, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TeamHandle(String);

impl TeamHandle {
    pub const MAX: usize = 32;

    /// Validate a handle; letters are folded to lowercase.
    ///
    /// ```
    /// use campus::domain::TeamHandle;
    ///
    /// assert_eq!(TeamHandle::new("Rust.Crew").map(|h| h.to_string()).as_deref(), Ok("rust.crew"));
    /// assert!(TeamHandle::new("9lives").is_err());
    /// ```
    pub fn new(raw: &str) -> Result<Self, FieldViolation> {
        let folded = raw.trim().to_ascii_lowercase();
        if folded.chars().count() > Self::MAX || !handle_regex().is_match(&folded) {
            return Err(FieldViolation::new(
                "username",
                "Enter the team username correctly",
            ));
        }
        Ok(Self(folded))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub handle: TeamHandle,
    pub description: String,
    pub owner: UserId,
    /// Members other than the owner, in joining order.
    pub members: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Team {
    /// True for the owner and every member.
    pub fn includes(&self, user: &UserId) -> bool {
        self.owner == *user || self.members.contains(user)
    }

    /// Add `user` unless they already belong. Returns whether they were
    /// added.
    pub fn admit(&mut self, user: &UserId) -> bool {
        if self.includes(user) {
            return false;
        }
        self.members.push(user.clone());
        true
    }
}

/// A team joined with its owner's public identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamView {
    pub team: Team,
    pub owner: Option<AuthorSummary>,
}

fn name(value: &str) -> Result<String, FieldViolation> {
    bounded_text("name", "team name", value, NAME_MIN, NAME_MAX)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamDraft {
    pub name: String,
    pub handle: TeamHandle,
    pub description: String,
}

impl TeamDraft {
    pub fn try_from_parts(
        name_raw: &str,
        handle: &str,
        description: &str,
    ) -> Result<Self, FieldViolation> {
        Ok(Self {
            name: name(name_raw)?,
            handle: TeamHandle::new(handle)?,
            description: required_text("description", "description", description)?,
        })
    }

    pub fn into_team(self, owner: UserId, now: DateTime<Utc>) -> Team {
        Team {
            id: Uuid::new_v4(),
            name: self.name,
            handle: self.handle,
            description: self.description,
            owner,
            members: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Sparse update of a team. Ownership and membership are not editable here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamChanges {
    pub name: Option<String>,
    pub handle: Option<TeamHandle>,
    pub description: Option<String>,
}

impl TeamChanges {
    pub fn try_from_parts(
        name_raw: Option<String>,
        handle: Option<String>,
        description: Option<String>,
    ) -> Result<Self, FieldViolation> {
        Ok(Self {
            name: clean_text(name_raw).map(|v| name(&v)).transpose()?,
            handle: clean_text(handle).map(|v| TeamHandle::new(&v)).transpose()?,
            description: clean_text(description),
        })
    }

    pub fn apply(self, team: &mut Team, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            team.name = name;
        }
        if let Some(handle) = self.handle {
            team.handle = handle;
        }
        if let Some(description) = self.description {
            team.description = description;
        }
        team.updated_at = now;
    }
}

/// Lifecycle of an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl InvitationStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Accepted and rejected are the only answers an invitee can give.
    pub const fn is_answer(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvitationStatus {
    type Err = FieldViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(FieldViolation::new(
                "status",
                "Status must be pending, accepted or rejected",
            )),
        }
    }
}

/// A request for `invitee` to join `team`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    pub id: Uuid,
    pub team: Uuid,
    pub invitee: UserId,
    pub inviter: UserId,
    pub status: InvitationStatus,
    pub requested_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
}

impl Invitation {
    pub fn pending(team: Uuid, invitee: UserId, inviter: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            team,
            invitee,
            inviter,
            status: InvitationStatus::Pending,
            requested_at: now,
            answered_at: None,
        }
    }
}

/// An invitation joined with the team name and the inviter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationView {
    pub invitation: Invitation,
    pub team_name: Option<String>,
    pub inviter: Option<AuthorSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("rustaceans", true)]
    #[case("rust_crew.2", true)]
    #[case("abc", false)]
    #[case("_crew", false)]
    #[case("crew-one", false)]
    fn handle_shapes(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(TeamHandle::new(raw).is_ok(), valid);
    }

    #[rstest]
    fn owners_and_members_are_not_admitted_twice() {
        let owner = UserId::random();
        let mut team = TeamDraft::try_from_parts("Crew", "rustcrew", "We ship")
            .expect("draft")
            .into_team(owner.clone(), Utc::now());
        let member = UserId::random();

        assert!(!team.admit(&owner));
        assert!(team.admit(&member));
        assert!(!team.admit(&member));
        assert_eq!(team.members, vec![member]);
    }

    #[rstest]
    #[case("accepted", Some(InvitationStatus::Accepted))]
    #[case(" Rejected ", Some(InvitationStatus::Rejected))]
    #[case("maybe", None)]
    fn statuses_parse(#[case] raw: &str, #[case] expected: Option<InvitationStatus>) {
        assert_eq!(raw.parse::<InvitationStatus>().ok(), expected);
    }
}
