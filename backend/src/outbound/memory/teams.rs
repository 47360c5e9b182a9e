//! In-memory teams and invitations.
//!
//! Operations touching both tables take the invitations lock first and the
//! teams lock second.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{InvitationAnswer, InviteOutcome, TeamRepository, TeamRepositoryError};
use crate::domain::{Invitation, InvitationStatus, Team, TeamHandle, UserId};

use super::table::Table;

/// Teams and invitations kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryTeamRepository {
    teams: Table<Team>,
    invitations: Table<Invitation>,
}

impl InMemoryTeamRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut teams: Vec<Team>) -> Vec<Team> {
    teams.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    teams
}

#[async_trait]
impl TeamRepository for InMemoryTeamRepository {
    async fn list(&self) -> Result<Vec<Team>, TeamRepositoryError> {
        Ok(newest_first(self.teams.read(<[Team]>::to_vec)))
    }

    async fn list_for_member(&self, user: &UserId) -> Result<Vec<Team>, TeamRepositoryError> {
        let teams = self.teams.read(|rows| {
            rows.iter()
                .filter(|team| team.includes(user))
                .cloned()
                .collect::<Vec<_>>()
        });
        Ok(newest_first(teams))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Team>, TeamRepositoryError> {
        Ok(self.teams.find(|team| team.id == id))
    }

    async fn find_by_handle(
        &self,
        handle: &TeamHandle,
    ) -> Result<Option<Team>, TeamRepositoryError> {
        Ok(self.teams.find(|team| team.handle == *handle))
    }

    async fn insert(&self, team: &Team) -> Result<(), TeamRepositoryError> {
        self.teams.write(|rows| {
            if rows.iter().any(|other| other.handle == team.handle) {
                return Err(TeamRepositoryError::duplicate(team.handle.as_str()));
            }
            rows.push(team.clone());
            Ok(())
        })
    }

    async fn update_details(&self, team: &Team) -> Result<bool, TeamRepositoryError> {
        self.teams.write(|rows| {
            if rows
                .iter()
                .any(|other| other.handle == team.handle && other.id != team.id)
            {
                return Err(TeamRepositoryError::duplicate(team.handle.as_str()));
            }
            Ok(match rows.iter_mut().find(|stored| stored.id == team.id) {
                Some(stored) => {
                    stored.name.clone_from(&team.name);
                    stored.handle = team.handle.clone();
                    stored.description.clone_from(&team.description);
                    stored.updated_at = team.updated_at;
                    true
                }
                None => false,
            })
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool, TeamRepositoryError> {
        Ok(self.invitations.write(|invitations| {
            let removed = self.teams.remove(|team| team.id == id) > 0;
            if removed {
                invitations.retain(|invitation| invitation.team != id);
            }
            removed
        }))
    }

    async fn invite(&self, invitation: &Invitation) -> Result<InviteOutcome, TeamRepositoryError> {
        Ok(self.invitations.write(|invitations| {
            let Some(team) = self.teams.find(|team| team.id == invitation.team) else {
                return InviteOutcome::TeamUnavailable;
            };
            if !team.includes(&invitation.inviter) {
                return InviteOutcome::TeamUnavailable;
            }
            let pending = invitations.iter().any(|other| {
                other.team == invitation.team
                    && other.invitee == invitation.invitee
                    && other.status == InvitationStatus::Pending
            });
            if pending || team.includes(&invitation.invitee) {
                return InviteOutcome::AlreadyInvited;
            }
            invitations.push(invitation.clone());
            InviteOutcome::Sent
        }))
    }

    async fn invitations_for(
        &self,
        invitee: &UserId,
        status: Option<InvitationStatus>,
    ) -> Result<Vec<Invitation>, TeamRepositoryError> {
        let mut found = self.invitations.read(|rows| {
            rows.iter()
                .filter(|invitation| {
                    invitation.invitee == *invitee
                        && status.is_none_or(|wanted| invitation.status == wanted)
                })
                .cloned()
                .collect::<Vec<_>>()
        });
        found.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        Ok(found)
    }

    async fn answer(
        &self,
        id: Uuid,
        invitee: &UserId,
        status: InvitationStatus,
        at: DateTime<Utc>,
    ) -> Result<InvitationAnswer, TeamRepositoryError> {
        Ok(self.invitations.write(|invitations| {
            let Some(invitation) = invitations
                .iter_mut()
                .find(|invitation| invitation.id == id && invitation.invitee == *invitee)
            else {
                return InvitationAnswer::Missing;
            };
            if invitation.status != InvitationStatus::Pending {
                return InvitationAnswer::AlreadyAnswered(invitation.clone());
            }
            invitation.status = status;
            invitation.answered_at = Some(at);
            if status == InvitationStatus::Accepted {
                self.teams.write(|teams| {
                    if let Some(team) = teams.iter_mut().find(|team| team.id == invitation.team) {
                        team.admit(invitee);
                    }
                });
            }
            InvitationAnswer::Recorded(invitation.clone())
        }))
    }
}
