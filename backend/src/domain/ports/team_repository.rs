//! Port for teams and their invitations.
//!
//! Teams and invitations share one port so that sending and answering an
//! invitation can check and change membership in one atomic step.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Invitation, InvitationStatus, Team, TeamHandle, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by team repositories.
    pub enum TeamRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "team repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "team repository query failed: {message}",
        /// The handle is already taken.
        Duplicate { handle: String } => "team handle already exists: {handle}",
    }
}

/// Result of [`TeamRepository::invite`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteOutcome {
    /// The invitation was stored as pending.
    Sent,
    /// The team is gone or the inviter does not belong to it.
    TeamUnavailable,
    /// The invitee is already in the team or has a pending invitation.
    AlreadyInvited,
}

/// Result of [`TeamRepository::answer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvitationAnswer {
    /// No invitation with that id is addressed to the invitee.
    Missing,
    /// The invitation was answered before.
    AlreadyAnswered(Invitation),
    /// The answer was recorded; an acceptance also added the member.
    Recorded(Invitation),
}

/// Storage for teams and invitations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Every team, newest first.
    async fn list(&self) -> Result<Vec<Team>, TeamRepositoryError>;

    /// Teams `user` owns or belongs to, newest first.
    async fn list_for_member(&self, user: &UserId) -> Result<Vec<Team>, TeamRepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Team>, TeamRepositoryError>;

    async fn find_by_handle(&self, handle: &TeamHandle)
    -> Result<Option<Team>, TeamRepositoryError>;

    /// Fails with `Duplicate` when the handle is taken.
    async fn insert(&self, team: &Team) -> Result<(), TeamRepositoryError>;

    /// Write the name, handle, description and `updated_at` of `team`.
    /// Membership is left as stored. Returns `false` when the id is unknown.
    async fn update_details(&self, team: &Team) -> Result<bool, TeamRepositoryError>;

    /// Delete a team with its invitations. Returns `false` when the id is
    /// unknown.
    async fn delete(&self, id: Uuid) -> Result<bool, TeamRepositoryError>;

    /// Store `invitation` unless its inviter is outside the team or its
    /// invitee is already in the team or pending.
    async fn invite(&self, invitation: &Invitation) -> Result<InviteOutcome, TeamRepositoryError>;

    /// Invitations addressed to `invitee`, optionally with one status,
    /// newest first.
    async fn invitations_for(
        &self,
        invitee: &UserId,
        status: Option<InvitationStatus>,
    ) -> Result<Vec<Invitation>, TeamRepositoryError>;

    /// Record `status` on the pending invitation `id` addressed to
    /// `invitee`. Accepting admits the invitee to the team in the same step.
    async fn answer(
        &self,
        id: Uuid,
        invitee: &UserId,
        status: InvitationStatus,
        at: DateTime<Utc>,
    ) -> Result<InvitationAnswer, TeamRepositoryError>;
}
