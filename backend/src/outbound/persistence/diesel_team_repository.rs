//! PostgreSQL-backed `TeamRepository` implementation.
//!
//! Members other than the owner live in the `teams.members` UUID array.
//! Inviting and answering run in a transaction that locks the team row (and
//! the invitation row when answering) with `SELECT ... FOR UPDATE`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use tracing::warn;
use uuid::Uuid;

use super::diesel_error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{InvitationRow, TeamRow};
use super::pool::{DbPool, PoolError};
use super::schema::{team_invitations, teams};
use crate::domain::ports::{InvitationAnswer, InviteOutcome, TeamRepository, TeamRepositoryError};
use crate::domain::{Invitation, InvitationStatus, Team, TeamHandle, UserId};

/// Diesel-backed team and invitation repository.
#[derive(Clone)]
pub struct DieselTeamRepository {
    pool: DbPool,
}

impl DieselTeamRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> TeamRepositoryError {
    map_pool_error(error, TeamRepositoryError::connection)
}

fn map_diesel(error: DieselError) -> TeamRepositoryError {
    map_diesel_error(
        &error,
        TeamRepositoryError::query,
        TeamRepositoryError::connection,
    )
}

fn map_write(error: DieselError, handle: &TeamHandle) -> TeamRepositoryError {
    if is_unique_violation(&error) {
        return TeamRepositoryError::duplicate(handle.as_str());
    }
    map_diesel(error)
}

fn team_to_domain(row: TeamRow) -> Result<Team, TeamRepositoryError> {
    Team::try_from(row).map_err(|err| {
        warn!(error = %err, "team row failed to decode");
        TeamRepositoryError::query(err.to_string())
    })
}

fn invitation_to_domain(row: InvitationRow) -> Result<Invitation, TeamRepositoryError> {
    Invitation::try_from(row).map_err(|err| {
        warn!(error = %err, "invitation row failed to decode");
        TeamRepositoryError::query(err.to_string())
    })
}

fn member_ids(team: &Team) -> Vec<Uuid> {
    team.members.iter().map(|member| *member.as_uuid()).collect()
}

/// Failure inside a membership transaction.
enum TxError {
    Diesel(DieselError),
    Repository(TeamRepositoryError),
}

impl From<DieselError> for TxError {
    fn from(error: DieselError) -> Self {
        Self::Diesel(error)
    }
}

impl From<TeamRepositoryError> for TxError {
    fn from(error: TeamRepositoryError) -> Self {
        Self::Repository(error)
    }
}

impl From<TxError> for TeamRepositoryError {
    fn from(error: TxError) -> Self {
        match error {
            TxError::Diesel(error) => map_diesel(error),
            TxError::Repository(error) => error,
        }
    }
}

#[async_trait]
impl TeamRepository for DieselTeamRepository {
    async fn list(&self) -> Result<Vec<Team>, TeamRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        teams::table
            .select(TeamRow::as_select())
            .order(teams::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?
            .into_iter()
            .map(team_to_domain)
            .collect()
    }

    async fn list_for_member(&self, user: &UserId) -> Result<Vec<Team>, TeamRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let id = *user.as_uuid();
        teams::table
            .filter(teams::owner.eq(id).or(teams::members.contains(vec![id])))
            .select(TeamRow::as_select())
            .order(teams::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?
            .into_iter()
            .map(team_to_domain)
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Team>, TeamRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        teams::table
            .find(id)
            .select(TeamRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?
            .map(team_to_domain)
            .transpose()
    }

    async fn find_by_handle(
        &self,
        handle: &TeamHandle,
    ) -> Result<Option<Team>, TeamRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        teams::table
            .filter(teams::handle.eq(handle.as_str()))
            .select(TeamRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?
            .map(team_to_domain)
            .transpose()
    }

    async fn insert(&self, team: &Team) -> Result<(), TeamRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::insert_into(teams::table)
            .values(TeamRow::from(team))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write(err, &team.handle))
    }

    async fn update_details(&self, team: &Team) -> Result<bool, TeamRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::update(teams::table.find(team.id))
            .set((
                teams::name.eq(&team.name),
                teams::handle.eq(team.handle.as_str()),
                teams::description.eq(&team.description),
                teams::updated_at.eq(team.updated_at),
            ))
            .execute(&mut conn)
            .await
            .map(|count| count > 0)
            .map_err(|err| map_write(err, &team.handle))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, TeamRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let removed = conn
            .transaction::<_, TxError, _>(|conn| {
                async move {
                    diesel::delete(team_invitations::table.filter(team_invitations::team.eq(id)))
                        .execute(conn)
                        .await?;
                    let count = diesel::delete(teams::table.find(id)).execute(conn).await?;
                    Ok(count > 0)
                }
                .scope_boxed()
            })
            .await?;
        Ok(removed)
    }

    async fn invite(&self, invitation: &Invitation) -> Result<InviteOutcome, TeamRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row = InvitationRow::from(invitation);
        let outcome = conn
            .transaction::<_, TxError, _>(|conn| {
                async move {
                    let Some(team_row) = teams::table
                        .find(row.team)
                        .select(TeamRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?
                    else {
                        return Ok(InviteOutcome::TeamUnavailable);
                    };
                    let team = team_to_domain(team_row)?;
                    if !team.includes(&UserId::from_uuid(row.inviter)) {
                        return Ok(InviteOutcome::TeamUnavailable);
                    }
                    if team.includes(&UserId::from_uuid(row.invitee)) {
                        return Ok(InviteOutcome::AlreadyInvited);
                    }
                    let pending: i64 = team_invitations::table
                        .filter(
                            team_invitations::team
                                .eq(row.team)
                                .and(team_invitations::invitee.eq(row.invitee))
                                .and(
                                    team_invitations::status
                                        .eq(InvitationStatus::Pending.as_str()),
                                ),
                        )
                        .select(count_star())
                        .first(conn)
                        .await?;
                    if pending > 0 {
                        return Ok(InviteOutcome::AlreadyInvited);
                    }
                    diesel::insert_into(team_invitations::table)
                        .values(&row)
                        .execute(conn)
                        .await?;
                    Ok(InviteOutcome::Sent)
                }
                .scope_boxed()
            })
            .await?;
        Ok(outcome)
    }

    async fn invitations_for(
        &self,
        invitee: &UserId,
        status: Option<InvitationStatus>,
    ) -> Result<Vec<Invitation>, TeamRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let mut query = team_invitations::table
            .filter(team_invitations::invitee.eq(*invitee.as_uuid()))
            .select(InvitationRow::as_select())
            .order(team_invitations::requested_at.desc())
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(team_invitations::status.eq(status.as_str()));
        }
        query
            .load(&mut conn)
            .await
            .map_err(map_diesel)?
            .into_iter()
            .map(invitation_to_domain)
            .collect()
    }

    async fn answer(
        &self,
        id: Uuid,
        invitee: &UserId,
        status: InvitationStatus,
        at: DateTime<Utc>,
    ) -> Result<InvitationAnswer, TeamRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let invitee = *invitee.as_uuid();
        let answer = conn
            .transaction::<_, TxError, _>(|conn| {
                async move {
                    let Some(row) = team_invitations::table
                        .filter(
                            team_invitations::id
                                .eq(id)
                                .and(team_invitations::invitee.eq(invitee)),
                        )
                        .select(InvitationRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?
                    else {
                        return Ok(InvitationAnswer::Missing);
                    };
                    let mut invitation = invitation_to_domain(row)?;
                    if invitation.status != InvitationStatus::Pending {
                        return Ok(InvitationAnswer::AlreadyAnswered(invitation));
                    }
                    invitation.status = status;
                    invitation.answered_at = Some(at);
                    diesel::update(team_invitations::table.find(id))
                        .set((
                            team_invitations::status.eq(status.as_str()),
                            team_invitations::answered_at.eq(Some(at)),
                        ))
                        .execute(conn)
                        .await?;
                    if status == InvitationStatus::Accepted {
                        let team_row = teams::table
                            .find(invitation.team)
                            .select(TeamRow::as_select())
                            .for_update()
                            .first(conn)
                            .await
                            .optional()?;
                        if let Some(team_row) = team_row {
                            let mut team = team_to_domain(team_row)?;
                            if team.admit(&invitation.invitee) {
                                diesel::update(teams::table.find(team.id))
                                    .set(teams::members.eq(member_ids(&team)))
                                    .execute(conn)
                                    .await?;
                            }
                        }
                    }
                    Ok(InvitationAnswer::Recorded(invitation))
                }
                .scope_boxed()
            })
            .await?;
        Ok(answer)
    }
}
