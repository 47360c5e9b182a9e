//! Team and invitation use-cases.
//!
//! Owners manage their teams; any member may invite others by username.
//! Invitees see their requests and answer each one exactly once.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{InvitationAnswer, InviteOutcome, TeamRepository, UserRepository};
use crate::domain::service_support::{map_team_error, map_user_error};
use crate::domain::{
    AuthorSummary, Error, FORBIDDEN_MESSAGE, Invitation, InvitationStatus, InvitationView,
    OwnerScope, Team, TeamChanges, TeamDraft, TeamView, User, UserId, Username,
};

const NOT_FOUND: &str = "Team not found";
const INVITEE_NOT_FOUND: &str = "user not found to invite to the group";
const TEAM_UNAVAILABLE: &str = "team not found to invite people";
const ALREADY_INVITED: &str = "the user already invited";
const ALREADY_ANSWERED: &str = "this request already responded";
const REQUEST_NOT_FOUND: &str = "request not found";
const NOT_AN_ANSWER: &str = "Answer with accepted or rejected";

/// Dependencies of [`TeamService`].
#[derive(Clone)]
pub struct TeamServicePorts {
    pub teams: Arc<dyn TeamRepository>,
    pub users: Arc<dyn UserRepository>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Clone)]
pub struct TeamService {
    ports: TeamServicePorts,
}

impl TeamService {
    pub fn new(ports: TeamServicePorts) -> Self {
        Self { ports }
    }

    /// Create a team owned by `owner`.
    pub async fn create(&self, owner: &User, draft: TeamDraft) -> Result<TeamView, Error> {
        let team = draft.into_team(owner.id.clone(), self.ports.clock.utc());
        self.ports
            .teams
            .insert(&team)
            .await
            .map_err(map_team_error)?;
        info!(team_id = %team.id, handle = %team.handle, "created team");
        Ok(TeamView {
            team,
            owner: Some(AuthorSummary::from(owner)),
        })
    }

    pub async fn list(&self) -> Result<Vec<TeamView>, Error> {
        let teams = self.ports.teams.list().await.map_err(map_team_error)?;
        self.views(teams).await
    }

    /// Teams the caller owns or belongs to.
    pub async fn mine(&self, user: &User) -> Result<Vec<TeamView>, Error> {
        let teams = self
            .ports
            .teams
            .list_for_member(&user.id)
            .await
            .map_err(map_team_error)?;
        self.views(teams).await
    }

    pub async fn get(&self, id: Uuid) -> Result<TeamView, Error> {
        let team = self.find(id).await?;
        let owner = self.summary(&team.owner).await?;
        Ok(TeamView { team, owner })
    }

    pub async fn update(
        &self,
        id: Uuid,
        changes: TeamChanges,
        scope: &OwnerScope,
    ) -> Result<TeamView, Error> {
        let mut team = self.owned(id, scope).await?;
        changes.apply(&mut team, self.ports.clock.utc());
        if !self
            .ports
            .teams
            .update_details(&team)
            .await
            .map_err(map_team_error)?
        {
            return Err(Error::not_found(NOT_FOUND));
        }
        let owner = self.summary(&team.owner).await?;
        Ok(TeamView { team, owner })
    }

    pub async fn remove(&self, id: Uuid, scope: &OwnerScope) -> Result<(), Error> {
        self.owned(id, scope).await?;
        if !self
            .ports
            .teams
            .delete(id)
            .await
            .map_err(map_team_error)?
        {
            return Err(Error::not_found(NOT_FOUND));
        }
        info!(team_id = %id, "removed team");
        Ok(())
    }

    /// Invite the user called `username` to `team_id` on behalf of `inviter`.
    pub async fn invite(
        &self,
        inviter: &User,
        team_id: Uuid,
        username: &str,
    ) -> Result<(), Error> {
        let name = Username::new(username).map_err(|_| Error::not_found(INVITEE_NOT_FOUND))?;
        let invitee = self
            .ports
            .users
            .find_by_username(&name)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(INVITEE_NOT_FOUND))?;
        let invitation = Invitation::pending(
            team_id,
            invitee.id.clone(),
            inviter.id.clone(),
            self.ports.clock.utc(),
        );
        match self
            .ports
            .teams
            .invite(&invitation)
            .await
            .map_err(map_team_error)?
        {
            InviteOutcome::Sent => {
                info!(team_id = %team_id, invitee = %invitee.id, "sent team invitation");
                Ok(())
            }
            InviteOutcome::TeamUnavailable => Err(Error::not_found(TEAM_UNAVAILABLE)),
            InviteOutcome::AlreadyInvited => Err(Error::conflict(ALREADY_INVITED)),
        }
    }

    /// Invitations addressed to `user`, optionally narrowed to one status.
    pub async fn requests(
        &self,
        user: &User,
        status: Option<InvitationStatus>,
    ) -> Result<Vec<InvitationView>, Error> {
        let invitations = self
            .ports
            .teams
            .invitations_for(&user.id, status)
            .await
            .map_err(map_team_error)?;
        let mut team_names: HashMap<Uuid, Option<String>> = HashMap::new();
        let mut inviters: HashMap<UserId, Option<AuthorSummary>> = HashMap::new();
        let mut views = Vec::with_capacity(invitations.len());
        for invitation in invitations {
            if !team_names.contains_key(&invitation.team) {
                let name = self
                    .ports
                    .teams
                    .find_by_id(invitation.team)
                    .await
                    .map_err(map_team_error)?
                    .map(|team| team.name);
                team_names.insert(invitation.team, name);
            }
            if !inviters.contains_key(&invitation.inviter) {
                let summary = self.summary(&invitation.inviter).await?;
                inviters.insert(invitation.inviter.clone(), summary);
            }
            views.push(InvitationView {
                team_name: team_names.get(&invitation.team).cloned().flatten(),
                inviter: inviters.get(&invitation.inviter).cloned().flatten(),
                invitation,
            });
        }
        Ok(views)
    }

    /// Accept or reject one of the caller's pending invitations.
    pub async fn answer(
        &self,
        user: &User,
        id: Uuid,
        status: InvitationStatus,
    ) -> Result<Invitation, Error> {
        if !status.is_answer() {
            return Err(Error::invalid_request(NOT_AN_ANSWER));
        }
        match self
            .ports
            .teams
            .answer(id, &user.id, status, self.ports.clock.utc())
            .await
            .map_err(map_team_error)?
        {
            InvitationAnswer::Recorded(invitation) => {
                info!(invitation_id = %id, status = %status, "answered team invitation");
                Ok(invitation)
            }
            InvitationAnswer::AlreadyAnswered(_) => Err(Error::conflict(ALREADY_ANSWERED)),
            InvitationAnswer::Missing => Err(Error::not_found(REQUEST_NOT_FOUND)),
        }
    }

    async fn find(&self, id: Uuid) -> Result<Team, Error> {
        self.ports
            .teams
            .find_by_id(id)
            .await
            .map_err(map_team_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }

    async fn owned(&self, id: Uuid, scope: &OwnerScope) -> Result<Team, Error> {
        let team = self.find(id).await?;
        if !scope.covers(&team.owner) {
            return Err(Error::forbidden(FORBIDDEN_MESSAGE));
        }
        Ok(team)
    }

    async fn summary(&self, id: &UserId) -> Result<Option<AuthorSummary>, Error> {
        Ok(self
            .ports
            .users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .as_ref()
            .map(AuthorSummary::from))
    }

    async fn views(&self, teams: Vec<Team>) -> Result<Vec<TeamView>, Error> {
        let mut owners: HashMap<UserId, Option<AuthorSummary>> = HashMap::new();
        let mut views = Vec::with_capacity(teams.len());
        for team in teams {
            if !owners.contains_key(&team.owner) {
                let summary = self.summary(&team.owner).await?;
                owners.insert(team.owner.clone(), summary);
            }
            let owner = owners.get(&team.owner).cloned().flatten();
            views.push(TeamView { team, owner });
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ports::{MockTeamRepository, MockUserRepository, TeamRepositoryError};
    use crate::domain::{ErrorCode, Mobile};
    use crate::test_support::MutableClock;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 20, 16, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    struct Mocks {
        teams: MockTeamRepository,
        users: MockUserRepository,
    }

    #[fixture]
    fn mocks() -> Mocks {
        Mocks {
            teams: MockTeamRepository::new(),
            users: MockUserRepository::new(),
        }
    }

    fn service(mocks: Mocks) -> TeamService {
        TeamService::new(TeamServicePorts {
            teams: Arc::new(mocks.teams),
            users: Arc::new(mocks.users),
            clock: Arc::new(MutableClock::new(now())),
        })
    }

    fn user(mobile: &str, username: Option<&str>) -> User {
        let mut user = User::from_mobile(Mobile::new(mobile).expect("mobile"), now());
        user.username = username.map(|name| Username::new(name).expect("username"));
        user
    }

    fn team(owner: &UserId) -> Team {
        TeamDraft::try_from_parts("Night owls", "nightowls", "Late study group")
            .expect("draft")
            .into_team(owner.clone(), now())
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_handles_conflict(mut mocks: Mocks) {
        mocks
            .teams
            .expect_insert()
            .return_once(|team| Err(TeamRepositoryError::duplicate(team.handle.to_string())));
        let owner = user("9123330000", None);
        let draft = TeamDraft::try_from_parts("Night owls", "nightowls", "Late study group")
            .expect("draft");

        let error = service(mocks)
            .create(&owner, draft)
            .await
            .expect_err("duplicate");

        assert_eq!(error.code(), ErrorCode::Conflict);
        assert_eq!(error.message(), "The team username already exists");
    }

    #[rstest]
    #[tokio::test]
    async fn invite_sends_a_pending_invitation(mut mocks: Mocks) {
        let inviter = user("9123330000", None);
        let invitee = user("9123330001", Some("sara"));
        let invitee_id = invitee.id.clone();
        let inviter_id = inviter.id.clone();
        let team_id = Uuid::new_v4();
        mocks
            .users
            .expect_find_by_username()
            .withf(|name| name.as_str() == "sara")
            .return_once(move |_| Ok(Some(invitee)));
        mocks
            .teams
            .expect_invite()
            .withf(move |invitation| {
                invitation.team == team_id
                    && invitation.invitee == invitee_id
                    && invitation.inviter == inviter_id
                    && invitation.status == InvitationStatus::Pending
                    && invitation.requested_at == now()
            })
            .return_once(|_| Ok(InviteOutcome::Sent));

        service(mocks)
            .invite(&inviter, team_id, "sara")
            .await
            .expect("invited");
    }

    #[rstest]
    #[case(InviteOutcome::TeamUnavailable, ErrorCode::NotFound, TEAM_UNAVAILABLE)]
    #[case(InviteOutcome::AlreadyInvited, ErrorCode::Conflict, ALREADY_INVITED)]
    #[tokio::test]
    async fn refused_invitations_map_to_errors(
        mut mocks: Mocks,
        #[case] outcome: InviteOutcome,
        #[case] code: ErrorCode,
        #[case] message: &str,
    ) {
        let invitee = user("9123330001", Some("sara"));
        mocks
            .users
            .expect_find_by_username()
            .return_once(move |_| Ok(Some(invitee)));
        mocks.teams.expect_invite().return_once(move |_| Ok(outcome));

        let error = service(mocks)
            .invite(&user("9123330000", None), Uuid::new_v4(), "sara")
            .await
            .expect_err("refused");

        assert_eq!(error.code(), code);
        assert_eq!(error.message(), message);
    }

    #[rstest]
    #[case("ghost")]
    #[case("9")]
    #[tokio::test]
    async fn unknown_invitees_are_not_found(mut mocks: Mocks, #[case] username: &str) {
        mocks
            .users
            .expect_find_by_username()
            .returning(|_| Ok(None));
        mocks.teams.expect_invite().never();

        let error = service(mocks)
            .invite(&user("9123330000", None), Uuid::new_v4(), username)
            .await
            .expect_err("unknown");

        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.message(), INVITEE_NOT_FOUND);
    }

    #[rstest]
    #[tokio::test]
    async fn pending_is_not_an_answer(mut mocks: Mocks) {
        mocks.teams.expect_answer().never();

        let error = service(mocks)
            .answer(
                &user("9123330001", None),
                Uuid::new_v4(),
                InvitationStatus::Pending,
            )
            .await
            .expect_err("not an answer");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn answering_twice_conflicts(mut mocks: Mocks) {
        let invitee = user("9123330001", None);
        let answered = Invitation {
            status: InvitationStatus::Rejected,
            answered_at: Some(now()),
            ..Invitation::pending(Uuid::new_v4(), invitee.id.clone(), UserId::random(), now())
        };
        mocks
            .teams
            .expect_answer()
            .return_once(move |_, _, _, _| Ok(InvitationAnswer::AlreadyAnswered(answered)));

        let error = service(mocks)
            .answer(&invitee, Uuid::new_v4(), InvitationStatus::Accepted)
            .await
            .expect_err("answered");

        assert_eq!(error.code(), ErrorCode::Conflict);
        assert_eq!(error.message(), ALREADY_ANSWERED);
    }

    #[rstest]
    #[tokio::test]
    async fn members_cannot_update_the_team(mut mocks: Mocks) {
        let owner = UserId::random();
        let stored = team(&owner);
        let id = stored.id;
        mocks
            .teams
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(stored)));
        mocks.teams.expect_update_details().never();

        let error = service(mocks)
            .update(id, TeamChanges::default(), &OwnerScope::Own(UserId::random()))
            .await
            .expect_err("not the owner");

        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn requests_join_team_and_inviter(mut mocks: Mocks) {
        let inviter = user("9123330000", Some("amir"));
        let invitee = user("9123330001", None);
        let stored = team(&inviter.id);
        let team_id = stored.id;
        let pending = vec![
            Invitation::pending(team_id, invitee.id.clone(), inviter.id.clone(), now()),
            Invitation::pending(team_id, invitee.id.clone(), inviter.id.clone(), now()),
        ];
        mocks
            .teams
            .expect_invitations_for()
            .withf(|_, status| *status == Some(InvitationStatus::Pending))
            .return_once(move |_, _| Ok(pending));
        mocks
            .teams
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(stored)));
        mocks
            .users
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(inviter)));

        let views = service(mocks)
            .requests(&invitee, Some(InvitationStatus::Pending))
            .await
            .expect("requests");

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].team_name.as_deref(), Some("Night owls"));
        assert_eq!(
            views[1].inviter.as_ref().and_then(|s| s.username.as_deref()),
            Some("amir")
        );
    }
}
