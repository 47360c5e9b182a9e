//! User directory and profile editing.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::UserRepository;
use crate::domain::service_support::map_user_error;
use crate::domain::{Error, ProfileChanges, User, UserId};

const NOT_FOUND: &str = "User not found";

/// User directory use-cases.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    /// Create the service.
    pub fn new(users: Arc<dyn UserRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }

    /// Every user, optionally filtered by `search`.
    pub async fn list(&self, search: Option<String>) -> Result<Vec<User>, Error> {
        self.users.list(search).await.map_err(map_user_error)
    }

    /// Fresh copy of `caller`'s account.
    pub async fn profile(&self, caller: &User) -> Result<User, Error> {
        self.find(&caller.id).await
    }

    /// Apply `changes` to user `id`, keeping usernames and emails unique.
    pub async fn edit_profile(&self, id: &UserId, changes: ProfileChanges) -> Result<User, Error> {
        let mut user = self.find(id).await?;
        if changes.is_empty() {
            return Ok(user);
        }
        if let Some(username) = changes.username.as_ref() {
            let taken = self
                .users
                .find_by_username(username)
                .await
                .map_err(map_user_error)?
                .is_some_and(|other| other.id != user.id);
            if taken {
                return Err(Error::conflict("Username is already taken"));
            }
        }
        if let Some(email) = changes.email.as_ref() {
            let taken = self
                .users
                .find_by_email(email)
                .await
                .map_err(map_user_error)?
                .is_some_and(|other| other.id != user.id);
            if taken {
                return Err(Error::conflict("Email is already taken"));
            }
        }

        changes.apply(&mut user, self.clock.utc());
        if !self.users.update(&user).await.map_err(map_user_error)? {
            return Err(Error::not_found(NOT_FOUND));
        }
        info!(user_id = %user.id, "updated profile");
        Ok(user)
    }

    async fn find(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ports::MockUserRepository;
    use crate::domain::{ErrorCode, Mobile, Username};
    use crate::test_support::MutableClock;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    fn user(mobile: &str) -> User {
        User::from_mobile(Mobile::new(mobile).expect("mobile"), now())
    }

    #[fixture]
    fn repo() -> MockUserRepository {
        MockUserRepository::new()
    }

    fn service(repo: MockUserRepository) -> (UserService, Arc<MutableClock>) {
        let clock = Arc::new(MutableClock::new(now()));
        (UserService::new(Arc::new(repo), clock.clone()), clock)
    }

    #[rstest]
    #[tokio::test]
    async fn edit_profile_applies_changes(mut repo: MockUserRepository) {
        let existing = user("9121111111");
        let id = existing.id.clone();
        repo.expect_find_by_id()
            .return_once(move |_| Ok(Some(existing)));
        repo.expect_find_by_username().return_once(|_| Ok(None));
        repo.expect_update()
            .withf(|user| user.first_name.as_deref() == Some("Grace"))
            .return_once(|_| Ok(true));
        let changes =
            ProfileChanges::try_from_parts(Some(" Grace ".into()), None, Some("grace".into()), None)
                .expect("changes");
        let (service, clock) = service(repo);
        clock.advance(TimeDelta::minutes(5));

        let updated = service.edit_profile(&id, changes).await.expect("edited");

        assert_eq!(updated.username.as_ref().map(Username::as_str), Some("grace"));
        assert_eq!(updated.updated_at, now() + TimeDelta::minutes(5));
    }

    #[rstest]
    #[tokio::test]
    async fn edit_profile_rejects_taken_username(mut repo: MockUserRepository) {
        let existing = user("9121111111");
        let id = existing.id.clone();
        repo.expect_find_by_id()
            .return_once(move |_| Ok(Some(existing)));
        repo.expect_find_by_username()
            .return_once(|_| Ok(Some(user("9122222222"))));
        let changes = ProfileChanges::try_from_parts(None, None, Some("grace".into()), None)
            .expect("changes");

        let error = service(repo)
            .0
            .edit_profile(&id, changes)
            .await
            .expect_err("taken username");

        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn edit_profile_without_changes_skips_update(mut repo: MockUserRepository) {
        let existing = user("9121111111");
        let id = existing.id.clone();
        repo.expect_find_by_id()
            .return_once(move |_| Ok(Some(existing)));
        repo.expect_update().never();

        service(repo)
            .0
            .edit_profile(&id, ProfileChanges::default())
            .await
            .expect("no-op edit");
    }

    #[rstest]
    #[tokio::test]
    async fn profile_of_deleted_user_is_not_found(mut repo: MockUserRepository) {
        repo.expect_find_by_id().return_once(|_| Ok(None));

        let error = service(repo)
            .0
            .profile(&user("9121111111"))
            .await
            .expect_err("missing user");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}
