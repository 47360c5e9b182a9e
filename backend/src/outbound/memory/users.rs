//! In-memory `UserRepository`.

use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, Mobile, RoleTitle, User, UserId, Username};

use super::table::Table;

/// Users kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Table<User>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn clash(candidate: &User, other: &User) -> Option<&'static str> {
    if candidate.id == other.id {
        return None;
    }
    if candidate.mobile == other.mobile {
        return Some("mobile");
    }
    if candidate.username.is_some() && candidate.username == other.username {
        return Some("username");
    }
    if candidate.email.is_some() && candidate.email == other.email {
        return Some("email");
    }
    None
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        self.users.write(|rows| {
            if let Some(field) = rows.iter().find_map(|other| clash(user, other)) {
                return Err(UserPersistenceError::duplicate(field));
            }
            rows.push(user.clone());
            Ok(())
        })
    }

    async fn update(&self, user: &User) -> Result<bool, UserPersistenceError> {
        self.users.write(|rows| {
            if let Some(field) = rows.iter().find_map(|other| clash(user, other)) {
                return Err(UserPersistenceError::duplicate(field));
            }
            Ok(match rows.iter_mut().find(|row| row.id == user.id) {
                Some(slot) => {
                    *slot = user.clone();
                    true
                }
                None => false,
            })
        })
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.users.find(|user| &user.id == id))
    }

    async fn find_by_mobile(&self, mobile: &Mobile) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.users.find(|user| &user.mobile == mobile))
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.users.find(|user| user.username.as_ref() == Some(username)))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.users.find(|user| user.email.as_ref() == Some(email)))
    }

    async fn list(&self, search: Option<String>) -> Result<Vec<User>, UserPersistenceError> {
        let mut users = self.users.read(|rows| match search.as_deref() {
            Some(needle) => rows
                .iter()
                .filter(|user| user.matches_search(needle))
                .cloned()
                .collect::<Vec<_>>(),
            None => rows.to_vec(),
        });
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn reassign_role(
        &self,
        from: &RoleTitle,
        to: &RoleTitle,
    ) -> Result<usize, UserPersistenceError> {
        Ok(self.users.write(|rows| {
            let mut moved = 0;
            for user in rows.iter_mut().filter(|user| &user.role == from) {
                user.role = to.clone();
                moved += 1;
            }
            moved
        }))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;

    use super::*;

    fn user(mobile: &str) -> User {
        User::from_mobile(Mobile::new(mobile).expect("mobile"), Utc::now())
    }

    #[rstest]
    #[tokio::test]
    async fn insert_rejects_duplicate_mobile() {
        let repo = InMemoryUserRepository::new();
        repo.insert(&user("9120000001")).await.expect("first insert");

        let error = repo
            .insert(&user("9120000001"))
            .await
            .expect_err("duplicate mobile");

        assert_eq!(error, UserPersistenceError::duplicate("mobile"));
    }

    #[rstest]
    #[tokio::test]
    async fn list_filters_by_search() {
        let repo = InMemoryUserRepository::new();
        let mut ada = user("9120000001");
        ada.first_name = Some("Ada".into());
        repo.insert(&ada).await.expect("insert");
        repo.insert(&user("9120000002")).await.expect("insert");

        let found = repo.list(Some("ada".into())).await.expect("list");

        assert_eq!(found, vec![ada]);
    }

    #[rstest]
    #[tokio::test]
    async fn reassign_role_moves_only_matching_users() {
        let repo = InMemoryUserRepository::new();
        let mut writer = user("9120000001");
        writer.role = RoleTitle::new("WRITER");
        repo.insert(&writer).await.expect("insert");
        repo.insert(&user("9120000002")).await.expect("insert");

        let moved = repo
            .reassign_role(&RoleTitle::new("WRITER"), &RoleTitle::new("AUTHOR"))
            .await
            .expect("reassign");

        assert_eq!(moved, 1);
        let stored = repo.find_by_id(&writer.id).await.expect("lookup").expect("user");
        assert_eq!(stored.role, RoleTitle::new("AUTHOR"));
        let others = repo.list(Some("9120000002".into())).await.expect("list");
        assert_eq!(others[0].role, RoleTitle::user());
    }
}
