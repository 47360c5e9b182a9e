//! Recipe use-cases.
//!
//! The caller publishing a recipe becomes its chef. Chefs may remove their
//! own recipes; removing anyone else's needs the `all` permission.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{FileStorage, RecipeRepository, UserRepository};
use crate::domain::service_support::{
    discard_files, map_recipe_error, map_user_error, store_upload,
};
use crate::domain::upload::{IncomingFile, MediaClass, UploadKind};
use crate::domain::{
    AuthorSummary, Error, FORBIDDEN_MESSAGE, OwnerScope, Recipe, RecipeDraft, RecipeView, User,
    UserId,
};

const NOT_FOUND: &str = "Recipe not found";

/// Dependencies of [`RecipeService`].
#[derive(Clone)]
pub struct RecipeServicePorts {
    pub recipes: Arc<dyn RecipeRepository>,
    pub users: Arc<dyn UserRepository>,
    pub storage: Arc<dyn FileStorage>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Clone)]
pub struct RecipeService {
    ports: RecipeServicePorts,
}

/// Chef identity and recipe count, looked up once per chef.
type ChefCard = (Option<AuthorSummary>, usize);

impl RecipeService {
    pub fn new(ports: RecipeServicePorts) -> Self {
        Self { ports }
    }

    /// Recipes matching `keyword` (every recipe when `None`), newest first.
    pub async fn list(&self, keyword: Option<String>) -> Result<Vec<RecipeView>, Error> {
        let recipes = self
            .ports
            .recipes
            .list(keyword)
            .await
            .map_err(map_recipe_error)?;
        let mut chefs: HashMap<UserId, ChefCard> = HashMap::new();
        let mut views = Vec::with_capacity(recipes.len());
        for recipe in recipes {
            if !chefs.contains_key(&recipe.chef) {
                let card = self.chef_card(&recipe.chef).await?;
                chefs.insert(recipe.chef.clone(), card);
            }
            let (chef, chef_recipes) = chefs.get(&recipe.chef).cloned().unwrap_or_default();
            views.push(RecipeView {
                recipe,
                chef,
                chef_recipes,
            });
        }
        Ok(views)
    }

    pub async fn get(&self, id: Uuid) -> Result<RecipeView, Error> {
        let recipe = self.find(id).await?;
        self.view(recipe).await
    }

    /// Publish a recipe with `chef` as its author. The image is mandatory.
    pub async fn add(
        &self,
        chef: &User,
        draft: RecipeDraft,
        image: IncomingFile,
    ) -> Result<RecipeView, Error> {
        let now = self.ports.clock.utc();
        let image_path = store_upload(
            self.ports.storage.as_ref(),
            UploadKind::Recipes,
            MediaClass::Image,
            &image,
            now,
        )
        .await?;

        let recipe = draft.into_recipe(chef.id.clone(), image_path, now);
        if let Err(error) = self.ports.recipes.insert(&recipe).await {
            discard_files(self.ports.storage.as_ref(), [recipe.image]).await;
            return Err(map_recipe_error(error));
        }
        info!(recipe_id = %recipe.id, chef = %chef.id, "created recipe");
        self.view(recipe).await
    }

    /// Remove a recipe within `scope` together with its image.
    pub async fn remove(&self, id: Uuid, scope: &OwnerScope) -> Result<(), Error> {
        let recipe = self.find(id).await?;
        if !scope.covers(&recipe.chef) {
            return Err(Error::forbidden(FORBIDDEN_MESSAGE));
        }
        if !self
            .ports
            .recipes
            .delete(id)
            .await
            .map_err(map_recipe_error)?
        {
            return Err(Error::not_found(NOT_FOUND));
        }
        discard_files(self.ports.storage.as_ref(), [recipe.image]).await;
        info!(recipe_id = %id, "removed recipe");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Recipe, Error> {
        self.ports
            .recipes
            .find_by_id(id)
            .await
            .map_err(map_recipe_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }

    async fn chef_card(&self, chef: &UserId) -> Result<ChefCard, Error> {
        let summary = self
            .ports
            .users
            .find_by_id(chef)
            .await
            .map_err(map_user_error)?
            .as_ref()
            .map(AuthorSummary::from);
        let count = self
            .ports
            .recipes
            .count_by_chef(chef)
            .await
            .map_err(map_recipe_error)?;
        Ok((summary, count))
    }

    async fn view(&self, recipe: Recipe) -> Result<RecipeView, Error> {
        let (chef, chef_recipes) = self.chef_card(&recipe.chef).await?;
        Ok(RecipeView {
            recipe,
            chef,
            chef_recipes,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::{DateTime, TimeZone, Utc};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ports::{
        FileStorageError, MockFileStorage, MockRecipeRepository, MockUserRepository,
        RecipeRepositoryError,
    };
    use crate::domain::{ErrorCode, Mobile};
    use crate::test_support::MutableClock;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    struct Mocks {
        recipes: MockRecipeRepository,
        users: MockUserRepository,
        storage: MockFileStorage,
    }

    #[fixture]
    fn mocks() -> Mocks {
        Mocks {
            recipes: MockRecipeRepository::new(),
            users: MockUserRepository::new(),
            storage: MockFileStorage::new(),
        }
    }

    fn service(mocks: Mocks) -> RecipeService {
        RecipeService::new(RecipeServicePorts {
            recipes: Arc::new(mocks.recipes),
            users: Arc::new(mocks.users),
            storage: Arc::new(mocks.storage),
            clock: Arc::new(MutableClock::new(now())),
        })
    }

    fn chef() -> User {
        let mut user = User::from_mobile(Mobile::new("9121110000").expect("mobile"), now());
        user.first_name = Some("Samin".into());
        user
    }

    fn draft() -> RecipeDraft {
        RecipeDraft::try_from_parts(
            "Saffron rice",
            vec!["rice".into()],
            vec!["steam".into()],
            "40 min",
            "easy",
        )
        .expect("valid draft")
    }

    fn recipe(chef: &UserId) -> Recipe {
        draft().into_recipe(chef.clone(), "uploads/recipes/a.png".into(), now())
    }

    fn image() -> IncomingFile {
        IncomingFile {
            temp_path: PathBuf::from("/tmp/upload-1"),
            file_name: "dish.jpg".into(),
            size: 10,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn list_looks_each_chef_up_once(mut mocks: Mocks) {
        let chef = chef();
        let stored = vec![recipe(&chef.id), recipe(&chef.id)];
        mocks
            .recipes
            .expect_list()
            .withf(|keyword| keyword.as_deref() == Some("rice"))
            .return_once(move |_| Ok(stored));
        mocks.recipes.expect_count_by_chef().times(1).returning(|_| Ok(2));
        mocks
            .users
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(chef)));

        let views = service(mocks)
            .list(Some("rice".into()))
            .await
            .expect("list");

        assert_eq!(views.len(), 2);
        assert!(views.iter().all(|view| view.chef_recipes == 2));
        assert_eq!(
            views[0].chef.as_ref().and_then(|c| c.first_name.as_deref()),
            Some("Samin")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn add_discards_the_image_when_the_insert_fails(mut mocks: Mocks) {
        mocks.storage.expect_store().times(1).returning(|_, _| Ok(()));
        mocks
            .recipes
            .expect_insert()
            .return_once(|_| Err(RecipeRepositoryError::query("boom")));
        mocks
            .storage
            .expect_remove()
            .withf(|path| path.starts_with("uploads/recipes/2026/03/01/"))
            .times(1)
            .returning(|_| Ok(()));

        let error = service(mocks)
            .add(&chef(), draft(), image())
            .await
            .expect_err("insert failed");

        assert_eq!(error.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[tokio::test]
    async fn add_stops_when_storage_fails(mut mocks: Mocks) {
        mocks
            .storage
            .expect_store()
            .return_once(|_, _| Err(FileStorageError::io("uploads", "disk full")));
        mocks.recipes.expect_insert().never();

        let error = service(mocks)
            .add(&chef(), draft(), image())
            .await
            .expect_err("storage failed");

        assert_eq!(error.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[case(true, None)]
    #[case(false, Some(ErrorCode::Forbidden))]
    #[tokio::test]
    async fn only_the_chef_removes_without_all(
        mut mocks: Mocks,
        #[case] own: bool,
        #[case] expected: Option<ErrorCode>,
    ) {
        let chef = chef();
        let stored = recipe(&chef.id);
        let id = stored.id;
        mocks
            .recipes
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(stored)));
        mocks
            .recipes
            .expect_delete()
            .times(usize::from(own))
            .returning(|_| Ok(true));
        mocks
            .storage
            .expect_remove()
            .times(usize::from(own))
            .returning(|_| Ok(()));
        let scope = if own {
            OwnerScope::Own(chef.id.clone())
        } else {
            OwnerScope::Own(UserId::random())
        };

        let result = service(mocks).remove(id, &scope).await;

        assert_eq!(result.err().map(|e| e.code()), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn admins_remove_any_recipe(mut mocks: Mocks) {
        let stored = recipe(&UserId::random());
        let id = stored.id;
        mocks
            .recipes
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(stored)));
        mocks.recipes.expect_delete().return_once(|_| Ok(true));
        mocks.storage.expect_remove().returning(|_| Ok(()));

        service(mocks)
            .remove(id, &OwnerScope::Any)
            .await
            .expect("removed");
    }
}
