//! Coffee menu use-cases.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{CoffeeRepository, FileStorage};
use crate::domain::service_support::{discard_files, map_coffee_error, store_upload};
use crate::domain::upload::{IncomingFile, MediaClass, UploadKind};
use crate::domain::{Coffee, CoffeeChanges, CoffeeDraft, Error};

const NOT_FOUND: &str = "Coffee Not Found";

/// Dependencies of [`CoffeeService`].
#[derive(Clone)]
pub struct CoffeeServicePorts {
    pub coffees: Arc<dyn CoffeeRepository>,
    pub storage: Arc<dyn FileStorage>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Clone)]
pub struct CoffeeService {
    ports: CoffeeServicePorts,
}

impl CoffeeService {
    pub fn new(ports: CoffeeServicePorts) -> Self {
        Self { ports }
    }

    pub async fn list(&self) -> Result<Vec<Coffee>, Error> {
        self.ports.coffees.list().await.map_err(map_coffee_error)
    }

    pub async fn get(&self, id: Uuid) -> Result<Coffee, Error> {
        self.ports
            .coffees
            .find_by_id(id)
            .await
            .map_err(map_coffee_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }

    pub async fn add(&self, draft: CoffeeDraft, image: IncomingFile) -> Result<Coffee, Error> {
        let now = self.ports.clock.utc();
        let image_path = self.store(&image, now).await?;
        let coffee = draft.into_coffee(image_path, now);
        if let Err(error) = self.ports.coffees.insert(&coffee).await {
            discard_files(self.ports.storage.as_ref(), [coffee.image]).await;
            return Err(map_coffee_error(error));
        }
        info!(coffee_id = %coffee.id, "added coffee");
        Ok(coffee)
    }

    pub async fn edit(&self, id: Uuid, changes: CoffeeChanges) -> Result<Coffee, Error> {
        let mut coffee = self.get(id).await?;
        changes.apply(&mut coffee, self.ports.clock.utc());
        self.save(&coffee).await?;
        Ok(coffee)
    }

    /// Swap the image; the old file goes once the new one is saved.
    pub async fn replace_image(&self, id: Uuid, image: IncomingFile) -> Result<Coffee, Error> {
        let mut coffee = self.get(id).await?;
        let now = self.ports.clock.utc();
        let new_image = self.store(&image, now).await?;
        let previous = std::mem::replace(&mut coffee.image, new_image);
        coffee.updated_at = now;
        if let Err(error) = self.save(&coffee).await {
            discard_files(self.ports.storage.as_ref(), [coffee.image]).await;
            return Err(error);
        }
        discard_files(self.ports.storage.as_ref(), [previous]).await;
        Ok(coffee)
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), Error> {
        let coffee = self.get(id).await?;
        if !self
            .ports
            .coffees
            .delete(id)
            .await
            .map_err(map_coffee_error)?
        {
            return Err(Error::not_found(NOT_FOUND));
        }
        discard_files(self.ports.storage.as_ref(), [coffee.image]).await;
        info!(coffee_id = %id, "removed coffee");
        Ok(())
    }

    async fn store(&self, image: &IncomingFile, now: DateTime<Utc>) -> Result<String, Error> {
        store_upload(
            self.ports.storage.as_ref(),
            UploadKind::Coffees,
            MediaClass::Image,
            image,
            now,
        )
        .await
    }

    async fn save(&self, coffee: &Coffee) -> Result<(), Error> {
        match self.ports.coffees.update(coffee).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(Error::not_found(NOT_FOUND)),
            Err(error) => Err(map_coffee_error(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockCoffeeRepository, MockFileStorage};
    use crate::test_support::MutableClock;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 12, 7, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    fn service(coffees: MockCoffeeRepository, storage: MockFileStorage) -> CoffeeService {
        CoffeeService::new(CoffeeServicePorts {
            coffees: Arc::new(coffees),
            storage: Arc::new(storage),
            clock: Arc::new(MutableClock::new(now())),
        })
    }

    fn espresso() -> Coffee {
        CoffeeDraft::try_from_parts("Espresso", "Short and dark", 90, None)
            .expect("valid draft")
            .into_coffee("uploads/coffees/espresso.png".into(), now())
    }

    #[rstest]
    #[tokio::test]
    async fn edit_of_a_missing_coffee_is_not_found() {
        let mut coffees = MockCoffeeRepository::new();
        coffees.expect_find_by_id().return_once(|_| Ok(None));
        coffees.expect_update().never();

        let error = service(coffees, MockFileStorage::new())
            .edit(Uuid::new_v4(), CoffeeChanges::default())
            .await
            .expect_err("missing");

        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.message(), NOT_FOUND);
    }

    #[rstest]
    #[tokio::test]
    async fn remove_deletes_the_image() {
        let stored = espresso();
        let id = stored.id;
        let mut coffees = MockCoffeeRepository::new();
        coffees
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(stored)));
        coffees.expect_delete().return_once(|_| Ok(true));
        let mut storage = MockFileStorage::new();
        storage
            .expect_remove()
            .withf(|path| path == "uploads/coffees/espresso.png")
            .times(1)
            .returning(|_| Ok(()));

        service(coffees, storage).remove(id).await.expect("removed");
    }
}
