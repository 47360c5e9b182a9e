//! Project use-cases, always on behalf of the owner.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{FileStorage, ProjectRepository};
use crate::domain::service_support::{discard_files, map_project_error, store_upload};
use crate::domain::upload::{IncomingFile, MediaClass, UploadKind};
use crate::domain::{Error, Project, ProjectChanges, ProjectDraft, User};

const NOT_FOUND: &str = "Project Not Found";

/// Dependencies of [`ProjectService`].
#[derive(Clone)]
pub struct ProjectServicePorts {
    pub projects: Arc<dyn ProjectRepository>,
    pub storage: Arc<dyn FileStorage>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Clone)]
pub struct ProjectService {
    ports: ProjectServicePorts,
}

impl ProjectService {
    pub fn new(ports: ProjectServicePorts) -> Self {
        Self { ports }
    }

    /// The owner's projects, newest first.
    pub async fn list(&self, owner: &User) -> Result<Vec<Project>, Error> {
        self.ports
            .projects
            .list_by_owner(&owner.id)
            .await
            .map_err(map_project_error)
    }

    pub async fn get(&self, owner: &User, id: Uuid) -> Result<Project, Error> {
        self.ports
            .projects
            .find_owned(&owner.id, id)
            .await
            .map_err(map_project_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }

    pub async fn add(
        &self,
        owner: &User,
        draft: ProjectDraft,
        image: IncomingFile,
    ) -> Result<Project, Error> {
        let now = self.ports.clock.utc();
        let image_path = self.store(&image, now).await?;
        let project = draft.into_project(owner.id.clone(), image_path, now);
        if let Err(error) = self.ports.projects.insert(&project).await {
            discard_files(self.ports.storage.as_ref(), [project.image]).await;
            return Err(map_project_error(error));
        }
        info!(project_id = %project.id, owner = %owner.id, "created project");
        Ok(project)
    }

    /// Apply sparse text changes.
    pub async fn edit(
        &self,
        owner: &User,
        id: Uuid,
        changes: ProjectChanges,
    ) -> Result<Project, Error> {
        let mut project = self.get(owner, id).await?;
        changes.apply(&mut project, self.ports.clock.utc());
        self.save(&project).await?;
        Ok(project)
    }

    /// Replace the project image, removing the old file once saved.
    pub async fn replace_image(
        &self,
        owner: &User,
        id: Uuid,
        image: IncomingFile,
    ) -> Result<Project, Error> {
        let mut project = self.get(owner, id).await?;
        let now = self.ports.clock.utc();
        let new_image = self.store(&image, now).await?;
        let previous = std::mem::replace(&mut project.image, new_image);
        project.updated_at = now;
        if let Err(error) = self.save(&project).await {
            discard_files(self.ports.storage.as_ref(), [project.image]).await;
            return Err(error);
        }
        discard_files(self.ports.storage.as_ref(), [previous]).await;
        Ok(project)
    }

    pub async fn remove(&self, owner: &User, id: Uuid) -> Result<(), Error> {
        let project = self.get(owner, id).await?;
        if !self
            .ports
            .projects
            .delete_owned(&owner.id, id)
            .await
            .map_err(map_project_error)?
        {
            return Err(Error::not_found(NOT_FOUND));
        }
        discard_files(self.ports.storage.as_ref(), [project.image]).await;
        info!(project_id = %id, "removed project");
        Ok(())
    }

    async fn store(&self, image: &IncomingFile, now: DateTime<Utc>) -> Result<String, Error> {
        store_upload(
            self.ports.storage.as_ref(),
            UploadKind::Projects,
            MediaClass::Image,
            image,
            now,
        )
        .await
    }

    async fn save(&self, project: &Project) -> Result<(), Error> {
        match self.ports.projects.update(project).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(Error::not_found(NOT_FOUND)),
            Err(error) => Err(map_project_error(error)),
        }
    }
}
