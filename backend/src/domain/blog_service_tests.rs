//! Tests for the blog service.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockBlogRepository, MockCategoryRepository, MockFileStorage, MockUserRepository,
};
use crate::domain::{Category, ErrorCode, Mobile};
use crate::test_support::MutableClock;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 9, 14, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct Mocks {
    blogs: MockBlogRepository,
    users: MockUserRepository,
    categories: MockCategoryRepository,
    storage: MockFileStorage,
}

#[fixture]
fn mocks() -> Mocks {
    Mocks {
        blogs: MockBlogRepository::new(),
        users: MockUserRepository::new(),
        categories: MockCategoryRepository::new(),
        storage: MockFileStorage::new(),
    }
}

fn service(mocks: Mocks) -> BlogService {
    BlogService::new(BlogServicePorts {
        blogs: Arc::new(mocks.blogs),
        users: Arc::new(mocks.users),
        categories: Arc::new(mocks.categories),
        storage: Arc::new(mocks.storage),
        clock: Arc::new(MutableClock::new(now())),
    })
}

fn author() -> User {
    let mut user = User::from_mobile(Mobile::new("9121234567").expect("mobile"), now());
    user.first_name = Some("Ada".to_owned());
    user
}

fn music() -> Category {
    Category {
        id: Uuid::new_v4(),
        title: "Music".to_owned(),
        parent: None,
    }
}

fn draft(category: Uuid) -> BlogDraft {
    BlogDraft::try_from_parts("Scales", "Practice daily", "Body", Vec::new(), category)
        .expect("valid draft")
}

fn png() -> IncomingFile {
    IncomingFile {
        temp_path: PathBuf::from("/tmp/upload-1"),
        file_name: "cover.png".to_owned(),
        size: 512,
    }
}

#[rstest]
#[tokio::test]
async fn add_stores_image_under_dated_path(mut mocks: Mocks) {
    let category = music();
    let category_id = category.id;
    let writer = author();
    let lookup = writer.clone();
    mocks
        .categories
        .expect_find_by_id()
        .times(2)
        .returning(move |_| Ok(Some(category.clone())));
    mocks
        .storage
        .expect_store()
        .withf(|_, path| path.starts_with("uploads/blogs/2026/05/09/") && path.ends_with(".png"))
        .times(1)
        .return_once(|_, _| Ok(()));
    mocks.blogs.expect_insert().times(1).return_once(|_| Ok(()));
    mocks
        .users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(lookup)));

    let view = service(mocks)
        .add(&writer, draft(category_id), Some(png()))
        .await
        .expect("blog created");

    assert_eq!(view.category_title.as_deref(), Some("Music"));
    assert_eq!(
        view.author.and_then(|a| a.first_name).as_deref(),
        Some("Ada")
    );
    assert!(view.blog.image.is_some());
}

#[rstest]
#[tokio::test]
async fn add_rejects_unknown_category(mut mocks: Mocks) {
    mocks
        .categories
        .expect_find_by_id()
        .return_once(|_| Ok(None));

    let error = service(mocks)
        .add(&author(), draft(Uuid::new_v4()), Some(png()))
        .await
        .expect_err("unknown category");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn add_rejects_unsupported_image(mut mocks: Mocks) {
    let category = music();
    let category_id = category.id;
    mocks
        .categories
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(category)));
    let mut file = png();
    file.file_name = "cover.bmp".to_owned();

    let error = service(mocks)
        .add(&author(), draft(category_id), Some(file))
        .await
        .expect_err("bad extension");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn update_replaces_image_and_removes_old_file(mut mocks: Mocks) {
    let category = music();
    let mut blog = draft(category.id).into_blog(author().id, Some("uploads/blogs/old.png".into()), now());
    blog.title = "Old".to_owned();
    let id = blog.id;
    mocks
        .blogs
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(blog)));
    mocks.storage.expect_store().return_once(|_, _| Ok(()));
    mocks
        .blogs
        .expect_update()
        .withf(|blog| blog.title == "Renamed" && blog.image.as_deref() != Some("uploads/blogs/old.png"))
        .return_once(|_| Ok(true));
    mocks
        .storage
        .expect_remove()
        .withf(|path| path == "uploads/blogs/old.png")
        .times(1)
        .return_once(|_| Ok(()));
    mocks.users.expect_find_by_id().return_once(|_| Ok(None));
    mocks
        .categories
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(category)));
    let changes = BlogChanges::try_from_parts(Some("Renamed".into()), None, None, None, None)
        .expect("valid changes");

    let view = service(mocks)
        .update(id, changes, Some(png()))
        .await
        .expect("updated");

    assert!(view.author.is_none());
}

#[rstest]
#[tokio::test]
async fn delete_removes_image(mut mocks: Mocks) {
    let blog = draft(Uuid::new_v4()).into_blog(author().id, Some("uploads/blogs/a.png".into()), now());
    let id = blog.id;
    mocks
        .blogs
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(blog)));
    mocks.blogs.expect_delete().return_once(|_| Ok(true));
    mocks
        .storage
        .expect_remove()
        .withf(|path| path == "uploads/blogs/a.png")
        .times(1)
        .return_once(|_| Ok(()));

    service(mocks).delete(id).await.expect("deleted");
}

#[rstest]
#[tokio::test]
async fn list_looks_up_each_author_once(mut mocks: Mocks) {
    let category = music();
    let writer = author();
    let writer_id = writer.id.clone();
    let posts = vec![
        draft(category.id).into_blog(writer_id.clone(), None, now()),
        draft(category.id).into_blog(writer_id, None, now()),
    ];
    mocks.blogs.expect_list().return_once(move || Ok(posts));
    mocks
        .categories
        .expect_list_all()
        .return_once(move || Ok(vec![category]));
    mocks
        .users
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(writer)));

    let views = service(mocks).list().await.expect("listed");

    assert_eq!(views.len(), 2);
    assert!(views.iter().all(|view| view.author.is_some()));
    assert!(views
        .iter()
        .all(|view| view.category_title.as_deref() == Some("Music")));
}
