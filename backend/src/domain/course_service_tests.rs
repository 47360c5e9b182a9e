//! Tests for course, chapter and episode use-cases.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::course::{CourseChangesInput, CourseDraftInput, CourseKind};
use crate::domain::ports::{
    CourseEdit, CourseRepositoryError, MockCategoryRepository, MockCourseRepository,
    MockFileStorage, MockVideoDurationProbe, VideoProbeError,
};
use crate::domain::{Category, ErrorCode, Mobile};
use crate::test_support::MutableClock;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 14, 10, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct Mocks {
    courses: MockCourseRepository,
    categories: MockCategoryRepository,
    storage: MockFileStorage,
    probe: MockVideoDurationProbe,
}

#[fixture]
fn mocks() -> Mocks {
    Mocks {
        courses: MockCourseRepository::new(),
        categories: MockCategoryRepository::new(),
        storage: MockFileStorage::new(),
        probe: MockVideoDurationProbe::new(),
    }
}

fn service(mocks: Mocks) -> CourseService {
    CourseService::new(CourseServicePorts {
        courses: Arc::new(mocks.courses),
        categories: Arc::new(mocks.categories),
        storage: Arc::new(mocks.storage),
        probe: Arc::new(mocks.probe),
        clock: Arc::new(MutableClock::new(now())),
    })
}

fn instructor() -> User {
    User::from_mobile(Mobile::new("9390000000").expect("mobile"), now())
}

fn draft_input(kind: &str, price: i64) -> CourseDraftInput {
    CourseDraftInput {
        title: "Rust for beginners".into(),
        short_desc: "Ownership and borrowing".into(),
        full_desc: "A long description".into(),
        tags: vec!["rust".into()],
        category: Uuid::new_v4(),
        price,
        discount: 0,
        kind: kind.into(),
        status: None,
    }
}

fn course_with_episode() -> Course {
    let mut course = CourseDraft::try_from_input(draft_input("cash", 100))
        .expect("valid draft")
        .into_course(instructor().id, "uploads/courses/cover.png".into(), now());
    let mut chapter = ChapterDraft::try_from_parts("Basics", "Intro")
        .expect("chapter")
        .into_chapter();
    chapter.episodes.push(
        EpisodeDraft::try_from_parts("Hello", "First steps", "unlock")
            .expect("episode")
            .into_episode("00:05:00".into(), "uploads/episodes/old.mp4".into()),
    );
    course.chapters.push(chapter);
    course
}

type Stored = Arc<Mutex<Option<Course>>>;

/// Answer `modify` by running the edit against `course`, keeping whatever
/// was written in the returned cell.
fn expect_modify(mocks: &mut Mocks, course: Course) -> Stored {
    let stored: Stored = Arc::default();
    let sink = Arc::clone(&stored);
    mocks.courses.expect_modify().times(1).return_once(
        move |_, edit: CourseEdit| -> Result<CourseRevision, CourseRepositoryError> {
            let before = course.clone();
            let mut after = course;
            if !edit(&mut after) {
                return Ok(CourseRevision::Rejected(before));
            }
            *sink.lock().expect("stored course") = Some(after.clone());
            Ok(CourseRevision::Saved { before, after })
        },
    );
    stored
}

fn written(stored: &Stored) -> Course {
    stored
        .lock()
        .expect("stored course")
        .clone()
        .expect("course was written")
}

fn video(name: &str) -> IncomingFile {
    IncomingFile {
        temp_path: PathBuf::from("/tmp/video"),
        file_name: name.to_owned(),
        size: 4_096,
    }
}

fn expect_video_probe(mocks: &mut Mocks, seconds: f64) {
    mocks.storage.expect_store().return_once(|_, _| Ok(()));
    mocks
        .storage
        .expect_resolve()
        .returning(|path| Ok(Path::new("/srv/public").join(path)));
    mocks
        .probe
        .expect_probe()
        .withf(|path| path.starts_with("/srv/public/uploads/episodes"))
        .return_once(move |_| Ok(seconds));
}

#[rstest]
fn free_courses_must_not_be_priced() {
    let violation = CourseDraft::try_from_input(draft_input("free", 10)).expect_err("priced free");
    assert_eq!(violation.to_string(), "For free courses, price should be 0");
}

#[rstest]
#[tokio::test]
async fn add_stores_cover_image(mut mocks: Mocks) {
    mocks.categories.expect_find_by_id().return_once(|id| {
        Ok(Some(Category {
            id,
            title: "Programming".into(),
            parent: None,
        }))
    });
    mocks
        .storage
        .expect_store()
        .withf(|_, path| path.starts_with("uploads/courses/2026/02/14/"))
        .return_once(|_, _| Ok(()));
    mocks.courses.expect_insert().return_once(|_| Ok(()));
    let draft = CourseDraft::try_from_input(draft_input("cash", 100)).expect("draft");

    let course = service(mocks)
        .add(&instructor(), draft, video("cover.jpg"))
        .await
        .expect("course created");

    assert!(course.image.ends_with(".jpg"));
    assert!(course.chapters.is_empty());
}

#[rstest]
#[tokio::test]
async fn edit_rejects_pricing_a_free_course(mut mocks: Mocks) {
    let mut course = course_with_episode();
    course.kind = CourseKind::Free;
    course.price = 0;
    let id = course.id;
    mocks
        .courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));
    let changes = CourseChanges::try_from_input(CourseChangesInput {
        price: Some(50),
        ..CourseChangesInput::default()
    })
    .expect("changes");

    let error = service(mocks)
        .edit(id, changes, None)
        .await
        .expect_err("priced free course");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "For free courses, price should be 0");
}

#[rstest]
#[tokio::test]
async fn add_chapter_appends_to_course(mut mocks: Mocks) {
    let course = course_with_episode();
    let id = course.id;
    let stored = expect_modify(&mut mocks, course);

    let chapter = service(mocks)
        .add_chapter(id, ChapterDraft::try_from_parts("Traits", "").expect("draft"))
        .await
        .expect("chapter added");

    assert!(chapter.episodes.is_empty());
    let course = written(&stored);
    assert_eq!(course.chapters.len(), 2);
    assert_eq!(course.chapters[1].title, "Traits");
}

#[rstest]
#[tokio::test]
async fn remove_chapter_discards_episode_videos(mut mocks: Mocks) {
    let course = course_with_episode();
    let chapter_id = course.chapters[0].id;
    let owner = course.clone();
    mocks
        .courses
        .expect_find_by_chapter()
        .return_once(move |_| Ok(Some(owner)));
    let stored = expect_modify(&mut mocks, course);
    mocks
        .storage
        .expect_remove()
        .withf(|path| path == "uploads/episodes/old.mp4")
        .times(1)
        .return_once(|_| Ok(()));

    service(mocks)
        .remove_chapter(chapter_id)
        .await
        .expect("chapter removed");

    assert!(written(&stored).chapters.is_empty());
}

#[rstest]
#[tokio::test]
async fn update_unknown_chapter_is_not_found(mut mocks: Mocks) {
    mocks
        .courses
        .expect_find_by_chapter()
        .return_once(|_| Ok(None));
    let changes = ChapterChanges::try_from_parts(Some("Renamed".into()), None).expect("changes");

    let error = service(mocks)
        .update_chapter(Uuid::new_v4(), changes)
        .await
        .expect_err("unknown chapter");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), CHAPTER_NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn add_episode_probes_duration(mut mocks: Mocks) {
    let course = course_with_episode();
    let course_id = course.id;
    let chapter_id = course.chapters[0].id;
    let current = course.clone();
    mocks
        .courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(current)));
    expect_video_probe(&mut mocks, 3_725.4);
    let stored = expect_modify(&mut mocks, course);
    let draft = EpisodeDraft::try_from_parts("Borrowing", "References", "lock").expect("draft");

    let episode = service(mocks)
        .add_episode(course_id, chapter_id, draft, video("lesson.mp4"))
        .await
        .expect("episode added");

    assert_eq!(episode.time, "01:02:05");
    assert!(episode.video_address.starts_with("uploads/episodes/2026/02/14/"));
    assert_eq!(written(&stored).total_time(), "01:07:05");
}

#[rstest]
#[tokio::test]
async fn add_episode_discards_video_when_probe_fails(mut mocks: Mocks) {
    let course = course_with_episode();
    let course_id = course.id;
    let chapter_id = course.chapters[0].id;
    mocks
        .courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));
    mocks.storage.expect_store().return_once(|_, _| Ok(()));
    mocks
        .storage
        .expect_resolve()
        .returning(|path| Ok(PathBuf::from(path)));
    mocks
        .probe
        .expect_probe()
        .return_once(|_| Err(VideoProbeError::unavailable("ffprobe missing")));
    mocks.storage.expect_remove().times(1).return_once(|_| Ok(()));
    let draft = EpisodeDraft::try_from_parts("Borrowing", "References", "lock").expect("draft");

    let error = service(mocks)
        .add_episode(course_id, chapter_id, draft, video("lesson.mp4"))
        .await
        .expect_err("probe failure");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn add_episode_rejects_images(mut mocks: Mocks) {
    let course = course_with_episode();
    let course_id = course.id;
    let chapter_id = course.chapters[0].id;
    mocks
        .courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));
    let draft = EpisodeDraft::try_from_parts("Borrowing", "References", "lock").expect("draft");

    let error = service(mocks)
        .add_episode(course_id, chapter_id, draft, video("lesson.png"))
        .await
        .expect_err("not a video");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn edit_episode_without_video_keeps_time_and_address(mut mocks: Mocks) {
    let course = course_with_episode();
    let episode_id = course.chapters[0].episodes[0].id;
    let owner = course.clone();
    mocks
        .courses
        .expect_find_by_episode()
        .return_once(move |_| Ok(Some(owner)));
    expect_modify(&mut mocks, course);
    let changes = EpisodeChanges::try_from_parts(Some("Hello again".into()), None, None)
        .expect("changes");

    let episode = service(mocks)
        .edit_episode(episode_id, changes, None)
        .await
        .expect("episode edited");

    assert_eq!(episode.title, "Hello again");
    assert_eq!(episode.time, "00:05:00");
    assert_eq!(episode.video_address, "uploads/episodes/old.mp4");
}

#[rstest]
#[tokio::test]
async fn edit_episode_with_video_reprobes_and_discards_old(mut mocks: Mocks) {
    let course = course_with_episode();
    let episode_id = course.chapters[0].episodes[0].id;
    let owner = course.clone();
    mocks
        .courses
        .expect_find_by_episode()
        .return_once(move |_| Ok(Some(owner)));
    expect_video_probe(&mut mocks, 61.0);
    expect_modify(&mut mocks, course);
    mocks
        .storage
        .expect_remove()
        .withf(|path| path == "uploads/episodes/old.mp4")
        .times(1)
        .return_once(|_| Ok(()));

    let episode = service(mocks)
        .edit_episode(episode_id, EpisodeChanges::default(), Some(video("new.mkv")))
        .await
        .expect("episode edited");

    assert_eq!(episode.time, "00:01:01");
    assert!(episode.video_address.ends_with(".mkv"));
}

#[rstest]
#[tokio::test]
async fn remove_episode_discards_video(mut mocks: Mocks) {
    let course = course_with_episode();
    let episode_id = course.chapters[0].episodes[0].id;
    let owner = course.clone();
    mocks
        .courses
        .expect_find_by_episode()
        .return_once(move |_| Ok(Some(owner)));
    let stored = expect_modify(&mut mocks, course);
    mocks
        .storage
        .expect_remove()
        .withf(|path| path == "uploads/episodes/old.mp4")
        .times(1)
        .return_once(|_| Ok(()));

    service(mocks)
        .remove_episode(episode_id)
        .await
        .expect("episode removed");

    assert!(written(&stored).chapters[0].episodes.is_empty());
}

#[rstest]
#[tokio::test]
async fn add_episode_discards_video_when_chapter_vanishes(mut mocks: Mocks) {
    let course = course_with_episode();
    let course_id = course.id;
    let chapter_id = course.chapters[0].id;
    let mut concurrently_edited = course.clone();
    concurrently_edited.chapters.clear();
    mocks
        .courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));
    expect_video_probe(&mut mocks, 30.0);
    expect_modify(&mut mocks, concurrently_edited);
    mocks.storage.expect_remove().times(1).return_once(|_| Ok(()));
    let draft = EpisodeDraft::try_from_parts("Borrowing", "References", "lock").expect("draft");

    let error = service(mocks)
        .add_episode(course_id, chapter_id, draft, video("lesson.mp4"))
        .await
        .expect_err("chapter removed meanwhile");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), CHAPTER_NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn add_chapter_to_unknown_course_is_not_found(mut mocks: Mocks) {
    mocks
        .courses
        .expect_modify()
        .return_once(|_, _| Ok(CourseRevision::Missing));

    let error = service(mocks)
        .add_chapter(Uuid::new_v4(), ChapterDraft::try_from_parts("Traits", "").expect("draft"))
        .await
        .expect_err("unknown course");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), COURSE_NOT_FOUND);
}
