//! Content administration across categories, blogs and products.

mod support;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use campus::domain::rbac::roles;
use campus::test_support::{MultipartBody, TestBackend};
use rstest::rstest;
use serde_json::{Value, json};

use support::{send_as, send_form};

struct Admin {
    backend: TestBackend,
    bearer: String,
}

async fn content_manager() -> Admin {
    let backend = TestBackend::new().expect("test backend");
    let bearer = backend
        .bearer_for("9123000001", roles::CONTENT_MANAGER)
        .await;
    Admin { backend, bearer }
}

async fn add_category(admin: &Admin, title: &str, parent: Option<&str>) -> Value {
    let (status, category) = send_as(
        &admin.backend,
        &admin.bearer,
        TestRequest::post()
            .uri("/api/v1/admin/category/add")
            .set_json(json!({ "title": title, "parent": parent })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "add category: {category}");
    category
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().expect("id").to_owned()
}

#[rstest]
#[actix_web::test]
async fn removing_a_category_removes_its_subtree() {
    let admin = content_manager().await;
    let root = add_category(&admin, "Programming", None).await;
    let child = add_category(&admin, "Rust", Some(&id_of(&root))).await;
    add_category(&admin, "Async", Some(&id_of(&child))).await;
    add_category(&admin, "Design", None).await;

    let (status, tree) = send_as(
        &admin.backend,
        &admin.bearer,
        TestRequest::get().uri("/api/v1/admin/category/all"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tree.as_array().map(Vec::len), Some(2));

    let (status, removed) = send_as(
        &admin.backend,
        &admin.bearer,
        TestRequest::delete().uri(&format!("/api/v1/admin/category/remove/{}", id_of(&root))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["message"], "Removed 3 categories");

    let (_, remaining) = send_as(
        &admin.backend,
        &admin.bearer,
        TestRequest::get().uri("/api/v1/admin/category/list-of-all"),
    )
    .await;
    let titles: Vec<&str> = remaining
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|category| category["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Design"]);
}

#[rstest]
#[actix_web::test]
async fn blog_lifecycle_stores_and_serves_the_cover() {
    let admin = content_manager().await;
    let category = id_of(&add_category(&admin, "Articles", None).await);

    let form = MultipartBody::new()
        .text("title", "Ownership in practice")
        .text("shortText", "Borrowing without tears")
        .text("text", "Long form article")
        .text("tags", "rust,ownership")
        .text("category", &category)
        .file("image", "cover.webp", "image/webp", b"webp");
    let (status, blog) = send_form(
        &admin.backend,
        &admin.bearer,
        TestRequest::post().uri("/api/v1/admin/blogs/add"),
        form,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "add blog: {blog}");
    let image = blog["image"].as_str().expect("image path");
    assert!(admin.backend.upload_root().join(image).exists());
    assert_eq!(
        blog["imageUrl"],
        format!("{}/{image}", campus::test_support::TEST_BASE_URL)
    );

    let (status, listed) = send_as(
        &admin.backend,
        &admin.bearer,
        TestRequest::get().uri("/api/v1/admin/blogs"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let id = id_of(&blog);
    let (status, _) = send_as(
        &admin.backend,
        &admin.bearer,
        TestRequest::delete().uri(&format!("/api/v1/admin/blogs/{id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn product_search_matches_titles() {
    let admin = content_manager().await;
    let category = id_of(&add_category(&admin, "Store", None).await);

    for title in ["Mechanical keyboard", "Desk lamp"] {
        let form = MultipartBody::new()
            .text("title", title)
            .text("shortText", "Short")
            .text("text", "Details")
            .text("category", &category)
            .text("price", "250")
            .text("count", "3")
            .text("type", "physical")
            .file("images", "front.jpg", "image/jpeg", b"jpg");
        let (status, product) = send_form(
            &admin.backend,
            &admin.bearer,
            TestRequest::post().uri("/api/v1/admin/products/add"),
            form,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "add product: {product}");
    }

    let (status, found) = send_as(
        &admin.backend,
        &admin.bearer,
        TestRequest::get().uri("/api/v1/admin/products/list?search=keyboard"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(found.as_array().map(Vec::len), Some(1));
    assert_eq!(found[0]["title"], "Mechanical keyboard");
}

#[rstest]
#[case(roles::USER)]
#[case(roles::WRITER)]
#[actix_web::test]
async fn roles_without_the_category_permission_are_forbidden(#[case] role: &str) {
    let backend = TestBackend::new().expect("test backend");
    let bearer = backend.bearer_for("9123000002", role).await;

    let (status, error) = send_as(
        &backend,
        &bearer,
        TestRequest::post()
            .uri("/api/v1/admin/category/add")
            .set_json(json!({ "title": "Forbidden" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error["code"], "forbidden");
}

fn files_under(root: &std::path::Path) -> usize {
    let Ok(entries) = std::fs::read_dir(root) else {
        return 0;
    };
    entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() { files_under(&path) } else { 1 }
        })
        .sum()
}

fn blog_form(category: &str) -> MultipartBody {
    MultipartBody::new()
        .text("title", "Ownership in practice")
        .text("shortText", "Borrowing without tears")
        .text("text", "Long form article")
        .text("category", category)
}

#[rstest]
#[case::extension("cover.exe", 16, "The image format is not supported")]
#[case::oversized("cover.png", 1024 * 1024 + 1, "The image is larger than 1048576 bytes")]
#[actix_web::test]
async fn rejected_blog_covers_leave_nothing_behind(
    #[case] file_name: &str,
    #[case] size: usize,
    #[case] message: &str,
) {
    let admin = content_manager().await;
    let category = id_of(&add_category(&admin, "Articles", None).await);
    let form = blog_form(&category).file("image", file_name, "image/png", &vec![7_u8; size]);

    let (status, error) = send_form(
        &admin.backend,
        &admin.bearer,
        TestRequest::post().uri("/api/v1/admin/blogs/add"),
        form,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["message"], message);
    assert_eq!(error["details"]["field"], "image");
    assert_eq!(files_under(admin.backend.upload_root()), 0);
}

#[rstest]
#[actix_web::test]
async fn products_take_at_most_ten_images() {
    let admin = content_manager().await;
    let category = id_of(&add_category(&admin, "Store", None).await);
    let mut form = MultipartBody::new()
        .text("title", "Mechanical keyboard")
        .text("shortText", "Short")
        .text("text", "Details")
        .text("category", &category)
        .text("price", "250")
        .text("count", "3")
        .text("type", "physical");
    for index in 0..11 {
        form = form.file("images", &format!("{index}.jpg"), "image/jpeg", b"jpg");
    }

    let (status, error) = send_form(
        &admin.backend,
        &admin.bearer,
        TestRequest::post().uri("/api/v1/admin/products/add"),
        form,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["message"], "At most 10 images are allowed");
    assert_eq!(error["details"]["field"], "images");
    assert_eq!(files_under(admin.backend.upload_root()), 0);
}
