//! Store product administration.
//!
//! Products are posted as `multipart/form-data` with up to ten `images`
//! parts. Dimension fields are decimals; `colors` follows the same list
//! rules as `tags`.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::product::MAX_IMAGES;
use crate::domain::rbac::permissions;
use crate::domain::upload::MediaClass;
use crate::domain::{
    FeatureInput, ProductChanges, ProductChangesInput, ProductDraft, ProductDraftInput,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::dto::{MessageDto, ProductDto, SearchQuery};
use crate::inbound::http::multipart::{FilePart, UploadForm};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_optional_f64, parse_optional_i64, parse_optional_uuid, parse_uuid,
    require_uuid,
};

/// The product gallery.
const IMAGE_PARTS: FilePart = FilePart::many("images", MediaClass::Image, MAX_IMAGES);

/// Documented shape of the product upload form.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    pub title: Option<String>,
    pub short_text: Option<String>,
    pub text: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category: Option<String>,
    pub price: Option<i64>,
    pub discount: Option<i64>,
    pub count: Option<i64>,
    #[schema(example = "physical")]
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub colors: Option<Vec<String>>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub length: Option<f64>,
    pub weight: Option<f64>,
    #[schema(value_type = Option<Vec<String>>, format = Binary)]
    pub images: Option<Vec<String>>,
}

fn features(form: &UploadForm) -> ApiResult<FeatureInput> {
    Ok(FeatureInput {
        colors: form.list("colors"),
        width: parse_optional_f64(form.text("width"), FieldName::new("width"))?,
        height: parse_optional_f64(form.text("height"), FieldName::new("height"))?,
        length: parse_optional_f64(form.text("length"), FieldName::new("length"))?,
        weight: parse_optional_f64(form.text("weight"), FieldName::new("weight"))?,
    })
}

fn integer(form: &UploadForm, name: &'static str) -> ApiResult<Option<i64>> {
    parse_optional_i64(form.text(name), FieldName::new(name))
}

fn draft_from(form: &UploadForm) -> ApiResult<ProductDraft> {
    let input = ProductDraftInput {
        title: form.text("title").unwrap_or_default(),
        short_text: form.text("shortText").unwrap_or_default(),
        text: form.text("text").unwrap_or_default(),
        tags: form.list("tags").unwrap_or_default(),
        category: require_uuid(form.text("category"), FieldName::new("category"))?,
        price: integer(form, "price")?.unwrap_or_default(),
        discount: integer(form, "discount")?.unwrap_or_default(),
        count: integer(form, "count")?.unwrap_or_default(),
        kind: form.text("type").unwrap_or_default(),
        features: features(form)?,
    };
    Ok(ProductDraft::try_from_input(input)?)
}

fn changes_from(form: &UploadForm) -> ApiResult<ProductChanges> {
    let input = ProductChangesInput {
        title: form.text("title"),
        short_text: form.text("shortText"),
        text: form.text("text"),
        tags: form.list("tags"),
        category: parse_optional_uuid(form.text("category"), FieldName::new("category"))?,
        price: integer(form, "price")?,
        discount: integer(form, "discount")?,
        count: integer(form, "count")?,
        kind: form.text("type"),
        features: features(form)?,
    };
    Ok(ProductChanges::try_from_input(input)?)
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/products/list",
    params(SearchQuery),
    responses(
        (status = 200, description = "Products, newest first", body = [ProductDto]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin-products"],
    operation_id = "listProducts"
)]
#[get("/admin/products/list")]
pub async fn list_products(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<Vec<ProductDto>>> {
    caller.require(&state, permissions::PRODUCT).await?;
    let products = state.products.list(query.into_inner().search).await?;
    Ok(web::Json(
        products
            .into_iter()
            .map(|product| ProductDto::new(product, &state.public_base_url))
            .collect(),
    ))
}

/// List a product; the caller becomes its supplier.
#[utoipa::path(
    post,
    path = "/api/v1/admin/products/add",
    request_body(content = ProductForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Product created", body = ProductDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Category not found", body = ErrorSchema)
    ),
    tags = ["admin-products"],
    operation_id = "addProduct"
)]
#[post("/admin/products/add")]
pub async fn add_product(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let supplier = caller.require(&state, permissions::PRODUCT).await?;
    let mut form = UploadForm::read(payload, &state.upload_scratch, &[IMAGE_PARTS]).await?;
    let draft = draft_from(&form)?;
    let product = state
        .products
        .add(&supplier, draft, form.take_files("images"))
        .await?;
    Ok(HttpResponse::Created().json(ProductDto::new(product, &state.public_base_url)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = ProductDto),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Product not found", body = ErrorSchema)
    ),
    tags = ["admin-products"],
    operation_id = "getProduct"
)]
#[get("/admin/products/{id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProductDto>> {
    caller.require(&state, permissions::PRODUCT).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let product = state.products.get(id).await?;
    Ok(web::Json(ProductDto::new(product, &state.public_base_url)))
}

/// Sparse update. Feature fields merge into the stored set; any uploaded
/// images replace the whole gallery.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/products/edit/{id}",
    params(("id" = String, Path, description = "Product id")),
    request_body(content = ProductForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product updated", body = ProductDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Product or category not found", body = ErrorSchema)
    ),
    tags = ["admin-products"],
    operation_id = "editProduct"
)]
#[patch("/admin/products/edit/{id}")]
pub async fn edit_product(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: Multipart,
) -> ApiResult<web::Json<ProductDto>> {
    caller.require(&state, permissions::PRODUCT).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let mut form = UploadForm::read(payload, &state.upload_scratch, &[IMAGE_PARTS]).await?;
    let changes = changes_from(&form)?;
    let product = state
        .products
        .edit(id, changes, form.take_files("images"))
        .await?;
    Ok(web::Json(ProductDto::new(product, &state.public_base_url)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/products/remove/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product removed", body = MessageDto),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Product not found", body = ErrorSchema)
    ),
    tags = ["admin-products"],
    operation_id = "removeProduct"
)]
#[delete("/admin/products/remove/{id}")]
pub async fn remove_product(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageDto>> {
    caller.require(&state, permissions::PRODUCT).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    state.products.remove(id).await?;
    Ok(web::Json(MessageDto::new("Product removed")))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
    use actix_web::test::TestRequest;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::rbac::roles;
    use crate::inbound::http::test_utils::send;
    use crate::test_support::{MultipartBody, TestBackend};

    struct Fixture {
        backend: TestBackend,
        bearer: String,
        category: String,
    }

    async fn fixture() -> Fixture {
        let backend = TestBackend::new().expect("backend");
        let bearer = backend.bearer_for("9120000030", roles::SUPPLIER).await;
        let category = backend
            .data()
            .categories
            .add("Hardware", None)
            .await
            .expect("category")
            .id
            .to_string();
        Fixture {
            backend,
            bearer,
            category,
        }
    }

    async fn submit(fx: &Fixture, req: TestRequest, form: MultipartBody) -> (StatusCode, Value) {
        let (content_type, body) = form.finish();
        send(
            &fx.backend,
            req.insert_header((AUTHORIZATION, fx.bearer.as_str()))
                .insert_header((CONTENT_TYPE, content_type))
                .set_payload(body),
        )
        .await
    }

    fn keyboard(category: &str) -> MultipartBody {
        MultipartBody::new()
            .text("title", "Mechanical keyboard")
            .text("shortText", "Clicky")
            .text("text", "Hot swappable switches")
            .text("category", category)
            .text("price", "120")
            .text("count", "4")
            .text("type", "physical")
            .text("colors", "black,white")
            .text("width", "35.5")
            .file("images", "front.jpg", "image/jpeg", b"jpg")
            .file("images", "back.webp", "image/webp", b"webp")
    }

    async fn add(fx: &Fixture) -> Value {
        let (status, product) = submit(
            fx,
            TestRequest::post().uri("/api/v1/admin/products/add"),
            keyboard(&fx.category),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        product
    }

    #[rstest]
    #[actix_web::test]
    async fn add_records_supplier_features_and_images() {
        let fx = fixture().await;

        let product = add(&fx).await;

        assert_eq!(product["type"], "physical");
        assert_eq!(product["discount"], 0);
        assert_eq!(product["features"]["colors"], json!(["black", "white"]));
        assert_eq!(product["features"]["width"], 35.5);
        assert_eq!(product["features"]["height"], 0.0);
        assert_eq!(product["imagesUrl"].as_array().map(Vec::len), Some(2));
    }

    #[rstest]
    #[actix_web::test]
    async fn add_rejects_non_numeric_prices() {
        let fx = fixture().await;
        let form = MultipartBody::new()
            .text("title", "Mechanical keyboard")
            .text("category", &fx.category)
            .text("price", "cheap");

        let (status, error) = submit(
            &fx,
            TestRequest::post().uri("/api/v1/admin/products/add"),
            form,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["details"]["field"], "price");
    }

    #[rstest]
    #[actix_web::test]
    async fn edit_merges_features_and_replaces_images() {
        let fx = fixture().await;
        let product = add(&fx).await;
        let id = product["id"].as_str().expect("id");
        let old_image = product["images"][0].as_str().expect("image").to_owned();

        let (status, edited) = submit(
            &fx,
            TestRequest::patch().uri(&format!("/api/v1/admin/products/edit/{id}")),
            MultipartBody::new()
                .text("height", "4")
                .text("price", "")
                .file("images", "new.png", "image/png", b"png"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(edited["price"], 120);
        assert_eq!(edited["features"]["width"], 35.5);
        assert_eq!(edited["features"]["height"], 4.0);
        assert_eq!(edited["images"].as_array().map(Vec::len), Some(1));
        assert!(!fx.backend.upload_root().join(old_image).exists());
    }

    #[rstest]
    #[actix_web::test]
    async fn list_filters_by_search_term() {
        let fx = fixture().await;
        add(&fx).await;

        let (_, hits) = send(
            &fx.backend,
            TestRequest::get()
                .uri("/api/v1/admin/products/list?search=KEYBOARD")
                .insert_header((AUTHORIZATION, fx.bearer.as_str())),
        )
        .await;
        let (_, misses) = send(
            &fx.backend,
            TestRequest::get()
                .uri("/api/v1/admin/products/list?search=mouse")
                .insert_header((AUTHORIZATION, fx.bearer.as_str())),
        )
        .await;

        assert_eq!(hits.as_array().map(Vec::len), Some(1));
        assert_eq!(misses, json!([]));
    }

    #[rstest]
    #[actix_web::test]
    async fn remove_deletes_images() {
        let fx = fixture().await;
        let product = add(&fx).await;
        let id = product["id"].as_str().expect("id");
        let image = product["images"][0].as_str().expect("image").to_owned();

        let (status, _) = send(
            &fx.backend,
            TestRequest::delete()
                .uri(&format!("/api/v1/admin/products/remove/{id}"))
                .insert_header((AUTHORIZATION, fx.bearer.as_str())),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(!fx.backend.upload_root().join(image).exists());
    }
}
