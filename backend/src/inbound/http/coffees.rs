//! Coffee shop menu administration. Every route requires the `product`
//! permission.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::rbac::permissions;
use crate::domain::upload::MediaClass;
use crate::domain::{Coffee, CoffeeChanges, CoffeeDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::dto::{CoffeeDto, MessageDto};
use crate::inbound::http::multipart::{FilePart, UploadForm};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_optional_i64, parse_uuid,
};

const IMAGE_PART: FilePart = FilePart::single("image", MediaClass::Image);

/// Documented shape of the menu item upload form.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    /// Defaults to one cup.
    pub quantity: Option<i64>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<String>,
}

/// Documented shape of the image replacement form.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CoffeeImageForm {
    #[schema(value_type = String, format = Binary)]
    pub image: String,
}

/// Request body for `PATCH /api/v1/admin/coffees/edit/{id}`. Blank text and
/// zero numbers leave a field unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditCoffeeRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub quantity: Option<i64>,
}

fn integer(form: &UploadForm, name: &'static str) -> ApiResult<Option<i64>> {
    parse_optional_i64(form.text(name), FieldName::new(name))
}

fn to_dto(state: &HttpState, coffee: Coffee) -> CoffeeDto {
    CoffeeDto::new(coffee, &state.public_base_url)
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/coffees/add",
    request_body(content = CoffeeForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Menu item added", body = CoffeeDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["coffees"],
    operation_id = "addCoffee"
)]
#[post("/admin/coffees/add")]
pub async fn add_coffee(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    caller.require(&state, permissions::PRODUCT).await?;
    let mut form = UploadForm::read(payload, &state.upload_scratch, &[IMAGE_PART]).await?;
    let price = integer(&form, "price")?.unwrap_or_default();
    let draft = CoffeeDraft::try_from_parts(
        &form.text("name").unwrap_or_default(),
        &form.text("description").unwrap_or_default(),
        price,
        integer(&form, "quantity")?,
    )?;
    let image = form
        .take_file("image")
        .ok_or_else(|| missing_field_error(FieldName::new("image")))?;
    let coffee = state.coffees.add(draft, image).await?;
    Ok(HttpResponse::Created().json(to_dto(&state, coffee)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/coffees/list",
    responses(
        (status = 200, description = "Menu items, newest first", body = [CoffeeDto]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["coffees"],
    operation_id = "listCoffees"
)]
#[get("/admin/coffees/list")]
pub async fn list_coffees(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<CoffeeDto>>> {
    caller.require(&state, permissions::PRODUCT).await?;
    let coffees = state.coffees.list().await?;
    Ok(web::Json(
        coffees
            .into_iter()
            .map(|coffee| to_dto(&state, coffee))
            .collect(),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/coffees/edit/{id}",
    params(("id" = String, Path, description = "Menu item id")),
    request_body = EditCoffeeRequest,
    responses(
        (status = 200, description = "Menu item updated", body = CoffeeDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Menu item not found", body = ErrorSchema)
    ),
    tags = ["coffees"],
    operation_id = "editCoffee"
)]
#[patch("/admin/coffees/edit/{id}")]
pub async fn edit_coffee(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<EditCoffeeRequest>,
) -> ApiResult<web::Json<CoffeeDto>> {
    caller.require(&state, permissions::PRODUCT).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let EditCoffeeRequest {
        name,
        description,
        price,
        quantity,
    } = payload.into_inner();
    let changes = CoffeeChanges::try_from_parts(name, description, price, quantity)?;
    let coffee = state.coffees.edit(id, changes).await?;
    Ok(web::Json(to_dto(&state, coffee)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/coffees/edit-image/{id}",
    params(("id" = String, Path, description = "Menu item id")),
    request_body(content = CoffeeImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image replaced", body = CoffeeDto),
        (status = 400, description = "Missing or unsupported image", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Menu item not found", body = ErrorSchema)
    ),
    tags = ["coffees"],
    operation_id = "editCoffeeImage"
)]
#[patch("/admin/coffees/edit-image/{id}")]
pub async fn edit_coffee_image(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: Multipart,
) -> ApiResult<web::Json<CoffeeDto>> {
    caller.require(&state, permissions::PRODUCT).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let mut form = UploadForm::read(payload, &state.upload_scratch, &[IMAGE_PART]).await?;
    let image = form
        .take_file("image")
        .ok_or_else(|| missing_field_error(FieldName::new("image")))?;
    let coffee = state.coffees.replace_image(id, image).await?;
    Ok(web::Json(to_dto(&state, coffee)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/coffees/{id}",
    params(("id" = String, Path, description = "Menu item id")),
    responses(
        (status = 200, description = "Menu item", body = CoffeeDto),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Menu item not found", body = ErrorSchema)
    ),
    tags = ["coffees"],
    operation_id = "getCoffee"
)]
#[get("/admin/coffees/{id}")]
pub async fn get_coffee(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<CoffeeDto>> {
    caller.require(&state, permissions::PRODUCT).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let coffee = state.coffees.get(id).await?;
    Ok(web::Json(to_dto(&state, coffee)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/coffees/remove/{id}",
    params(("id" = String, Path, description = "Menu item id")),
    responses(
        (status = 200, description = "Menu item removed", body = MessageDto),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Menu item not found", body = ErrorSchema)
    ),
    tags = ["coffees"],
    operation_id = "removeCoffee"
)]
#[delete("/admin/coffees/remove/{id}")]
pub async fn remove_coffee(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageDto>> {
    caller.require(&state, permissions::PRODUCT).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    state.coffees.remove(id).await?;
    Ok(web::Json(MessageDto::new("Coffee removed")))
}
