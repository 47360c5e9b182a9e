//! Recipes published by signed-in users. The publisher is the chef; a
//! dish `image` is mandatory.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{RecipeDraft, RecipeView};
use crate::domain::rbac::permissions;
use crate::domain::upload::MediaClass;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::dto::{MessageDto, RecipeDto};
use crate::inbound::http::multipart::{FilePart, UploadForm};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, parse_uuid};

const IMAGE_PART: FilePart = FilePart::single("image", MediaClass::Image);

/// Documented shape of the recipe upload form.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeForm {
    pub title: Option<String>,
    /// Repeated `ingredients` parts or one comma separated value.
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
    #[schema(example = "45 min")]
    pub time: Option<String>,
    #[schema(example = "easy")]
    pub level: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<String>,
}

/// Keyword filter for the recipe search.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct KeywordQuery {
    /// Matched against titles, ingredients and instructions.
    pub keyword: Option<String>,
}

fn to_dtos(state: &HttpState, views: Vec<RecipeView>) -> Vec<RecipeDto> {
    views
        .into_iter()
        .map(|view| RecipeDto::new(view, &state.public_base_url))
        .collect()
}

#[utoipa::path(
    post,
    path = "/api/v1/recipes/create",
    request_body(content = RecipeForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Recipe published", body = RecipeDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "createRecipe"
)]
#[post("/recipes/create")]
pub async fn create_recipe(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let chef = caller.require(&state, permissions::PROFILE).await?;
    let mut form = UploadForm::read(payload, &state.upload_scratch, &[IMAGE_PART]).await?;
    let draft = RecipeDraft::try_from_parts(
        &form.text("title").unwrap_or_default(),
        form.list("ingredients").unwrap_or_default(),
        form.list("instructions").unwrap_or_default(),
        &form.text("time").unwrap_or_default(),
        &form.text("level").unwrap_or_default(),
    )?;
    let image = form
        .take_file("image")
        .ok_or_else(|| missing_field_error(FieldName::new("image")))?;
    let view = state.recipes.add(&chef, draft, image).await?;
    Ok(HttpResponse::Created().json(RecipeDto::new(view, &state.public_base_url)))
}

#[utoipa::path(
    get,
    path = "/api/v1/recipes/list",
    responses(
        (status = 200, description = "Recipes with their chefs, newest first", body = [RecipeDto]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "listRecipes"
)]
#[get("/recipes/list")]
pub async fn list_recipes(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<RecipeDto>>> {
    caller.require(&state, permissions::PROFILE).await?;
    let views = state.recipes.list(None).await?;
    Ok(web::Json(to_dtos(&state, views)))
}

#[utoipa::path(
    get,
    path = "/api/v1/recipes/search",
    params(KeywordQuery),
    responses(
        (status = 200, description = "Matching recipes, newest first", body = [RecipeDto]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "searchRecipes"
)]
#[get("/recipes/search")]
pub async fn search_recipes(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    query: web::Query<KeywordQuery>,
) -> ApiResult<web::Json<Vec<RecipeDto>>> {
    caller.require(&state, permissions::PROFILE).await?;
    let views = state.recipes.list(query.into_inner().keyword).await?;
    Ok(web::Json(to_dtos(&state, views)))
}

#[utoipa::path(
    get,
    path = "/api/v1/recipes/{id}",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe with its chef", body = RecipeDto),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Recipe not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "getRecipe"
)]
#[get("/recipes/{id}")]
pub async fn get_recipe(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<RecipeDto>> {
    caller.require(&state, permissions::PROFILE).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let view = state.recipes.get(id).await?;
    Ok(web::Json(RecipeDto::new(view, &state.public_base_url)))
}

/// Chefs remove their own recipes; the `all` permission removes any.
#[utoipa::path(
    delete,
    path = "/api/v1/recipes/remove/{id}",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe removed", body = MessageDto),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the chef", body = ErrorSchema),
        (status = 404, description = "Recipe not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "removeRecipe"
)]
#[delete("/recipes/remove/{id}")]
pub async fn remove_recipe(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageDto>> {
    let user = caller.require(&state, permissions::PROFILE).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let scope = state.rbac.owner_scope(&user).await?;
    state.recipes.remove(id, &scope).await?;
    Ok(web::Json(MessageDto::new("Recipe removed")))
}
