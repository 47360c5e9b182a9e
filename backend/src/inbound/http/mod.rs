//! HTTP inbound adapter exposing REST endpoints.
//!
//! Every resource module contributes handlers; [`configure`] mounts them
//! inside the `/api/v1` scope built by the server.

use actix_web::{HttpRequest, error::JsonPayloadError, error::QueryPayloadError, web};

use crate::domain::Error;

pub mod account;
pub mod auth;
pub mod blogs;
pub mod categories;
pub mod chapters;
pub mod coffees;
pub mod courses;
pub mod dto;
pub mod episodes;
pub mod error;
pub mod health;
pub mod index;
pub mod multipart;
pub mod permissions;
pub mod products;
pub mod projects;
pub mod recipes;
pub mod roles;
pub mod schemas;
pub mod state;
pub mod teams;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Largest JSON body accepted.
const JSON_LIMIT: usize = 256 * 1024;

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("Invalid JSON body: {err}")).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("Invalid query string: {err}")).into()
}

/// Register extractor configuration and every `/api/v1` handler.
///
/// Literal segments such as `/admin/category/parents` are registered
/// before the `{id}` catch-alls they would otherwise collide with.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT)
            .error_handler(json_error),
    )
    .app_data(web::QueryConfig::default().error_handler(query_error))
    .service(index::index)
    .service(account::get_otp)
    .service(account::check_otp)
    .service(account::refresh_token)
    .service(account::register)
    .service(account::login)
    .service(categories::add_category)
    .service(categories::parents)
    .service(categories::children)
    .service(categories::tree)
    .service(categories::list_all)
    .service(categories::update_category)
    .service(categories::remove_category)
    .service(categories::get_category)
    .service(blogs::list_blogs)
    .service(blogs::add_blog)
    .service(blogs::update_blog)
    .service(blogs::get_blog)
    .service(blogs::delete_blog)
    .service(products::list_products)
    .service(products::add_product)
    .service(products::edit_product)
    .service(products::remove_product)
    .service(products::get_product)
    .service(courses::list_courses)
    .service(courses::add_course)
    .service(courses::edit_course)
    .service(courses::get_course)
    .service(chapters::add_chapter)
    .service(chapters::list_chapters)
    .service(chapters::remove_chapter)
    .service(chapters::update_chapter)
    .service(episodes::add_episode)
    .service(episodes::remove_episode)
    .service(episodes::edit_episode)
    .service(users::list_users)
    .service(users::profile)
    .service(users::edit_profile)
    .service(roles::list_roles)
    .service(roles::add_role)
    .service(roles::remove_role)
    .service(roles::edit_role)
    .service(permissions::list_permissions)
    .service(permissions::add_permission)
    .service(permissions::remove_permission)
    .service(permissions::edit_permission)
    .service(recipes::create_recipe)
    .service(recipes::list_recipes)
    .service(recipes::search_recipes)
    .service(recipes::remove_recipe)
    .service(recipes::get_recipe)
    .service(teams::create_team)
    .service(teams::list_teams)
    .service(teams::my_teams)
    .service(teams::invite)
    .service(teams::update_team)
    .service(teams::remove_team)
    .service(teams::get_team)
    .service(teams::list_requests)
    .service(teams::requests_by_status)
    .service(teams::answer_request)
    .service(projects::create_project)
    .service(projects::list_projects)
    .service(projects::edit_project)
    .service(projects::edit_project_image)
    .service(projects::remove_project)
    .service(projects::get_project)
    .service(coffees::add_coffee)
    .service(coffees::list_coffees)
    .service(coffees::edit_coffee)
    .service(coffees::edit_coffee_image)
    .service(coffees::remove_coffee)
    .service(coffees::get_coffee);
}
