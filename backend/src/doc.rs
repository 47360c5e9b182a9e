//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every `/api/v1` handler plus the health checks. The
//! document is served by Swagger UI in debug builds and printed by
//! `cargo run --bin openapi-dump` for external tooling.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::dto::{
    AuthorDto, BlogDto, CategoryDto, CategoryNodeDto, ChapterDto, CoffeeDto, CourseDto,
    EpisodeDto, FeaturesDto, InvitationDto, MessageDto, OtpChallengeDto, PermissionDto,
    ProductDto, ProjectDto, RecipeDto, RoleDto, SignInDto, TeamDto, UserDto,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};

/// Name of the bearer security scheme.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Register the JWT bearer scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Access token issued by POST /api/v1/user/check-otp or /api/v1/user/login.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Campus backend API",
        description = "OTP and password sign-in, role based administration of categories, blogs, products, courses and the coffee menu, plus recipes, teams and personal projects.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::index::index,
        crate::inbound::http::account::get_otp,
        crate::inbound::http::account::check_otp,
        crate::inbound::http::account::refresh_token,
        crate::inbound::http::account::register,
        crate::inbound::http::account::login,
        crate::inbound::http::categories::add_category,
        crate::inbound::http::categories::parents,
        crate::inbound::http::categories::children,
        crate::inbound::http::categories::tree,
        crate::inbound::http::categories::list_all,
        crate::inbound::http::categories::get_category,
        crate::inbound::http::categories::update_category,
        crate::inbound::http::categories::remove_category,
        crate::inbound::http::blogs::list_blogs,
        crate::inbound::http::blogs::add_blog,
        crate::inbound::http::blogs::update_blog,
        crate::inbound::http::blogs::get_blog,
        crate::inbound::http::blogs::delete_blog,
        crate::inbound::http::products::list_products,
        crate::inbound::http::products::add_product,
        crate::inbound::http::products::get_product,
        crate::inbound::http::products::edit_product,
        crate::inbound::http::products::remove_product,
        crate::inbound::http::courses::list_courses,
        crate::inbound::http::courses::add_course,
        crate::inbound::http::courses::get_course,
        crate::inbound::http::courses::edit_course,
        crate::inbound::http::chapters::add_chapter,
        crate::inbound::http::chapters::list_chapters,
        crate::inbound::http::chapters::remove_chapter,
        crate::inbound::http::chapters::update_chapter,
        crate::inbound::http::episodes::add_episode,
        crate::inbound::http::episodes::remove_episode,
        crate::inbound::http::episodes::edit_episode,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::profile,
        crate::inbound::http::users::edit_profile,
        crate::inbound::http::roles::list_roles,
        crate::inbound::http::roles::add_role,
        crate::inbound::http::roles::remove_role,
        crate::inbound::http::roles::edit_role,
        crate::inbound::http::permissions::list_permissions,
        crate::inbound::http::permissions::add_permission,
        crate::inbound::http::permissions::remove_permission,
        crate::inbound::http::permissions::edit_permission,
        crate::inbound::http::recipes::create_recipe,
        crate::inbound::http::recipes::list_recipes,
        crate::inbound::http::recipes::search_recipes,
        crate::inbound::http::recipes::get_recipe,
        crate::inbound::http::recipes::remove_recipe,
        crate::inbound::http::teams::create_team,
        crate::inbound::http::teams::list_teams,
        crate::inbound::http::teams::my_teams,
        crate::inbound::http::teams::invite,
        crate::inbound::http::teams::update_team,
        crate::inbound::http::teams::get_team,
        crate::inbound::http::teams::remove_team,
        crate::inbound::http::teams::list_requests,
        crate::inbound::http::teams::requests_by_status,
        crate::inbound::http::teams::answer_request,
        crate::inbound::http::projects::create_project,
        crate::inbound::http::projects::list_projects,
        crate::inbound::http::projects::edit_project,
        crate::inbound::http::projects::edit_project_image,
        crate::inbound::http::projects::get_project,
        crate::inbound::http::projects::remove_project,
        crate::inbound::http::coffees::add_coffee,
        crate::inbound::http::coffees::list_coffees,
        crate::inbound::http::coffees::edit_coffee,
        crate::inbound::http::coffees::edit_coffee_image,
        crate::inbound::http::coffees::get_coffee,
        crate::inbound::http::coffees::remove_coffee,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        MessageDto,
        UserDto,
        OtpChallengeDto,
        SignInDto,
        CategoryDto,
        CategoryNodeDto,
        AuthorDto,
        BlogDto,
        FeaturesDto,
        ProductDto,
        EpisodeDto,
        ChapterDto,
        CourseDto,
        RoleDto,
        PermissionDto,
        RecipeDto,
        TeamDto,
        InvitationDto,
        ProjectDto,
        CoffeeDto,
    )),
    tags(
        (name = "index", description = "Token check"),
        (name = "user-auth", description = "OTP, password and token endpoints"),
        (name = "admin-category", description = "Category tree"),
        (name = "admin-blogs", description = "Blog posts"),
        (name = "admin-products", description = "Store products"),
        (name = "admin-courses", description = "Courses"),
        (name = "admin-chapters", description = "Course chapters"),
        (name = "admin-episodes", description = "Chapter episodes and videos"),
        (name = "admin-users", description = "Users and profiles"),
        (name = "admin-rbac", description = "Roles and permissions"),
        (name = "coffees", description = "Coffee shop menu"),
        (name = "recipes", description = "Recipes and their chefs"),
        (name = "teams", description = "Teams"),
        (name = "invitations", description = "Team invitations addressed to the caller"),
        (name = "projects", description = "The caller's personal projects"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    use super::*;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    fn error_schema_is_registered_with_wire_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error, "code");
        assert_object_schema_has_field(error, "message");
        assert_object_schema_has_field(error, "traceId");
    }

    #[rstest]
    #[case("/api/v1/user/get-otp")]
    #[case("/api/v1/admin/category/{id}")]
    #[case("/api/v1/admin/roles/remove/{field}")]
    #[case("/api/v1/admin/episodes/edit/{id}")]
    #[case("/api/v1/teams/invite/{team_id}/{username}")]
    #[case("/api/v1/user/requests/{id}/{status}")]
    #[case("/api/v1/recipes/search")]
    #[case("/health/ready")]
    fn documents_route(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn declares_bearer_security() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key(BEARER_SCHEME));
    }

    #[rstest]
    fn public_endpoints_opt_out_of_bearer_auth() {
        let doc = ApiDoc::openapi();
        let get_otp = doc
            .paths
            .paths
            .get("/api/v1/user/get-otp")
            .and_then(|item| item.post.as_ref())
            .expect("get-otp operation");
        assert!(
            get_otp
                .security
                .as_ref()
                .is_some_and(|requirements| requirements.len() == 1),
            "get-otp should declare an empty security requirement"
        );
    }
}
