use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::models;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        routes::health::health,
        routes::auth::login,
        routes::auth::me,
        routes::auth::logout,
        routes::permissions::index,
        routes::permissions::create_form,
        routes::permissions::store,
        routes::permissions::edit_form,
        routes::permissions::update,
        routes::permissions::destroy,
        routes::roles::index,
        routes::roles::create_form,
        routes::roles::store,
        routes::roles::edit_form,
        routes::roles::update,
        routes::roles::destroy,
        routes::users::index,
        routes::users::create_form,
        routes::users::store,
        routes::users::edit_form,
        routes::users::update,
        routes::vendors::index,
        routes::vendors::create_form,
        routes::vendors::store,
        routes::vendors::edit_form,
        routes::vendors::update,
        routes::vendors::destroy
    ),
    components(
        schemas(
            models::user::User,
            models::user::UserWithRoles,
            models::user::UserCreateRequest,
            models::user::UserUpdateRequest,
            models::user::UserFormData,
            models::user::LoginRequest,
            models::user::AuthResponse,
            models::rbac::Permission,
            models::rbac::PermissionPayload,
            models::rbac::Role,
            models::rbac::RoleWithPermissions,
            models::rbac::PermissionRef,
            models::rbac::RolePayload,
            models::rbac::RoleFormData,
            models::vendor::Vendor,
            models::vendor::VendorWithAudit,
            models::vendor::VendorCreateRequest,
            models::vendor::VendorUpdateRequest,
            models::flash::Flash,
            routes::auth::MeResponse,
            routes::auth::MessageResponse,
            routes::permissions::PermissionStored,
            routes::roles::RoleStored,
            routes::users::UserStored,
            routes::vendors::VendorStored,
            routes::health::HealthResponse
        )
    ),
    tags(
        (name = "Auth", description = "Authentication"),
        (name = "Permissions", description = "Permission management"),
        (name = "Roles", description = "Role management"),
        (name = "Users", description = "User management"),
        (name = "Vendors", description = "Vendor management"),
        (name = "Health", description = "Service health")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Swagger UI at /docs, backed by the generated document.
pub fn swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
