use std::sync::Arc;

use async_graphql::{Context, ErrorExtensions, Object, Result};

use crate::auth::{AuthGuard, authenticated_user_id};
use crate::users::{
    CreateUserHandler, CreateUserInput, CreateUserResponse, UserError, UserSchema, UsersRepository,
};

/// Registration mutations.
///
/// The controller comes from schema data, attached once at startup and shared
/// by all requests.
#[derive(Default)]
pub struct CreateUserResolver;

#[Object]
impl CreateUserResolver {
    /// Create a new user
    async fn create_user(
        &self,
        ctx: &Context<'_>,
        name: String,
        email: String,
        password: String,
    ) -> Result<CreateUserResponse> {
        let controller = ctx.data::<Arc<dyn CreateUserHandler>>()?;

        controller
            .handler(CreateUserInput {
                name,
                email,
                password,
            })
            .await
            .map_err(|e| e.extend())
    }
}

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    /// The user owning the bearer token of this request
    #[graphql(guard = "AuthGuard")]
    async fn me(&self, ctx: &Context<'_>) -> Result<UserSchema> {
        // verified by the guard already; this reads the memoised result
        let user_id = authenticated_user_id(ctx)?;
        let users = ctx.data::<Arc<dyn UsersRepository>>()?;

        users
            .find_by_id(&user_id)
            .await
            .map_err(|e| e.extend())?
            .map(UserSchema::from)
            .ok_or_else(|| UserError::NotFound.extend())
    }
}
