#[cfg(test)]
mod graphql_users_tests {
    use std::sync::Arc;

    use crate::context::RequestContext;
    use crate::test_utils::{schema_with_handler, test_app, test_cache, test_tokens};
    use crate::users::create_user::MockCreateUserHandler;
    use crate::users::{CreateUserInput, CreateUserResponse, UserError, UserSchema};
    use actix_web::http::header;
    use actix_web::test::TestRequest;
    use async_graphql::Request;

    const CREATE_ALICE: &str = r#"
        mutation {
            createUser(name: "Alice", email: "alice@example.com", password: "secret") {
                user { id name email createdAt }
                token
            }
        }
    "#;

    fn alice_response() -> CreateUserResponse {
        CreateUserResponse {
            user: UserSchema {
                id: "user-1".to_string(),
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                created_at: "2025-01-01T00:00:00+00:00".to_string(),
            },
            token: "opaque-token".to_string(),
        }
    }

    fn context_with_token(token: Option<&str>) -> RequestContext {
        let mut req = TestRequest::post().insert_header((header::HOST, "localhost"));
        if let Some(token) = token {
            req = req.insert_header((header::AUTHORIZATION, format!("Bearer {}", token)));
        }
        RequestContext::from_request(&req.to_http_request(), test_cache())
    }

    fn error_code(response: &async_graphql::Response) -> Option<String> {
        response.errors[0]
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .and_then(|code| match code {
                async_graphql::Value::String(code) => Some(code.clone()),
                _ => None,
            })
    }

    #[tokio::test]
    async fn test_create_user_passes_arguments_unchanged() {
        let mut handler = MockCreateUserHandler::new();
        handler
            .expect_handler()
            .withf(|input: &CreateUserInput| {
                *input
                    == CreateUserInput {
                        name: "Alice".to_string(),
                        email: "alice@example.com".to_string(),
                        password: "secret".to_string(),
                    }
            })
            .times(1)
            .returning(|_| Ok(alice_response()));

        let schema = schema_with_handler(Arc::new(handler));
        let result = schema.execute(CREATE_ALICE).await;

        assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
        let data = result.data.into_json().unwrap();
        let expected = serde_json::json!({
            "user": {
                "id": "user-1",
                "name": "Alice",
                "email": "alice@example.com",
                "createdAt": "2025-01-01T00:00:00+00:00"
            },
            "token": "opaque-token"
        });
        assert_eq!(data["createUser"], expected);
    }

    #[tokio::test]
    async fn test_create_user_does_not_validate() {
        let mut handler = MockCreateUserHandler::new();
        handler
            .expect_handler()
            .withf(|input: &CreateUserInput| {
                input.name.is_empty() && input.email == "  not-an-email " && input.password == "x"
            })
            .times(1)
            .returning(|_| Ok(alice_response()));

        let schema = schema_with_handler(Arc::new(handler));
        let result = schema
            .execute(
                r#"mutation { createUser(name: "", email: "  not-an-email ", password: "x") { token } }"#,
            )
            .await;

        assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    }

    #[tokio::test]
    async fn test_create_user_propagates_handler_error() {
        let mut handler = MockCreateUserHandler::new();
        handler
            .expect_handler()
            .times(1)
            .returning(|_| Err(UserError::EmailAlreadyInUse));

        let schema = schema_with_handler(Arc::new(handler));
        let result = schema.execute(CREATE_ALICE).await;

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "Email address already in use");
        assert_eq!(error_code(&result).as_deref(), Some("EMAIL_IN_USE"));
    }

    #[tokio::test]
    async fn test_create_user_requires_all_arguments() {
        let mut handler = MockCreateUserHandler::new();
        handler.expect_handler().times(0);

        let schema = schema_with_handler(Arc::new(handler));
        let result = schema
            .execute(r#"mutation { createUser(name: "Alice", email: "alice@example.com") { token } }"#)
            .await;

        assert!(!result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_create_user_end_to_end() {
        let app = test_app();

        let result = app.schema.execute(CREATE_ALICE).await;

        assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
        let data = result.data.into_json().unwrap();
        let user_id = data["createUser"]["user"]["id"].as_str().unwrap();
        let token = data["createUser"]["token"].as_str().unwrap();

        assert_eq!(test_tokens().verify(token).unwrap().sub, user_id);
        assert_eq!(app.users.len(), 1);
        assert_eq!(app.mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_create_user_validation_error_code() {
        let app = test_app();

        let result = app
            .schema
            .execute(r#"mutation { createUser(name: "Alice", email: "alice", password: "secret") { token } }"#)
            .await;

        assert_eq!(error_code(&result).as_deref(), Some("BAD_USER_INPUT"));
        assert!(app.users.is_empty());
    }

    #[tokio::test]
    async fn test_me_returns_token_owner() {
        let app = test_app();
        let created = app.schema.execute(CREATE_ALICE).await.data.into_json().unwrap();
        let token = created["createUser"]["token"].as_str().unwrap().to_string();

        let request = Request::new("{ me { name email } }").data(context_with_token(Some(&token)));
        let result = app.schema.execute(request).await;

        assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
        let data = result.data.into_json().unwrap();
        assert_eq!(data["me"]["name"], "Alice");
        assert_eq!(data["me"]["email"], "alice@example.com");
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let app = test_app();

        let request = Request::new("{ me { id } }").data(context_with_token(None));
        let result = app.schema.execute(request).await;

        assert_eq!(result.errors[0].message, "Missing authentication token");
        assert_eq!(error_code(&result).as_deref(), Some("UNAUTHENTICATED"));
    }

    #[tokio::test]
    async fn test_me_rejects_invalid_token() {
        let app = test_app();

        let request = Request::new("{ me { id } }").data(context_with_token(Some("forged")));
        let result = app.schema.execute(request).await;

        assert_eq!(error_code(&result).as_deref(), Some("UNAUTHENTICATED"));
    }

    #[tokio::test]
    async fn test_me_unknown_user() {
        let app = test_app();
        let token = test_tokens().issue("ghost").unwrap();

        let request = Request::new("{ me { id } }").data(context_with_token(Some(&token)));
        let result = app.schema.execute(request).await;

        assert_eq!(error_code(&result).as_deref(), Some("NOT_FOUND"));
    }
}
