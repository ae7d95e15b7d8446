//! Join command.
//!
//! Shows the registration form and creates customer accounts.

use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::hash_password;
use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::{User, UserRepository};
use crate::validation::{validate_email, validate_mobile_number, validate_password, validate_user_name};

use super::set_no_cache;

const VIEW: &str = "user/join";

/// Register a new customer account.
pub struct JoinCommand {
    users: Arc<dyn UserRepository>,
}

impl JoinCommand {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    fn register(&self, ctx: &ExecutionContext) -> Result<User, DispatchError> {
        let email = validate_email(ctx.require_param("email")?)?;
        let password = validate_password(
            ctx.raw_param("password")
                .ok_or_else(|| DispatchError::missing_parameter("password"))?,
        )?;
        let user_name = validate_user_name(ctx.require_param("userName")?)?;
        let mobile_number = ctx
            .param("mobileNumber")
            .map(validate_mobile_number)
            .transpose()?;

        let mut user = User::new(email, user_name, hash_password(password)?);
        user.mobile_number = mobile_number.map(str::to_string);
        self.users.save(user.clone())?;
        Ok(user)
    }
}

impl Command for JoinCommand {
    fn name(&self) -> &'static str {
        "join"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        if !ctx.is_post() {
            if ctx.current_user().is_some() {
                return Ok(Outcome::redirect("/"));
            }
            set_no_cache(response);
            return Ok(Outcome::forward(VIEW));
        }

        match self.register(ctx) {
            Ok(user) => {
                info!(user_id = %user.user_id, "Account registered");
                Ok(Outcome::redirect(format!(
                    "{}?registered=true",
                    ctx.login_path()
                )))
            }
            Err(e) => {
                let Some(message) = e.user_message() else {
                    return Err(e);
                };
                warn!(error = %e, "Registration rejected");
                let email = ctx.param("email").map(str::to_string);
                let user_name = ctx.param("userName").map(str::to_string);
                ctx.set_attribute("errorMessage", message)?;
                ctx.set_attribute("email", email)?;
                ctx.set_attribute("userName", user_name)?;
                Ok(Outcome::forward(VIEW))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::commands::test_support::Fixture;
    use crate::protocol::HttpRequest;

    fn join_request(body: &str) -> HttpRequest {
        HttpRequest::post("/user/join").with_form_body(body.as_bytes())
    }

    #[test]
    fn test_get_shows_form_without_cache() {
        let fixture = Fixture::new();
        let command = JoinCommand::new(fixture.services.users.clone());
        let mut ctx = fixture.context("user", "join", HttpRequest::get("/user/join"));
        let mut response = HttpResponse::new();

        let outcome = command.execute(&mut ctx, &mut response).unwrap();
        assert_eq!(outcome, Outcome::forward("user/join"));
        assert_eq!(
            response.header("Cache-Control"),
            Some("no-cache, no-store, must-revalidate")
        );
    }

    #[test]
    fn test_join_creates_hashed_account() {
        let fixture = Fixture::new();
        let command = JoinCommand::new(fixture.services.users.clone());
        let mut ctx = fixture.context(
            "user",
            "join",
            join_request("email=lee%40example.com&password=Secret12&userName=Lee"),
        );

        let outcome = command.execute(&mut ctx, &mut HttpResponse::new()).unwrap();
        assert_eq!(outcome, Outcome::redirect("/user/login?registered=true"));

        let user = fixture
            .services
            .users
            .find_by_email("lee@example.com")
            .unwrap()
            .unwrap();
        assert_ne!(user.password_hash, "Secret12");
        assert!(verify_password("Secret12", &user.password_hash));
    }

    #[test]
    fn test_duplicate_email_rerenders_form() {
        let fixture = Fixture::new();
        fixture.customer_session();
        let command = JoinCommand::new(fixture.services.users.clone());
        let mut ctx = fixture.context(
            "user",
            "join",
            join_request("email=kim%40example.com&password=Secret12&userName=Kim"),
        );

        let outcome = command.execute(&mut ctx, &mut HttpResponse::new()).unwrap();
        assert_eq!(outcome, Outcome::forward("user/join"));
        assert!(ctx.attribute("errorMessage").is_some());
        assert_eq!(ctx.attribute("email").unwrap(), "kim@example.com");
    }

    #[test]
    fn test_weak_password_rerenders_form() {
        let fixture = Fixture::new();
        let command = JoinCommand::new(fixture.services.users.clone());
        let mut ctx = fixture.context(
            "user",
            "join",
            join_request("email=lee%40example.com&password=weak&userName=Lee"),
        );

        let outcome = command.execute(&mut ctx, &mut HttpResponse::new()).unwrap();
        assert_eq!(outcome, Outcome::forward("user/join"));
        assert!(fixture
            .services
            .users
            .find_by_email("lee@example.com")
            .unwrap()
            .is_none());
    }
}
