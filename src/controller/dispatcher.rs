//! Prefix routing across controllers.

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{debug, info};

use crate::auth::AuthRequirement;
use crate::commands::admin_category::admin_category_commands;
use crate::commands::admin_mapping::admin_mapping_commands;
use crate::commands::admin_order::AdminOrderCommandFactory;
use crate::commands::admin_product::admin_product_commands;
use crate::commands::admin_user::admin_user_commands;
use crate::commands::basket::BasketCommandFactory;
use crate::commands::file::file_commands;
use crate::commands::order::order_commands;
use crate::commands::product::product_commands;
use crate::commands::user::user_commands;
use crate::commands::CommandTable;
use crate::protocol::{HttpRequest, HttpResponse};
use crate::services::ServiceRegistry;

use super::{Controller, ControllerEnv, DomainController, FileDownloadController};

/// Where `/` sends visitors.
pub const HOME_LOCATION: &str = "/user/product/list.do";

/// Routes each request to the controller with the longest matching prefix.
///
/// A prefix matches when the path equals it or continues with `/`, so
/// `/user` owns `/user/login` but not `/username`.
pub struct Dispatcher {
    controllers: Vec<Arc<dyn Controller>>,
}

impl Dispatcher {
    pub fn new(mut controllers: Vec<Arc<dyn Controller>>) -> Self {
        controllers.sort_by(|a, b| b.prefix().len().cmp(&a.prefix().len()));
        Self { controllers }
    }

    /// The shop's controllers wired to `services`.
    pub fn standard(services: &ServiceRegistry, env: ControllerEnv) -> Self {
        let env = Arc::new(env);
        let domain = |prefix: &str, factory: CommandTable| -> DomainController {
            DomainController::new(prefix, factory, Arc::clone(&env))
        };

        let controllers: Vec<Arc<dyn Controller>> = vec![
            Arc::new(domain("/user", user_commands(services))),
            Arc::new(domain("/user/product", product_commands(services))),
            Arc::new(
                DomainController::new(
                    "/user/basket.do",
                    BasketCommandFactory::new(services),
                    Arc::clone(&env),
                )
                .with_gate(AuthRequirement::User),
            ),
            Arc::new(domain("/user/order", order_commands(services)).with_gate(AuthRequirement::User)),
            Arc::new(FileDownloadController::new(file_commands(services), Arc::clone(&env))),
            Arc::new(
                domain("/admin/product", admin_product_commands(services))
                    .with_gate(AuthRequirement::Admin),
            ),
            Arc::new(
                DomainController::new(
                    "/admin/order",
                    AdminOrderCommandFactory::new(services),
                    Arc::clone(&env),
                )
                .with_gate(AuthRequirement::Admin),
            ),
            Arc::new(
                domain("/admin/user", admin_user_commands(services))
                    .with_gate(AuthRequirement::Admin),
            ),
            Arc::new(
                domain("/admin/category", admin_category_commands(services))
                    .with_gate(AuthRequirement::Admin),
            ),
            Arc::new(
                domain("/admin/mapping", admin_mapping_commands(services))
                    .with_gate(AuthRequirement::Admin),
            ),
        ];

        let dispatcher = Self::new(controllers);
        info!(controllers = dispatcher.controllers.len(), "Dispatcher initialized");
        dispatcher
    }

    /// Registered prefixes, longest first.
    pub fn prefixes(&self) -> Vec<&str> {
        self.controllers.iter().map(|c| c.prefix()).collect()
    }

    /// Controller owning `path`, if any.
    pub fn route(&self, path: &str) -> Option<&Arc<dyn Controller>> {
        self.controllers.iter().find(|controller| {
            let prefix = controller.prefix();
            path == prefix
                || path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Handle one request.
    pub fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        match self.route(request.path()) {
            Some(controller) => controller.handle(request),
            None if request.path() == "/" => {
                let mut response = HttpResponse::new();
                response.send_redirect(HOME_LOCATION);
                response
            }
            None => {
                debug!(path = %request.path(), "No controller for path");
                let mut response = HttpResponse::new();
                response.send_error(StatusCode::NOT_FOUND, "Not found");
                response
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::test_support::test_env;

    fn standard() -> (Dispatcher, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let services = ServiceRegistry::in_memory(dir.path()).unwrap();
        let (env, _) = test_env();
        (Dispatcher::standard(&services, (*env).clone()), dir)
    }

    #[test]
    fn test_longest_prefix_wins() {
        let (dispatcher, _dir) = standard();

        let cases = [
            ("/user/login", "/user"),
            ("/user/product/list.do", "/user/product"),
            ("/user/basket.do", "/user/basket.do"),
            ("/user/order/list.do", "/user/order"),
            ("/file/abc", "/file"),
            ("/admin/product/list", "/admin/product"),
            ("/admin/order/detail", "/admin/order"),
            ("/admin/category/list", "/admin/category"),
            ("/admin/mapping/edit", "/admin/mapping"),
        ];
        for (path, prefix) in cases {
            assert_eq!(dispatcher.route(path).unwrap().prefix(), prefix, "{}", path);
        }
    }

    #[test]
    fn test_prefix_matches_whole_segments() {
        let (dispatcher, _dir) = standard();
        assert!(dispatcher.route("/username").is_none());
        assert!(dispatcher.route("/admin").is_none());
        assert!(dispatcher.route("/").is_none());
    }

    #[test]
    fn test_unrouted_path_is_404() {
        let (dispatcher, _dir) = standard();
        let response = dispatcher.dispatch(HttpRequest::get("/nowhere"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_root_redirects_to_shop() {
        let (dispatcher, _dir) = standard();
        let response = dispatcher.dispatch(HttpRequest::get("/"));
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.header("location"), Some(HOME_LOCATION));
    }

    #[test]
    fn test_prefixes_sorted_longest_first() {
        let (dispatcher, _dir) = standard();
        let prefixes = dispatcher.prefixes();
        assert_eq!(prefixes.len(), 10);
        assert!(prefixes
            .windows(2)
            .all(|pair| pair[0].len() >= pair[1].len()));
    }
}
