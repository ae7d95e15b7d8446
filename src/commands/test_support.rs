//! Fixtures shared by command unit tests.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tempfile::TempDir;

use crate::auth::{hash_password, MemorySessionStore, SessionStore, ADMIN_ATTRIBUTE, USER_ATTRIBUTE};
use crate::protocol::HttpRequest;
use crate::services::{
    Basket, BasketItem, DeliveryInfo, Order, Product, ProductStatus, ServiceRegistry, User,
    UserRole,
};

use super::types::ExecutionContext;

pub(crate) struct Fixture {
    pub services: ServiceRegistry,
    pub sessions: Arc<MemorySessionStore>,
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let services = ServiceRegistry::in_memory(&dir.path().join("uploads")).unwrap();
        Self {
            services,
            sessions: Arc::new(MemorySessionStore::new(Duration::from_secs(60))),
            dir,
        }
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.dir.path().join("uploads")
    }

    pub fn add_product(&self, code: &str, price: u32, stock: u32) -> Product {
        let product = Product {
            product_code: code.to_string(),
            product_name: format!("Product {}", code),
            detail_explain: format!("About {}", code),
            file_id: None,
            customer_price: price,
            sale_price: price,
            stock,
            delivery_fee: 2500,
            status: ProductStatus::OnSale,
            registered_at: Utc::now(),
        };
        self.services.products.save(product.clone()).unwrap();
        product
    }

    pub fn add_user(&self, email: &str, password: &str, role: UserRole) -> User {
        let mut user = User::new(email, "Kim", hash_password(password).unwrap());
        user.role = role;
        self.services.users.save(user.clone()).unwrap();
        user
    }

    /// A live session logged in as `user`.
    pub fn login(&self, user: &User) -> String {
        let id = self.sessions.create();
        self.sessions.set_attribute(
            &id,
            USER_ATTRIBUTE,
            serde_json::to_value(user.to_session_user()).unwrap(),
        );
        self.sessions
            .set_attribute(&id, ADMIN_ATTRIBUTE, serde_json::json!(user.is_admin()));
        id
    }

    /// A customer logged in with a fresh session.
    pub fn customer_session(&self) -> (User, String) {
        let user = self.add_user("kim@example.com", "Secret12", UserRole::Customer);
        let session = self.login(&user);
        (user, session)
    }

    /// Record an order of `quantity` units of `product` for `user_id`.
    pub fn place_order(&self, user_id: &str, product: &Product, quantity: u32) -> Order {
        let basket = Basket {
            user_id: user_id.to_string(),
            items: vec![BasketItem::from_product(product, quantity)],
        };
        let delivery = DeliveryInfo {
            receiver_name: "Kim".to_string(),
            receiver_phone: "010-1234-5678".to_string(),
            zip_code: "04524".to_string(),
            address: "1 Main Street".to_string(),
        };
        let order = Order::from_basket(&basket, delivery);
        self.services.orders.insert(order.clone()).unwrap();
        order
    }

    pub fn context(&self, domain: &str, command: &str, request: HttpRequest) -> ExecutionContext {
        ExecutionContext::new(request, domain, command, self.sessions.clone())
    }
}
