//! Domain records exchanged between commands and collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::SessionUser;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Customer,
    Admin,
}

impl UserRole {
    /// Parse a role from a form value. Accepts the legacy `10`/`20` codes.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "customer" | "10" => Some(UserRole::Customer),
            "admin" | "20" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Withdrawn,
}

impl UserStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "active" => Some(UserStatus::Active),
            "withdrawn" => Some(UserStatus::Withdrawn),
            _ => None,
        }
    }
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub user_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub mobile_number: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub registered_at: DateTime<Utc>,
}

impl User {
    /// Create an active customer account. The email doubles as user id.
    pub fn new(
        email: impl Into<String>,
        user_name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let email = email.into();
        Self {
            user_id: email.clone(),
            user_name: user_name.into(),
            email,
            password_hash: password_hash.into(),
            mobile_number: None,
            role: UserRole::Customer,
            status: UserStatus::Active,
            registered_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_withdrawn(&self) -> bool {
        self.status == UserStatus::Withdrawn
    }

    /// Identity stored in the session after login.
    pub fn to_session_user(&self) -> SessionUser {
        SessionUser {
            user_id: self.user_id.clone(),
            user_name: self.user_name.clone(),
            email: self.email.clone(),
            is_admin: self.is_admin(),
        }
    }
}

/// Product visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    OnSale,
    Hidden,
}

impl ProductStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "on_sale" => Some(ProductStatus::OnSale),
            "hidden" => Some(ProductStatus::Hidden),
            _ => None,
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub product_code: String,
    pub product_name: String,
    pub detail_explain: String,
    pub file_id: Option<String>,
    pub customer_price: u32,
    pub sale_price: u32,
    pub stock: u32,
    pub delivery_fee: u32,
    pub status: ProductStatus,
    pub registered_at: DateTime<Utc>,
}

impl Product {
    pub fn is_on_sale(&self) -> bool {
        self.status == ProductStatus::OnSale
    }
}

/// Catalog listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    /// Newest registrations first.
    #[default]
    Latest,
    PriceAsc,
    PriceDesc,
}

impl ProductSort {
    /// Parse the `sortBy` parameter. Unknown values fall back to [`ProductSort::Latest`].
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("priceAsc") => ProductSort::PriceAsc,
            Some("priceDesc") => ProductSort::PriceDesc,
            _ => ProductSort::Latest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductSort::Latest => "latest",
            ProductSort::PriceAsc => "priceAsc",
            ProductSort::PriceDesc => "priceDesc",
        }
    }
}

/// Catalog search parameters.
#[derive(Debug, Clone)]
pub struct ProductQuery {
    /// 1-based page number.
    pub page: usize,
    pub page_size: usize,
    pub sort: ProductSort,
    pub keyword: Option<String>,
    /// Admin listings also show hidden products.
    pub include_hidden: bool,
}

impl ProductQuery {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
            sort: ProductSort::Latest,
            keyword: None,
            include_hidden: false,
        }
    }
}

/// Number of page links shown around the current page.
const PAGE_WINDOW: usize = 10;

/// One page of results plus pagination bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub total_pages: usize,
    pub start_page: usize,
    pub end_page: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, current_page: usize, page_size: usize, total_count: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_count.div_ceil(page_size).max(1);
        let current_page = current_page.clamp(1, total_pages);
        let start_page = ((current_page - 1) / PAGE_WINDOW) * PAGE_WINDOW + 1;
        let end_page = (start_page + PAGE_WINDOW - 1).min(total_pages);

        Self {
            items,
            current_page,
            page_size,
            total_count,
            total_pages,
            start_page,
            end_page,
        }
    }
}

/// A line in a user's basket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasketItem {
    pub product_code: String,
    pub product_name: String,
    pub unit_price: u32,
    pub quantity: u32,
    pub delivery_fee: u32,
    pub file_id: Option<String>,
}

impl BasketItem {
    /// Basket line for a product.
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_code: product.product_code.clone(),
            product_name: product.product_name.clone(),
            unit_price: product.sale_price,
            quantity,
            delivery_fee: product.delivery_fee,
            file_id: product.file_id.clone(),
        }
    }

    pub fn amount(&self) -> u64 {
        u64::from(self.unit_price) * u64::from(self.quantity)
    }
}

/// A user's basket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Basket {
    pub user_id: String,
    pub items: Vec<BasketItem>,
}

impl Basket {
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            items: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_amount(&self) -> u64 {
        self.items.iter().map(BasketItem::amount).sum()
    }

    /// Delivery is charged once per basket, at the highest item fee.
    pub fn delivery_fee(&self) -> u32 {
        self.items
            .iter()
            .map(|item| item.delivery_fee)
            .max()
            .unwrap_or(0)
    }

    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Placed,
    Preparing,
    Shipping,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// Parse a status name or its legacy `ORDn` code.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "placed" | "ORD1" => Some(OrderStatus::Placed),
            "preparing" | "ORD2" => Some(OrderStatus::Preparing),
            "shipping" | "ORD3" => Some(OrderStatus::Shipping),
            "delivered" | "ORD4" => Some(OrderStatus::Delivered),
            "cancelled" | "ORD5" => Some(OrderStatus::Cancelled),
            "refunded" | "ORD6" => Some(OrderStatus::Refunded),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "ORD1",
            OrderStatus::Preparing => "ORD2",
            OrderStatus::Shipping => "ORD3",
            OrderStatus::Delivered => "ORD4",
            OrderStatus::Cancelled => "ORD5",
            OrderStatus::Refunded => "ORD6",
        }
    }

    /// Customers may cancel until the order leaves the warehouse.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Placed | OrderStatus::Preparing)
    }

    /// Cancelled and refunded orders never change status again.
    pub fn is_final(&self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Refunded)
    }
}

/// A line of a placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_code: String,
    pub product_name: String,
    pub unit_price: u32,
    pub quantity: u32,
    pub amount: u64,
}

impl From<&BasketItem> for OrderItem {
    fn from(item: &BasketItem) -> Self {
        Self {
            product_code: item.product_code.clone(),
            product_name: item.product_name.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
            amount: item.amount(),
        }
    }
}

/// Where an order is shipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryInfo {
    pub receiver_name: String,
    pub receiver_phone: String,
    pub zip_code: String,
    pub address: String,
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub order_amount: u64,
    pub delivery_fee: u32,
    pub delivery: DeliveryInfo,
    pub status: OrderStatus,
    pub ordered_at: DateTime<Utc>,
}

impl Order {
    /// Build an order from a basket's content.
    pub fn from_basket(basket: &Basket, delivery: DeliveryInfo) -> Self {
        let now = Utc::now();
        let suffix = Uuid::new_v4().simple().to_string();
        Self {
            order_id: format!("{}-{}", now.format("%Y%m%d%H%M%S"), &suffix[..8]),
            user_id: basket.user_id.clone(),
            items: basket.items.iter().map(OrderItem::from).collect(),
            order_amount: basket.total_amount(),
            delivery_fee: basket.delivery_fee(),
            delivery,
            status: OrderStatus::Placed,
            ordered_at: now,
        }
    }

    /// Amount charged including delivery.
    pub fn total_amount(&self) -> u64 {
        self.order_amount + u64::from(self.delivery_fee)
    }
}

/// Metadata of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub file_id: String,
    pub original_name: String,
    pub extension: String,
    pub size: u64,
    pub saved_at: DateTime<Utc>,
}

impl StoredFile {
    /// Content type served for this file.
    pub fn content_type(&self) -> &'static str {
        match self.extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "bmp" => "image/bmp",
            "webp" => "image/webp",
            _ => "application/octet-stream",
        }
    }
}

/// Separator between levels in a category's full name.
pub const CATEGORY_PATH_SEPARATOR: &str = " > ";

/// A node of the product category tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Assigned by the store; 0 until then.
    pub category_id: u64,
    pub parent_id: Option<u64>,
    pub name: String,
    /// Path from the root, e.g. `Furniture > Desks`. Maintained by the store.
    pub full_name: String,
    pub description: String,
    /// Depth in the tree; top-level categories are level 1.
    pub level: u32,
    pub display_order: u32,
    pub in_use: bool,
    pub registered_by: String,
    pub registered_at: DateTime<Utc>,
}

impl Category {
    /// A category not stored yet.
    pub fn draft(name: impl Into<String>, parent_id: Option<u64>) -> Self {
        Self {
            category_id: 0,
            parent_id,
            name: name.into(),
            full_name: String::new(),
            description: String::new(),
            level: 1,
            display_order: 1,
            in_use: true,
            registered_by: String::new(),
            registered_at: Utc::now(),
        }
    }

    /// Set `full_name` and `level` from the parent's position in the tree.
    pub fn place_under(&mut self, parent: Option<&Category>) {
        match parent {
            Some(parent) => {
                self.full_name = format!("{}{}{}", parent.full_name, CATEGORY_PATH_SEPARATOR, self.name);
                self.level = parent.level + 1;
            }
            None => {
                self.full_name = self.name.clone();
                self.level = 1;
            }
        }
    }
}

/// Placement of a product in a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMapping {
    pub product_code: String,
    pub category_id: u64,
    pub display_order: u32,
    pub registered_by: String,
    pub registered_at: DateTime<Utc>,
}

impl CategoryMapping {
    pub fn new(product_code: impl Into<String>, category_id: u64) -> Self {
        Self {
            product_code: product_code.into(),
            category_id,
            display_order: 1,
            registered_by: String::new(),
            registered_at: Utc::now(),
        }
    }

    /// Whether this mapping links `product_code` and `category_id`.
    pub fn links(&self, product_code: &str, category_id: u64) -> bool {
        self.product_code == product_code && self.category_id == category_id
    }
}
