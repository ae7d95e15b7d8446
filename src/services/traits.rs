//! Collaborator interfaces.
//!
//! Commands reach persistence only through these traits. Every method is a
//! single synchronous step; implementations synchronize internally.

use crate::error::DispatchResult;

use super::model::{
    Basket, BasketItem, Category, CategoryMapping, Order, OrderStatus, Page, Product,
    ProductQuery, StoredFile, User, UserRole,
};

/// Account storage.
pub trait UserRepository: Send + Sync {
    fn find_by_id(&self, user_id: &str) -> DispatchResult<Option<User>>;

    fn find_by_email(&self, email: &str) -> DispatchResult<Option<User>>;

    /// Store a new account. Fails with a conflict if the email is taken.
    fn save(&self, user: User) -> DispatchResult<()>;

    /// Replace an existing account.
    fn update(&self, user: &User) -> DispatchResult<()>;

    /// All accounts, oldest first.
    fn list(&self) -> DispatchResult<Vec<User>>;

    fn update_role(&self, user_id: &str, role: UserRole) -> DispatchResult<()>;
}

/// Product catalog with stock bookkeeping.
pub trait ProductCatalog: Send + Sync {
    fn find(&self, product_code: &str) -> DispatchResult<Option<Product>>;

    fn search(&self, query: &ProductQuery) -> DispatchResult<Page<Product>>;

    /// Every product regardless of status, ordered by code.
    fn list(&self) -> DispatchResult<Vec<Product>>;

    /// Store a new product. Fails with a conflict if the code is taken.
    fn save(&self, product: Product) -> DispatchResult<()>;

    fn update(&self, product: &Product) -> DispatchResult<()>;

    /// Remove a product and return it.
    fn delete(&self, product_code: &str) -> DispatchResult<Product>;

    /// Take `quantity` units out of stock, or fail without changing anything.
    fn reserve_stock(&self, product_code: &str, quantity: u32) -> DispatchResult<()>;

    /// Put `quantity` units back into stock.
    fn release_stock(&self, product_code: &str, quantity: u32) -> DispatchResult<()>;
}

/// Per-user shopping baskets.
pub trait BasketStore: Send + Sync {
    /// The user's basket; empty if none exists yet.
    fn get(&self, user_id: &str) -> DispatchResult<Basket>;

    /// Add a line, merging quantities with an existing line for the same product.
    fn add_item(&self, user_id: &str, item: BasketItem) -> DispatchResult<Basket>;

    fn update_quantity(&self, user_id: &str, product_code: &str, quantity: u32)
        -> DispatchResult<()>;

    fn remove_item(&self, user_id: &str, product_code: &str) -> DispatchResult<()>;

    fn clear(&self, user_id: &str) -> DispatchResult<()>;
}

/// Order storage.
pub trait OrderStore: Send + Sync {
    fn insert(&self, order: Order) -> DispatchResult<()>;

    fn find(&self, order_id: &str) -> DispatchResult<Option<Order>>;

    /// A user's orders, newest first.
    fn list_by_user(&self, user_id: &str) -> DispatchResult<Vec<Order>>;

    /// All orders, newest first, optionally filtered by status.
    fn list(&self, status: Option<OrderStatus>) -> DispatchResult<Vec<Order>>;

    /// Change an order's status and return the updated order.
    fn update_status(&self, order_id: &str, status: OrderStatus) -> DispatchResult<Order>;
}

/// Uploaded file storage.
pub trait FileStore: Send + Sync {
    fn save(&self, original_name: &str, bytes: &[u8]) -> DispatchResult<StoredFile>;

    fn find(&self, file_id: &str) -> DispatchResult<Option<StoredFile>>;

    fn read(&self, file_id: &str) -> DispatchResult<Vec<u8>>;

    fn delete(&self, file_id: &str) -> DispatchResult<()>;
}

/// Product category tree.
pub trait CategoryStore: Send + Sync {
    fn find(&self, category_id: u64) -> DispatchResult<Option<Category>>;

    /// Every category, ordered by full name.
    fn list(&self) -> DispatchResult<Vec<Category>>;

    /// Categories whose name or full name contains `keyword`, ordered by full name.
    fn search(&self, keyword: Option<&str>, page: usize, page_size: usize)
        -> DispatchResult<Page<Category>>;

    /// Store a new category under an existing parent and return it with its
    /// id, full name and level assigned.
    fn insert(&self, category: Category) -> DispatchResult<Category>;

    /// Replace a category. Moving it re-places every descendant; a move under
    /// itself or a descendant is rejected.
    fn update(&self, category: &Category) -> DispatchResult<Category>;

    /// Remove a category and its subtree. Returns the removed ids.
    fn delete(&self, category_id: u64) -> DispatchResult<Vec<u64>>;
}

/// Product to category placements.
pub trait CategoryMappingStore: Send + Sync {
    fn find(&self, product_code: &str, category_id: u64) -> DispatchResult<Option<CategoryMapping>>;

    /// Every mapping, ordered by category then display order.
    fn list(&self) -> DispatchResult<Vec<CategoryMapping>>;

    /// Store a new mapping. Fails with a conflict if the pair is already mapped.
    fn insert(&self, mapping: CategoryMapping) -> DispatchResult<()>;

    /// Swap the mapping for the original pair with `mapping` in one step.
    fn replace(
        &self,
        original_product_code: &str,
        original_category_id: u64,
        mapping: CategoryMapping,
    ) -> DispatchResult<()>;

    fn delete(&self, product_code: &str, category_id: u64) -> DispatchResult<()>;

    /// Drop every mapping into the given categories. Returns how many were removed.
    fn delete_by_categories(&self, category_ids: &[u64]) -> DispatchResult<usize>;

    /// Drop every mapping of a product. Returns how many were removed.
    fn delete_by_product(&self, product_code: &str) -> DispatchResult<usize>;
}
