//! In-process collaborator implementations.
//!
//! Mutex-guarded maps for accounts, products, baskets, orders, categories
//! and category mappings, plus a disk-backed file store.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DispatchError, DispatchResult, ServiceErrorKind};

use super::model::{
    Basket, BasketItem, Category, CategoryMapping, Order, OrderStatus, Page, Product,
    ProductQuery, ProductSort, StoredFile, User, UserRole,
};
use super::traits::{
    BasketStore, CategoryMappingStore, CategoryStore, FileStore, OrderStore, ProductCatalog,
    UserRepository,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(), // Recover from mutex poisoning
    }
}

fn conflict(message: impl Into<String>) -> DispatchError {
    DispatchError::Service {
        kind: ServiceErrorKind::Conflict {
            message: message.into(),
        },
    }
}

/// In-memory account storage, keyed by user id.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for MemoryUserRepository {
    fn find_by_id(&self, user_id: &str) -> DispatchResult<Option<User>> {
        Ok(lock(&self.users)
            .iter()
            .find(|user| user.user_id == user_id)
            .cloned())
    }

    fn find_by_email(&self, email: &str) -> DispatchResult<Option<User>> {
        Ok(lock(&self.users)
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn save(&self, user: User) -> DispatchResult<()> {
        let mut users = lock(&self.users);
        if users.iter().any(|existing| {
            existing.user_id == user.user_id || existing.email.eq_ignore_ascii_case(&user.email)
        }) {
            return Err(conflict(format!("Email already registered: {}", user.email)));
        }
        debug!(user_id = %user.user_id, "Storing account");
        users.push(user);
        Ok(())
    }

    fn update(&self, user: &User) -> DispatchResult<()> {
        let mut users = lock(&self.users);
        let existing = users
            .iter_mut()
            .find(|existing| existing.user_id == user.user_id)
            .ok_or_else(|| DispatchError::not_found("User", &user.user_id))?;
        *existing = user.clone();
        Ok(())
    }

    fn list(&self) -> DispatchResult<Vec<User>> {
        Ok(lock(&self.users).clone())
    }

    fn update_role(&self, user_id: &str, role: UserRole) -> DispatchResult<()> {
        let mut users = lock(&self.users);
        let user = users
            .iter_mut()
            .find(|user| user.user_id == user_id)
            .ok_or_else(|| DispatchError::not_found("User", user_id))?;
        user.role = role;
        Ok(())
    }
}

/// In-memory product catalog.
#[derive(Default)]
pub struct MemoryProductCatalog {
    products: Mutex<HashMap<String, Product>>,
}

impl MemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProductCatalog for MemoryProductCatalog {
    fn find(&self, product_code: &str) -> DispatchResult<Option<Product>> {
        Ok(lock(&self.products).get(product_code).cloned())
    }

    fn search(&self, query: &ProductQuery) -> DispatchResult<Page<Product>> {
        let keyword = query
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_lowercase);

        let mut matches: Vec<Product> = lock(&self.products)
            .values()
            .filter(|p| query.include_hidden || p.is_on_sale())
            .filter(|p| match &keyword {
                Some(k) => {
                    p.product_name.to_lowercase().contains(k)
                        || p.product_code.to_lowercase().contains(k)
                }
                None => true,
            })
            .cloned()
            .collect();

        match query.sort {
            ProductSort::Latest => matches.sort_by(|a, b| {
                b.registered_at
                    .cmp(&a.registered_at)
                    .then_with(|| a.product_code.cmp(&b.product_code))
            }),
            ProductSort::PriceAsc => matches.sort_by(|a, b| {
                a.sale_price
                    .cmp(&b.sale_price)
                    .then_with(|| a.product_code.cmp(&b.product_code))
            }),
            ProductSort::PriceDesc => matches.sort_by(|a, b| {
                b.sale_price
                    .cmp(&a.sale_price)
                    .then_with(|| a.product_code.cmp(&b.product_code))
            }),
        }

        let total = matches.len();
        let page = Page::new(Vec::new(), query.page, query.page_size, total);
        let items = matches
            .into_iter()
            .skip((page.current_page - 1) * page.page_size)
            .take(page.page_size)
            .collect();

        Ok(Page { items, ..page })
    }

    fn list(&self) -> DispatchResult<Vec<Product>> {
        let mut products: Vec<Product> = lock(&self.products).values().cloned().collect();
        products.sort_by(|a, b| a.product_code.cmp(&b.product_code));
        Ok(products)
    }

    fn save(&self, product: Product) -> DispatchResult<()> {
        let mut products = lock(&self.products);
        if products.contains_key(&product.product_code) {
            return Err(conflict(format!(
                "Product code already exists: {}",
                product.product_code
            )));
        }
        products.insert(product.product_code.clone(), product);
        Ok(())
    }

    fn update(&self, product: &Product) -> DispatchResult<()> {
        let mut products = lock(&self.products);
        let existing = products
            .get_mut(&product.product_code)
            .ok_or_else(|| DispatchError::not_found("Product", &product.product_code))?;
        *existing = product.clone();
        Ok(())
    }

    fn delete(&self, product_code: &str) -> DispatchResult<Product> {
        lock(&self.products)
            .remove(product_code)
            .ok_or_else(|| DispatchError::not_found("Product", product_code))
    }

    fn reserve_stock(&self, product_code: &str, quantity: u32) -> DispatchResult<()> {
        let mut products = lock(&self.products);
        let product = products
            .get_mut(product_code)
            .ok_or_else(|| DispatchError::not_found("Product", product_code))?;
        if product.stock < quantity {
            return Err(DispatchError::Service {
                kind: ServiceErrorKind::InsufficientStock {
                    product_code: product_code.to_string(),
                    requested: quantity,
                    available: product.stock,
                },
            });
        }
        product.stock -= quantity;
        Ok(())
    }

    fn release_stock(&self, product_code: &str, quantity: u32) -> DispatchResult<()> {
        let mut products = lock(&self.products);
        let product = products
            .get_mut(product_code)
            .ok_or_else(|| DispatchError::not_found("Product", product_code))?;
        product.stock = product.stock.saturating_add(quantity);
        Ok(())
    }
}

/// In-memory baskets, keyed by user id.
#[derive(Default)]
pub struct MemoryBasketStore {
    baskets: Mutex<HashMap<String, Basket>>,
}

impl MemoryBasketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BasketStore for MemoryBasketStore {
    fn get(&self, user_id: &str) -> DispatchResult<Basket> {
        Ok(lock(&self.baskets)
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| Basket::empty(user_id)))
    }

    fn add_item(&self, user_id: &str, item: BasketItem) -> DispatchResult<Basket> {
        let mut baskets = lock(&self.baskets);
        let basket = baskets
            .entry(user_id.to_string())
            .or_insert_with(|| Basket::empty(user_id));

        match basket
            .items
            .iter_mut()
            .find(|existing| existing.product_code == item.product_code)
        {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
                existing.unit_price = item.unit_price;
            }
            None => basket.items.push(item),
        }
        Ok(basket.clone())
    }

    fn update_quantity(
        &self,
        user_id: &str,
        product_code: &str,
        quantity: u32,
    ) -> DispatchResult<()> {
        let mut baskets = lock(&self.baskets);
        let item = baskets
            .get_mut(user_id)
            .and_then(|basket| {
                basket
                    .items
                    .iter_mut()
                    .find(|item| item.product_code == product_code)
            })
            .ok_or_else(|| DispatchError::not_found("Basket item", product_code))?;
        item.quantity = quantity;
        Ok(())
    }

    fn remove_item(&self, user_id: &str, product_code: &str) -> DispatchResult<()> {
        let mut baskets = lock(&self.baskets);
        let basket = baskets
            .get_mut(user_id)
            .ok_or_else(|| DispatchError::not_found("Basket item", product_code))?;
        let before = basket.items.len();
        basket.items.retain(|item| item.product_code != product_code);
        if basket.items.len() == before {
            return Err(DispatchError::not_found("Basket item", product_code));
        }
        Ok(())
    }

    fn clear(&self, user_id: &str) -> DispatchResult<()> {
        lock(&self.baskets).remove(user_id);
        Ok(())
    }
}

/// In-memory order storage.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Mutex<Vec<Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.ordered_at.cmp(&a.ordered_at));
    orders
}

impl OrderStore for MemoryOrderStore {
    fn insert(&self, order: Order) -> DispatchResult<()> {
        let mut orders = lock(&self.orders);
        if orders.iter().any(|existing| existing.order_id == order.order_id) {
            return Err(conflict(format!("Order id already used: {}", order.order_id)));
        }
        orders.push(order);
        Ok(())
    }

    fn find(&self, order_id: &str) -> DispatchResult<Option<Order>> {
        Ok(lock(&self.orders)
            .iter()
            .find(|order| order.order_id == order_id)
            .cloned())
    }

    fn list_by_user(&self, user_id: &str) -> DispatchResult<Vec<Order>> {
        let orders = lock(&self.orders)
            .iter()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(orders))
    }

    fn list(&self, status: Option<OrderStatus>) -> DispatchResult<Vec<Order>> {
        let orders = lock(&self.orders)
            .iter()
            .filter(|order| status.map_or(true, |s| order.status == s))
            .cloned()
            .collect();
        Ok(newest_first(orders))
    }

    fn update_status(&self, order_id: &str, status: OrderStatus) -> DispatchResult<Order> {
        let mut orders = lock(&self.orders);
        let order = orders
            .iter_mut()
            .find(|order| order.order_id == order_id)
            .ok_or_else(|| DispatchError::not_found("Order", order_id))?;
        order.status = status;
        Ok(order.clone())
    }
}

#[derive(Default)]
struct CategoryTree {
    next_id: u64,
    nodes: HashMap<u64, Category>,
}

impl CategoryTree {
    /// Ids below `root`, parents before children.
    fn descendants(&self, root: u64) -> Vec<u64> {
        let mut found = Vec::new();
        let mut frontier = vec![root];
        while let Some(parent) = frontier.pop() {
            let mut children: Vec<u64> = self
                .nodes
                .values()
                .filter(|c| c.parent_id == Some(parent))
                .map(|c| c.category_id)
                .collect();
            children.sort_unstable();
            found.extend(&children);
            frontier.extend(children);
        }
        found
    }

    fn parent_of(&self, category: &Category) -> DispatchResult<Option<Category>> {
        match category.parent_id {
            Some(parent_id) => self
                .nodes
                .get(&parent_id)
                .cloned()
                .map(Some)
                .ok_or_else(|| DispatchError::not_found("Category", parent_id.to_string())),
            None => Ok(None),
        }
    }

    /// Recompute full name and level for everything below `root`.
    fn replace_subtree(&mut self, root: u64) {
        for id in self.descendants(root) {
            let parent = self
                .nodes
                .get(&id)
                .and_then(|c| c.parent_id)
                .and_then(|p| self.nodes.get(&p))
                .cloned();
            if let Some(node) = self.nodes.get_mut(&id) {
                node.place_under(parent.as_ref());
            }
        }
    }
}

/// In-memory category tree with sequential ids.
#[derive(Default)]
pub struct MemoryCategoryStore {
    tree: Mutex<CategoryTree>,
}

impl MemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn by_full_name(a: &Category, b: &Category) -> std::cmp::Ordering {
    a.full_name
        .cmp(&b.full_name)
        .then_with(|| a.category_id.cmp(&b.category_id))
}

impl CategoryStore for MemoryCategoryStore {
    fn find(&self, category_id: u64) -> DispatchResult<Option<Category>> {
        Ok(lock(&self.tree).nodes.get(&category_id).cloned())
    }

    fn list(&self) -> DispatchResult<Vec<Category>> {
        let mut categories: Vec<Category> = lock(&self.tree).nodes.values().cloned().collect();
        categories.sort_by(by_full_name);
        Ok(categories)
    }

    fn search(
        &self,
        keyword: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> DispatchResult<Page<Category>> {
        let keyword = keyword
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_lowercase);

        let mut matches: Vec<Category> = lock(&self.tree)
            .nodes
            .values()
            .filter(|c| match &keyword {
                Some(k) => {
                    c.name.to_lowercase().contains(k) || c.full_name.to_lowercase().contains(k)
                }
                None => true,
            })
            .cloned()
            .collect();
        matches.sort_by(by_full_name);

        let page = Page::new(Vec::new(), page, page_size, matches.len());
        let items = matches
            .into_iter()
            .skip((page.current_page - 1) * page.page_size)
            .take(page.page_size)
            .collect();

        Ok(Page { items, ..page })
    }

    fn insert(&self, mut category: Category) -> DispatchResult<Category> {
        let mut tree = lock(&self.tree);
        let parent = tree.parent_of(&category)?;

        tree.next_id += 1;
        category.category_id = tree.next_id;
        category.place_under(parent.as_ref());
        tree.nodes.insert(category.category_id, category.clone());

        debug!(
            category_id = category.category_id,
            full_name = %category.full_name,
            "Category stored"
        );
        Ok(category)
    }

    fn update(&self, category: &Category) -> DispatchResult<Category> {
        let mut tree = lock(&self.tree);
        let id = category.category_id;
        if !tree.nodes.contains_key(&id) {
            return Err(DispatchError::not_found("Category", id.to_string()));
        }

        if let Some(parent_id) = category.parent_id {
            if parent_id == id || tree.descendants(id).contains(&parent_id) {
                return Err(DispatchError::invalid_parameter(
                    "parentId",
                    "A category cannot be moved under itself",
                ));
            }
        }

        let parent = tree.parent_of(category)?;
        let mut updated = category.clone();
        updated.place_under(parent.as_ref());
        tree.nodes.insert(id, updated.clone());
        tree.replace_subtree(id);

        Ok(updated)
    }

    fn delete(&self, category_id: u64) -> DispatchResult<Vec<u64>> {
        let mut tree = lock(&self.tree);
        if !tree.nodes.contains_key(&category_id) {
            return Err(DispatchError::not_found("Category", category_id.to_string()));
        }

        let mut removed = vec![category_id];
        removed.extend(tree.descendants(category_id));
        for id in &removed {
            tree.nodes.remove(id);
        }
        Ok(removed)
    }
}

/// In-memory product to category mappings.
#[derive(Default)]
pub struct MemoryCategoryMappingStore {
    mappings: Mutex<Vec<CategoryMapping>>,
}

impl MemoryCategoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn mapping_not_found(product_code: &str, category_id: u64) -> DispatchError {
    DispatchError::not_found("Mapping", format!("{}/{}", product_code, category_id))
}

fn mapping_exists(product_code: &str, category_id: u64) -> DispatchError {
    conflict(format!(
        "Product {} is already mapped to category {}",
        product_code, category_id
    ))
}

impl CategoryMappingStore for MemoryCategoryMappingStore {
    fn find(&self, product_code: &str, category_id: u64) -> DispatchResult<Option<CategoryMapping>> {
        Ok(lock(&self.mappings)
            .iter()
            .find(|m| m.links(product_code, category_id))
            .cloned())
    }

    fn list(&self) -> DispatchResult<Vec<CategoryMapping>> {
        let mut mappings = lock(&self.mappings).clone();
        mappings.sort_by(|a, b| {
            a.category_id
                .cmp(&b.category_id)
                .then_with(|| a.display_order.cmp(&b.display_order))
                .then_with(|| a.product_code.cmp(&b.product_code))
        });
        Ok(mappings)
    }

    fn insert(&self, mapping: CategoryMapping) -> DispatchResult<()> {
        let mut mappings = lock(&self.mappings);
        if mappings
            .iter()
            .any(|m| m.links(&mapping.product_code, mapping.category_id))
        {
            return Err(mapping_exists(&mapping.product_code, mapping.category_id));
        }
        mappings.push(mapping);
        Ok(())
    }

    fn replace(
        &self,
        original_product_code: &str,
        original_category_id: u64,
        mapping: CategoryMapping,
    ) -> DispatchResult<()> {
        let mut mappings = lock(&self.mappings);
        let index = mappings
            .iter()
            .position(|m| m.links(original_product_code, original_category_id))
            .ok_or_else(|| mapping_not_found(original_product_code, original_category_id))?;

        let moved = !mapping.links(original_product_code, original_category_id);
        if moved
            && mappings
                .iter()
                .any(|m| m.links(&mapping.product_code, mapping.category_id))
        {
            return Err(mapping_exists(&mapping.product_code, mapping.category_id));
        }

        mappings[index] = mapping;
        Ok(())
    }

    fn delete(&self, product_code: &str, category_id: u64) -> DispatchResult<()> {
        let mut mappings = lock(&self.mappings);
        let index = mappings
            .iter()
            .position(|m| m.links(product_code, category_id))
            .ok_or_else(|| mapping_not_found(product_code, category_id))?;
        mappings.remove(index);
        Ok(())
    }

    fn delete_by_categories(&self, category_ids: &[u64]) -> DispatchResult<usize> {
        let mut mappings = lock(&self.mappings);
        let before = mappings.len();
        mappings.retain(|m| !category_ids.contains(&m.category_id));
        Ok(before - mappings.len())
    }

    fn delete_by_product(&self, product_code: &str) -> DispatchResult<usize> {
        let mut mappings = lock(&self.mappings);
        let before = mappings.len();
        mappings.retain(|m| m.product_code != product_code);
        Ok(before - mappings.len())
    }
}

/// File storage in a directory: `{id}.bin` holds the bytes, `{id}.json` the metadata.
pub struct DiskFileStore {
    root: PathBuf,
}

impl DiskFileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn new(root: &Path) -> DispatchResult<Self> {
        if !root.exists() {
            debug!(path = %root.display(), "Creating upload directory");
            fs::create_dir_all(root)?;
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // Ids are generated here; anything else never maps to a path.
    fn is_store_id(file_id: &str) -> bool {
        !file_id.is_empty()
            && file_id.len() <= 64
            && file_id.chars().all(|c| c.is_ascii_alphanumeric())
    }

    fn data_path(&self, file_id: &str) -> PathBuf {
        self.root.join(format!("{}.bin", file_id))
    }

    fn meta_path(&self, file_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", file_id))
    }
}

impl FileStore for DiskFileStore {
    fn save(&self, original_name: &str, bytes: &[u8]) -> DispatchResult<StoredFile> {
        let file_id = Uuid::new_v4().simple().to_string();
        let extension = Path::new(original_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let stored = StoredFile {
            file_id: file_id.clone(),
            original_name: original_name.to_string(),
            extension,
            size: bytes.len() as u64,
            saved_at: Utc::now(),
        };

        fs::write(self.data_path(&file_id), bytes)?;
        fs::write(self.meta_path(&file_id), serde_json::to_vec(&stored)?)?;

        debug!(file_id = %file_id, size = bytes.len(), "Stored file");
        Ok(stored)
    }

    fn find(&self, file_id: &str) -> DispatchResult<Option<StoredFile>> {
        if !Self::is_store_id(file_id) {
            return Ok(None);
        }
        let meta_path = self.meta_path(file_id);
        if !meta_path.exists() {
            return Ok(None);
        }
        let raw = fs::read(meta_path)?;
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    fn read(&self, file_id: &str) -> DispatchResult<Vec<u8>> {
        if !Self::is_store_id(file_id) {
            return Err(DispatchError::not_found("File", file_id));
        }
        match fs::read(self.data_path(file_id)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DispatchError::not_found("File", file_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, file_id: &str) -> DispatchResult<()> {
        if !Self::is_store_id(file_id) {
            return Err(DispatchError::not_found("File", file_id));
        }
        for path in [self.data_path(file_id), self.meta_path(file_id)] {
            if let Err(e) = fs::remove_file(&path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "Failed to remove stored file");
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::model::ProductStatus;
    use chrono::Duration;

    fn product(code: &str, price: u32, stock: u32, age_minutes: i64) -> Product {
        Product {
            product_code: code.to_string(),
            product_name: format!("Product {}", code),
            detail_explain: String::new(),
            file_id: None,
            customer_price: price,
            sale_price: price,
            stock,
            delivery_fee: 2500,
            status: ProductStatus::OnSale,
            registered_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let repo = MemoryUserRepository::new();
        repo.save(User::new("kim@example.com", "Kim", "hash")).unwrap();
        let err = repo
            .save(User::new("KIM@example.com", "Kim2", "hash"))
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Service {
                kind: ServiceErrorKind::Conflict { .. }
            }
        ));
    }

    #[test]
    fn test_update_role() {
        let repo = MemoryUserRepository::new();
        repo.save(User::new("kim@example.com", "Kim", "hash")).unwrap();
        repo.update_role("kim@example.com", UserRole::Admin).unwrap();
        assert!(repo.find_by_id("kim@example.com").unwrap().unwrap().is_admin());
        assert!(repo.update_role("nobody", UserRole::Admin).unwrap_err().is_not_found());
    }

    #[test]
    fn test_search_sorts_and_pages() {
        let catalog = MemoryProductCatalog::new();
        catalog.save(product("A", 3000, 1, 3)).unwrap();
        catalog.save(product("B", 1000, 1, 2)).unwrap();
        catalog.save(product("C", 2000, 1, 1)).unwrap();
        let mut hidden = product("D", 10, 1, 0);
        hidden.status = ProductStatus::Hidden;
        catalog.save(hidden).unwrap();

        let mut query = ProductQuery::new(1, 2);
        let page = catalog.search(&query).unwrap();
        assert_eq!(page.total_count, 3);
        assert_eq!(page.total_pages, 2);
        let codes: Vec<_> = page.items.iter().map(|p| p.product_code.as_str()).collect();
        assert_eq!(codes, ["C", "B"]);

        query.sort = ProductSort::PriceAsc;
        query.page = 2;
        let page = catalog.search(&query).unwrap();
        assert_eq!(page.items[0].product_code, "A");

        query.include_hidden = true;
        query.page = 1;
        assert_eq!(catalog.search(&query).unwrap().items[0].product_code, "D");
    }

    #[test]
    fn test_search_keyword() {
        let catalog = MemoryProductCatalog::new();
        catalog.save(product("APPLE-1", 1000, 1, 0)).unwrap();
        catalog.save(product("PEAR-1", 1000, 1, 0)).unwrap();

        let mut query = ProductQuery::new(1, 16);
        query.keyword = Some("apple".to_string());
        let page = catalog.search(&query).unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].product_code, "APPLE-1");
    }

    #[test]
    fn test_reserve_and_release_stock() {
        let catalog = MemoryProductCatalog::new();
        catalog.save(product("A", 1000, 5, 0)).unwrap();

        catalog.reserve_stock("A", 3).unwrap();
        let err = catalog.reserve_stock("A", 3).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Service {
                kind: ServiceErrorKind::InsufficientStock { available: 2, .. }
            }
        ));
        catalog.release_stock("A", 3).unwrap();
        assert_eq!(catalog.find("A").unwrap().unwrap().stock, 5);
    }

    #[test]
    fn test_basket_merges_lines() {
        let store = MemoryBasketStore::new();
        let p = product("A", 1000, 5, 0);
        store.add_item("u", BasketItem::from_product(&p, 1)).unwrap();
        let basket = store.add_item("u", BasketItem::from_product(&p, 2)).unwrap();
        assert_eq!(basket.items.len(), 1);
        assert_eq!(basket.items[0].quantity, 3);

        store.update_quantity("u", "A", 7).unwrap();
        assert_eq!(store.get("u").unwrap().items[0].quantity, 7);

        assert!(store.remove_item("u", "B").unwrap_err().is_not_found());
        store.remove_item("u", "A").unwrap();
        assert!(store.get("u").unwrap().is_empty());
    }

    #[test]
    fn test_disk_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskFileStore::new(&dir.path().join("uploads")).unwrap();

        let stored = store.save("photo.PNG", b"\x89PNG").unwrap();
        assert_eq!(stored.extension, "png");

        let found = store.find(&stored.file_id).unwrap().unwrap();
        assert_eq!(found, stored);
        assert_eq!(store.read(&stored.file_id).unwrap(), b"\x89PNG");

        assert!(store.find("../etc/passwd").unwrap().is_none());
        assert!(store.read("missing").unwrap_err().is_not_found());

        store.delete(&stored.file_id).unwrap();
        assert!(store.find(&stored.file_id).unwrap().is_none());
    }

    #[test]
    fn test_category_tree_placement_and_move() {
        let store = MemoryCategoryStore::new();
        let furniture = store.insert(Category::draft("Furniture", None)).unwrap();
        let desks = store
            .insert(Category::draft("Desks", Some(furniture.category_id)))
            .unwrap();
        let standing = store
            .insert(Category::draft("Standing", Some(desks.category_id)))
            .unwrap();
        assert_eq!(standing.full_name, "Furniture > Desks > Standing");
        assert_eq!(standing.level, 3);

        let office = store.insert(Category::draft("Office", None)).unwrap();
        let mut moved = desks.clone();
        moved.parent_id = Some(office.category_id);
        store.update(&moved).unwrap();

        let standing = store.find(standing.category_id).unwrap().unwrap();
        assert_eq!(standing.full_name, "Office > Desks > Standing");

        let missing_parent = store.insert(Category::draft("Lamps", Some(99)));
        assert!(missing_parent.unwrap_err().is_not_found());
    }

    #[test]
    fn test_category_cannot_move_under_own_subtree() {
        let store = MemoryCategoryStore::new();
        let root = store.insert(Category::draft("Root", None)).unwrap();
        let child = store
            .insert(Category::draft("Child", Some(root.category_id)))
            .unwrap();

        let mut cyclic = root.clone();
        cyclic.parent_id = Some(child.category_id);
        assert!(store.update(&cyclic).is_err());

        cyclic.parent_id = Some(root.category_id);
        assert!(store.update(&cyclic).is_err());
        assert_eq!(store.find(root.category_id).unwrap().unwrap().parent_id, None);
    }

    #[test]
    fn test_category_delete_removes_subtree() {
        let store = MemoryCategoryStore::new();
        let root = store.insert(Category::draft("Root", None)).unwrap();
        let child = store
            .insert(Category::draft("Child", Some(root.category_id)))
            .unwrap();
        let other = store.insert(Category::draft("Other", None)).unwrap();

        let removed = store.delete(root.category_id).unwrap();
        assert_eq!(removed, vec![root.category_id, child.category_id]);
        assert_eq!(store.list().unwrap(), vec![other]);
        assert!(store.delete(root.category_id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_category_search_pages_by_full_name() {
        let store = MemoryCategoryStore::new();
        let root = store.insert(Category::draft("Desks", None)).unwrap();
        store
            .insert(Category::draft("Standing", Some(root.category_id)))
            .unwrap();
        store.insert(Category::draft("Chairs", None)).unwrap();

        let page = store.search(Some("desk"), 1, 10).unwrap();
        assert_eq!(page.total_count, 2);
        assert_eq!(page.items[1].full_name, "Desks > Standing");

        let page = store.search(None, 2, 2).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].full_name, "Desks > Standing");
    }

    #[test]
    fn test_mapping_duplicates_and_replace() {
        let store = MemoryCategoryMappingStore::new();
        store.insert(CategoryMapping::new("A", 1)).unwrap();
        store.insert(CategoryMapping::new("B", 1)).unwrap();
        assert!(matches!(
            store.insert(CategoryMapping::new("A", 1)).unwrap_err(),
            DispatchError::Service {
                kind: ServiceErrorKind::Conflict { .. }
            }
        ));

        assert!(store.replace("A", 1, CategoryMapping::new("B", 1)).is_err());
        assert!(store.find("A", 1).unwrap().is_some());

        let mut reordered = CategoryMapping::new("A", 1);
        reordered.display_order = 5;
        store.replace("A", 1, reordered).unwrap();
        assert_eq!(store.find("A", 1).unwrap().unwrap().display_order, 5);

        store.replace("A", 1, CategoryMapping::new("A", 2)).unwrap();
        assert!(store.find("A", 1).unwrap().is_none());
        assert!(store.find("A", 2).unwrap().is_some());
        assert!(store.replace("A", 1, CategoryMapping::new("A", 3)).unwrap_err().is_not_found());
    }

    #[test]
    fn test_mapping_bulk_deletes() {
        let store = MemoryCategoryMappingStore::new();
        store.insert(CategoryMapping::new("A", 1)).unwrap();
        store.insert(CategoryMapping::new("A", 2)).unwrap();
        store.insert(CategoryMapping::new("B", 2)).unwrap();
        store.insert(CategoryMapping::new("C", 3)).unwrap();

        assert_eq!(store.delete_by_categories(&[2, 3]).unwrap(), 3);
        assert_eq!(store.delete_by_product("A").unwrap(), 1);
        assert!(store.list().unwrap().is_empty());
        assert!(store.delete("A", 1).unwrap_err().is_not_found());
    }
}
