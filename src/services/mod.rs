//! Domain collaborators.
//!
//! Commands consume persistence through the traits in [`traits`]; the
//! in-process implementations live in `memory` and are wired together by
//! [`ServiceRegistry`].

mod memory;
mod model;
mod registry;
pub mod traits;

pub use memory::{
    DiskFileStore, MemoryBasketStore, MemoryCategoryMappingStore, MemoryCategoryStore,
    MemoryOrderStore, MemoryProductCatalog, MemoryUserRepository,
};
pub use model::{
    Basket, BasketItem, Category, CategoryMapping, DeliveryInfo, Order, OrderItem, OrderStatus, Page, Product, ProductQuery,
    ProductSort, ProductStatus, StoredFile, User, UserRole, UserStatus,
};
pub use registry::ServiceRegistry;
pub use traits::{
    BasketStore, CategoryMappingStore, CategoryStore, FileStore, OrderStore, ProductCatalog,
    UserRepository,
};
