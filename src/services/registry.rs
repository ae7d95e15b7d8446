//! Service registry.
//!
//! Owns the collaborators shared by every command for the life of the
//! process.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::hash_password;
use crate::config::Settings;
use crate::error::DispatchResult;

use super::memory::{
    DiskFileStore, MemoryBasketStore, MemoryCategoryMappingStore, MemoryCategoryStore,
    MemoryOrderStore, MemoryProductCatalog, MemoryUserRepository,
};
use super::model::{User, UserRole};
use super::traits::{
    BasketStore, CategoryMappingStore, CategoryStore, FileStore, OrderStore, ProductCatalog,
    UserRepository,
};

/// Collaborators handed to command factories.
#[derive(Clone)]
pub struct ServiceRegistry {
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductCatalog>,
    pub baskets: Arc<dyn BasketStore>,
    pub orders: Arc<dyn OrderStore>,
    pub files: Arc<dyn FileStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub mappings: Arc<dyn CategoryMappingStore>,
}

impl ServiceRegistry {
    /// Build the process-wide registry from configuration.
    ///
    /// Creates the upload directory and seeds the bootstrap administrator
    /// when `[auth]` names one.
    pub fn initialize(settings: &Settings) -> DispatchResult<Self> {
        let registry = Self::in_memory(&settings.paths.upload_dir)?;

        if let (Some(email), Some(password)) = (
            settings.auth.admin_email.as_deref(),
            settings.auth.admin_password.as_deref(),
        ) {
            registry.seed_admin(email, password)?;
        }

        info!(
            upload_dir = %settings.paths.upload_dir.display(),
            "Service registry initialized"
        );

        Ok(registry)
    }

    /// In-memory stores with files kept under `upload_dir`.
    pub fn in_memory(upload_dir: &Path) -> DispatchResult<Self> {
        Ok(Self {
            users: Arc::new(MemoryUserRepository::new()),
            products: Arc::new(MemoryProductCatalog::new()),
            baskets: Arc::new(MemoryBasketStore::new()),
            orders: Arc::new(MemoryOrderStore::new()),
            files: Arc::new(DiskFileStore::new(upload_dir)?),
            categories: Arc::new(MemoryCategoryStore::new()),
            mappings: Arc::new(MemoryCategoryMappingStore::new()),
        })
    }

    /// Create an administrator account unless the email is already registered.
    pub fn seed_admin(&self, email: &str, password: &str) -> DispatchResult<()> {
        if self.users.find_by_email(email)?.is_some() {
            warn!(email = %email, "Bootstrap administrator already exists");
            return Ok(());
        }

        let mut admin = User::new(email, "Administrator", hash_password(password)?);
        admin.role = UserRole::Admin;
        self.users.save(admin)?;

        info!(email = %email, "Bootstrap administrator created");
        Ok(())
    }

    /// Release resources at process stop.
    pub fn shutdown(&self) {
        match (self.users.list(), self.orders.list(None)) {
            (Ok(users), Ok(orders)) => info!(
                users = users.len(),
                orders = orders.len(),
                "Service registry shut down"
            ),
            _ => info!("Service registry shut down"),
        }
    }
}
