use std::sync::Arc;
use vitrine::catalog::{Category, Favorites, Product};
use vitrine::entity::Collection;
use vitrine::sales::{LedgerSale, UserEntry};
use vitrine::user::UserProfile;
use vitrine_storage::StorageBackend;

use crate::auth::{AuthGateway, IdentityProvider};

pub type AppState = Arc<State>;

pub struct State {
    pub storage: Arc<dyn StorageBackend>,
    pub auth: AuthGateway,
    pub products: Collection<Product>,
    pub categories: Collection<Category>,
    pub favorites: Collection<Favorites>,
    pub users: Collection<UserProfile>,
    pub goals: Collection<UserEntry>,
    pub ledger: Collection<LedgerSale>,
}

impl State {
    pub fn new(storage: Arc<dyn StorageBackend>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            auth: AuthGateway::new(identity, storage.clone()),
            products: Collection::new(storage.clone()),
            categories: Collection::new(storage.clone()),
            favorites: Collection::new(storage.clone()),
            users: Collection::new(storage.clone()),
            goals: Collection::new(storage.clone()),
            ledger: Collection::new(storage.clone()),
            storage,
        }
    }
}
