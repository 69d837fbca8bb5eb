use std::sync::Arc;

use toolcrib_auth::InMemoryUserDirectory;
use toolcrib_infra::catalog::Catalog;
use toolcrib_infra::engine::TransitionEngine;
use toolcrib_infra::store::InMemoryInventoryStore;

type Store = Arc<InMemoryInventoryStore>;
type Directory = Arc<InMemoryUserDirectory>;

/// Shared application services handed to every handler via `Extension`.
pub struct AppServices {
    store: Store,
    directory: Directory,
    engine: TransitionEngine<Store, Directory>,
    catalog: Catalog<Store>,
}

impl AppServices {
    pub fn store(&self) -> &InMemoryInventoryStore {
        &self.store
    }

    pub fn directory(&self) -> &InMemoryUserDirectory {
        &self.directory
    }

    pub fn engine(&self) -> &TransitionEngine<Store, Directory> {
        &self.engine
    }

    pub fn catalog(&self) -> &Catalog<Store> {
        &self.catalog
    }
}

/// Wire the in-memory stack around a shared user directory.
pub fn build_services(directory: Directory) -> AppServices {
    let store = Arc::new(InMemoryInventoryStore::new());
    AppServices {
        engine: TransitionEngine::new(store.clone(), directory.clone()),
        catalog: Catalog::new(store.clone()),
        store,
        directory,
    }
}
