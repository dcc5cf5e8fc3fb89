//! Shared application state handed to every handler.

use crate::services::{
    folders::FolderService, listing::ListingService, store_client::StoreClient,
    transfer::TransferService,
};

#[derive(Clone)]
pub struct AppState {
    pub store: StoreClient,
    pub listing: ListingService,
    pub folders: FolderService,
    pub transfer: TransferService,
    pub session_token: String,
}

impl AppState {
    /// Wire the services around one shared store client.
    pub fn new(store: StoreClient, session_token: String) -> Self {
        Self {
            listing: ListingService::new(store.clone()),
            folders: FolderService::new(store.clone()),
            transfer: TransferService::new(store.clone()),
            store,
            session_token,
        }
    }
}
