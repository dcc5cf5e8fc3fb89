//! Service layer: the store client plus the three thin services built
//! on top of it (listing, folder emulation, transfer authorization).

pub mod folders;
pub mod listing;
pub mod store_client;
pub mod transfer;
