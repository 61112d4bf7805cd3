//! Web module - page layout, callback dispatch and the HTTP host

mod callbacks;
mod layout;
mod server;

pub use server::{serve, AppState, Dashboard};
