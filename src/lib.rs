pub mod cache;
pub mod config;
pub mod db;
pub mod display;
pub mod error;
pub mod models;
pub mod refresh;
pub mod routes;
pub mod schema;
pub mod shipment;
pub mod state;
pub mod store;
pub mod views;
pub mod workflow;

pub mod utils {
    pub mod json;
}

pub use refresh::OverviewRefresher;
pub use store::{OrderStore, PgOrderStore};
