pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use db::create_pool;
pub use error::ReconcileError;
pub use service::{
    build_consolidated_plan, build_transfer_plan, find_opportunities, find_opportunities_in_raw,
    ReconcileParams, ReconciliationService,
};
