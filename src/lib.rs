use config::Config;
use proximity::ProximityQueryEngine;

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod geo;
pub mod middleware;
pub mod models;
pub mod proximity;
pub mod router;
pub mod routes;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub engine: ProximityQueryEngine,
}
