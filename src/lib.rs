pub mod agent;
pub mod auth;
pub mod configuration;
pub mod draft;
pub mod editor;
pub mod error;
pub mod hooks;
pub mod protocol;
pub mod retention;
pub mod routes;
pub mod startup;
pub mod store;
pub mod sync;
pub mod telemetry;
