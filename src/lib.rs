pub mod actions;
pub mod backfill;
pub mod chain;
pub mod config;
pub mod events;
pub mod executor;
pub mod fetch;
pub mod flows;
pub mod input;
pub mod logging;
pub mod state;
pub mod view;
pub mod watcher;
