pub mod accounts;
pub mod auth;
pub mod config;
pub mod error;
pub mod snippets;
pub mod state;
pub mod web;
