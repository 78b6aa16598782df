pub mod config;
pub mod db;
pub mod error;
pub mod i18n;
pub mod normalize;
pub mod openai;
pub mod record;
pub mod server;
pub mod translation;
