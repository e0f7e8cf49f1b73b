// 模組定義
pub mod command;
pub mod config;
pub mod messaging;
pub mod player;
pub mod server;
