pub mod commands;
pub mod config;
pub mod dispatch;
pub mod init;
pub mod serve;
