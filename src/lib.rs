pub mod api;
pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod mail;
pub mod otp;
pub mod storage;
