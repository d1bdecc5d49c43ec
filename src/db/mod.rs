pub mod cache;
pub mod db;
pub mod jobdb;
pub mod quotedb;
pub mod userdb;
