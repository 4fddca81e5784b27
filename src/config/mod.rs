pub mod db;
pub mod environment;
