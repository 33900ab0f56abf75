pub mod config;
pub mod error;
pub mod messages;
pub mod models;
pub mod token;
pub mod utils;

pub use self::config::*;
pub use self::error::*;
pub use self::messages::*;
pub use self::models::identity::ConnectionIdentity;
pub use self::token::*;
pub use self::utils::*;
