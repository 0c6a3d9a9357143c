pub mod models;

pub use models::{BanSpec, ChatEvent, UserId};
