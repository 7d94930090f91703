// src/storage/mod.rs

pub mod cursor;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;
pub mod traits;

pub use cursor::cursor_key;
pub use memory::InMemoryCursorStore;
#[cfg(feature = "redis")]
pub use self::redis::RedisCursorStore;
pub use traits::CursorStore;
