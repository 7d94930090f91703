// src/rotation/mod.rs

pub mod key_rotation;

pub use key_rotation::{preview_key, ApiKeys, CredentialRotator};
