pub mod error;
pub mod document;
pub mod manager;
pub mod legacy;
pub mod experiment;
pub mod discover;
