pub mod convert;
pub mod list;
pub mod paramset;
pub mod show;
pub mod targets;
