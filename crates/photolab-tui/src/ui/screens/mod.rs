//! Screen modules for different views

pub mod editor;
pub mod home;
pub mod pin_entry;
