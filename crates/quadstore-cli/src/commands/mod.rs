pub mod inspect;
pub mod list;
pub mod truncate;
pub mod verify;
