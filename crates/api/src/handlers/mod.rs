pub mod runway;
pub mod script;
pub mod speech;
pub mod upload;
