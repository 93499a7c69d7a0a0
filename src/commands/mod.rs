pub mod batch;
pub mod classify;
pub mod export;
pub mod extract;
pub mod import;
pub mod restore;
pub mod status;

mod manifest;
