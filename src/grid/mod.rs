pub mod address;
pub mod error;
pub mod locate_grid;
