pub mod category;
pub mod forecast_record;
pub mod grid;
pub(crate) mod loose_string;
