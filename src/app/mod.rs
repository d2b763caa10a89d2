pub mod ports;
pub mod clean_use_case;
pub mod load_use_case;
