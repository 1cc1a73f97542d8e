pub mod ports;
pub mod fetch_use_case;
pub mod clean_use_case;
pub mod data_check_use_case;
pub mod evaluate_use_case;
pub mod upload_use_case;
pub mod stage;
