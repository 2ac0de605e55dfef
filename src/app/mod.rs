pub mod feed_use_case;
pub mod ports;
