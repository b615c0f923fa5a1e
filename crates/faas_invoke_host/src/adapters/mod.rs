pub mod log_sink;
