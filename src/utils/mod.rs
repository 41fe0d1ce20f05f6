pub mod environment;
pub mod paths;

pub use environment::{CONFIG_PATH_ENV, DEFAULT_CONFIG_FILENAME, resolve_config_path};
pub use paths::{expand_tilde, format_path_with_tilde, open_input_file, validate_file_size};
