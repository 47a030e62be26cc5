mod or_log;
pub use or_log::OrLog;

mod string_utils;
pub use string_utils::is_channel_name;
