pub mod period;
pub mod text;

pub use period::{
    calculate_day_date, find_period_keyword, is_time_period_label, normalize_time,
    period_from_label, start_hour,
};
pub use text::{
    activity_icon, clean_text, day_tags, estimate_cost, extract_activity_title, extract_cost,
    extract_day_title, extract_duration, extract_tips, is_meta_line, is_noise_line, truncate_chars,
};
