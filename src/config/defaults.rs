use flipbook_core::ReaderOptions;

pub(crate) fn default_reader() -> ReaderOptions {
    ReaderOptions::default()
}

pub(crate) fn default_window_width() -> f32 {
    1280.0
}

pub(crate) fn default_window_height() -> f32 {
    900.0
}

pub(crate) fn default_source_kind() -> crate::config::SourceKind {
    crate::config::SourceKind::Http
}

pub(crate) fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

pub(crate) fn default_magazine_dir() -> String {
    "magazines".to_string()
}

pub(crate) fn default_cache_dir() -> String {
    ".cache".to_string()
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Debug
}

pub(crate) fn default_key_next_page() -> String {
    "arrowright".to_string()
}

pub(crate) fn default_key_prev_page() -> String {
    "arrowleft".to_string()
}

pub(crate) fn default_key_first_page() -> String {
    "home".to_string()
}

pub(crate) fn default_key_library() -> String {
    "escape".to_string()
}

pub(crate) fn default_key_quit() -> String {
    "ctrl+q".to_string()
}
