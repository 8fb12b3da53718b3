mod messages;
mod state;
mod update;
mod view;

pub use state::App;

use crate::cache::ImageCache;
use crate::config::AppConfig;
use crate::source::MagazineSource;
use iced::{Size, Theme, window};
use std::sync::Arc;

/// Launch the reader window. `initial` opens that magazine straight away.
pub fn run_app(
    config: AppConfig,
    source: Arc<dyn MagazineSource>,
    cache: ImageCache,
    initial: Option<String>,
) -> iced::Result {
    let window_settings = window::Settings {
        size: Size::new(config.window_width, config.window_height),
        min_size: Some(Size::new(480.0, 360.0)),
        ..window::Settings::default()
    };

    iced::application("Magazine Reader", App::update, App::view)
        .window(window_settings)
        .subscription(App::subscription)
        .theme(|_app: &App| Theme::Dark)
        .run_with(move || App::bootstrap(config, source, cache, initial))
}
