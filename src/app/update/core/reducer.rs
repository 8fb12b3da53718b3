use super::super::super::messages::{Message, SortColumn};
use super::super::super::state::{App, ReadingState, Screen};
use super::super::{Effect, ImageJob};
use super::shortcuts::ShortcutAction;
use crate::source::{MagazineContent, MagazineSummary};
use flipbook_core::{FlipbookReader, NavIntent, ReaderProps};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;
use tracing::{debug, info, warn};

impl App {
    pub(in crate::app) fn reduce(&mut self, message: Message) -> Vec<Effect> {
        let mut effects = Vec::new();

        match message {
            Message::RefreshLibrary => self.handle_refresh_library(&mut effects),
            Message::LibraryLoaded(result) => self.handle_library_loaded(result),
            Message::FilterChanged(filter) => self.library.filter = filter,
            Message::SortBy(column) => self.handle_sort_by(column),
            Message::OpenMagazine(id) => self.handle_open_magazine(id, &mut effects),
            Message::LoadProgress { id, percent } => self.handle_load_progress(&id, percent),
            Message::MagazineFetched { id, result } => {
                self.handle_magazine_fetched(id, result, &mut effects)
            }
            Message::BackToLibrary => self.handle_back_to_library(),
            Message::Navigate(intent) => self.handle_navigate(intent),
            Message::PointerMoved(point) => self.handle_pointer_moved(point.x),
            Message::PointerPressed => self.handle_pointer_pressed(),
            Message::PointerReleased => self.handle_pointer_released(),
            Message::ImageLoaded {
                mount,
                handle,
                result,
            } => self.handle_image_loaded(mount, handle, result),
            Message::WindowResized { width, height } => self.handle_window_resized(width, height),
            Message::KeyPressed { key, modifiers } => {
                match self.shortcut_for_key(key, modifiers) {
                    Some(ShortcutAction::Navigate(nav_key)) => {
                        if self.reading().is_some() {
                            self.keys.dispatch(nav_key, Instant::now());
                        }
                    }
                    Some(ShortcutAction::Library) => self.handle_back_to_library(),
                    Some(ShortcutAction::Quit) => effects.push(Effect::Quit),
                    None => {}
                }
            }
            Message::Tick(now) => self.handle_tick(now),
            Message::Quit => effects.push(Effect::Quit),
        }

        effects
    }

    fn handle_refresh_library(&mut self, effects: &mut Vec<Effect>) {
        if self.library.loading {
            return;
        }
        self.library.loading = true;
        self.library.error = None;
        effects.push(Effect::LoadLibrary);
    }

    fn handle_library_loaded(&mut self, result: Result<Vec<MagazineSummary>, String>) {
        self.library.loading = false;
        match result {
            Ok(entries) => {
                info!(count = entries.len(), "Library loaded");
                self.library.entries = entries;
                self.library.error = None;
            }
            Err(err) => {
                warn!("Failed to load library: {err}");
                self.library.error = Some(err);
            }
        }
    }

    fn handle_sort_by(&mut self, column: SortColumn) {
        self.library.sort_by(column);
        debug!(?column, desc = self.library.sort_desc, "Library sort changed");
    }

    fn handle_open_magazine(&mut self, id: String, effects: &mut Vec<Effect>) {
        info!(%id, "Opening magazine");
        self.replace_screen(Screen::Loading {
            id: id.clone(),
            percent: 10,
        });
        effects.push(Effect::FetchMagazine(id));
    }

    fn handle_load_progress(&mut self, id: &str, percent: u8) {
        if let Screen::Loading {
            id: loading_id,
            percent: current,
        } = &mut self.screen
        {
            if loading_id == id {
                *current = (*current).max(percent);
            }
        }
    }

    fn handle_magazine_fetched(
        &mut self,
        id: String,
        result: Result<MagazineContent, String>,
        effects: &mut Vec<Effect>,
    ) {
        let awaiting = matches!(&self.screen, Screen::Loading { id: loading_id, .. } if *loading_id == id);
        if !awaiting {
            debug!(%id, "Dropping magazine result for an abandoned load");
            return;
        }
        match result {
            Ok(content) => effects.extend(self.mount_reader(content)),
            Err(message) => {
                warn!(%id, "Could not load magazine: {message}");
                self.replace_screen(Screen::Failed { id, message });
            }
        }
    }

    fn mount_reader(&mut self, content: MagazineContent) -> Vec<Effect> {
        self.mount_serial = self.mount_serial.wrapping_add(1);
        let mount = self.mount_serial;
        let reader = FlipbookReader::mount(
            ReaderProps {
                title: content.title,
                pages: content.pages,
                options: self.config.reader.clone(),
            },
            Some(self.reader_surface()),
            &self.keys,
            Instant::now(),
        );
        let hook = reader.subscribe(|event| debug!(?event, "Reader event"));
        let jobs = reader
            .surfaces()
            .iter()
            .map(|surface| ImageJob {
                handle: surface.handle,
                source: surface.image.clone(),
                eager: surface.eager,
            })
            .collect::<Vec<_>>();

        let cancel = Arc::new(AtomicBool::new(false));
        info!(id = %content.id, mount, percent = 100, "Magazine mounted");
        self.replace_screen(Screen::Reading(Box::new(ReadingState {
            id: content.id,
            mount,
            reader,
            images: HashMap::new(),
            pointer_x: 0.0,
            pointer_down: false,
            loads_cancelled: Arc::clone(&cancel),
            _hook: hook,
        })));

        if jobs.is_empty() {
            Vec::new()
        } else {
            vec![Effect::LoadImages {
                mount,
                jobs,
                cancel,
            }]
        }
    }

    fn handle_back_to_library(&mut self) {
        if matches!(self.screen, Screen::Library) {
            return;
        }
        match self.reading() {
            Some(reading) => info!(id = %reading.id, "Closing magazine; returning to library"),
            None => info!("Returning to library"),
        }
        self.replace_screen(Screen::Library);
    }

    fn handle_navigate(&mut self, intent: NavIntent) {
        if let Some(reading) = self.reading() {
            reading.reader.dispatch(intent, Instant::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ImageCache;
    use crate::config::AppConfig;
    use crate::source::{FetchError, MagazineSource};
    use super::super::runtime::load_deferred;
    use flipbook_core::{NavKey, Page};
    use iced::futures::channel::mpsc;
    use iced::keyboard::{Key, Modifiers, key};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    struct NoSource;

    impl MagazineSource for NoSource {
        fn describe(&self) -> String {
            "test".to_string()
        }

        fn list(&self) -> Result<Vec<MagazineSummary>, FetchError> {
            Ok(Vec::new())
        }

        fn fetch(&self, id: &str) -> Result<MagazineContent, FetchError> {
            Err(FetchError::NotFound(id.to_string()))
        }
    }

    fn test_app() -> App {
        let dir = std::env::temp_dir().join("magazine-reader-reducer-tests");
        App {
            window_width: 1400.0,
            window_height: 1100.0,
            config: AppConfig::default(),
            source: Arc::new(NoSource),
            cache: Arc::new(ImageCache::new(dir).unwrap()),
            keys: flipbook_core::KeyboardHub::new(),
            library: Default::default(),
            screen: Screen::Library,
            mount_serial: 0,
        }
    }

    fn content(count: u32) -> MagazineContent {
        MagazineContent {
            id: "m1".to_string(),
            title: "Spring".to_string(),
            pages: (1..=count)
                .map(|n| Page::new(format!("p{n}"), n, format!("/img/{n}.png")))
                .collect(),
        }
    }

    fn open(app: &mut App, count: u32) -> Vec<Effect> {
        app.reduce(Message::OpenMagazine("m1".to_string()));
        app.reduce(Message::MagazineFetched {
            id: "m1".to_string(),
            result: Ok(content(count)),
        })
    }

    #[test]
    fn fetched_magazine_mounts_reader_and_requests_images() {
        let mut app = test_app();
        let effects = open(&mut app, 3);

        let reading = app.reading().expect("reader mounted");
        assert_eq!(reading.reader.pages().len(), 3);
        assert!(matches!(
            effects.as_slice(),
            [Effect::LoadImages { jobs, .. }] if jobs.len() == 3 && jobs[0].eager && !jobs[2].eager
        ));
        assert_eq!(app.keys.listener_count(), 1);
    }

    #[test]
    fn fetch_failure_shows_could_not_load_screen() {
        let mut app = test_app();
        app.reduce(Message::OpenMagazine("m1".to_string()));
        app.reduce(Message::MagazineFetched {
            id: "m1".to_string(),
            result: Err("magazine m1 is not available".to_string()),
        });
        assert!(matches!(app.screen, Screen::Failed { .. }));
    }

    #[test]
    fn escape_unmounts_and_arrow_keys_stop_reaching_the_reader() {
        let mut app = test_app();
        open(&mut app, 3);
        app.reduce(Message::KeyPressed {
            key: Key::Named(key::Named::Escape),
            modifiers: Modifiers::empty(),
        });
        assert!(matches!(app.screen, Screen::Library));
        assert_eq!(app.keys.listener_count(), 0);

        app.keys.dispatch(NavKey::ArrowRight, Instant::now());
        assert!(app.reading().is_none());
    }

    #[test]
    fn arrow_key_turns_page_after_animation() {
        let mut app = test_app();
        open(&mut app, 3);
        app.reduce(Message::KeyPressed {
            key: Key::Named(key::Named::ArrowRight),
            modifiers: Modifiers::empty(),
        });
        assert!(app.reading().unwrap().reader.is_flipping());

        app.reduce(Message::Tick(Instant::now() + Duration::from_secs(1)));
        let reader = &app.reading().unwrap().reader;
        assert!(!reader.is_flipping());
        assert_eq!(reader.current_index(), 1);
    }

    #[test]
    fn leaving_the_magazine_stops_remaining_image_loads() {
        let mut app = test_app();
        let Some(Effect::LoadImages { mount, jobs, cancel }) = open(&mut app, 4).pop() else {
            panic!("expected image loads");
        };
        assert!(!cancel.load(Ordering::Relaxed));

        app.reduce(Message::BackToLibrary);
        assert!(cancel.load(Ordering::Relaxed));

        let (sender, _receiver) = mpsc::unbounded();
        let deferred = jobs.into_iter().filter(|job| !job.eager).collect();
        assert_eq!(load_deferred(&app.cache, mount, deferred, &cancel, &sender), 0);
    }

    #[test]
    fn deferred_loads_report_every_page_while_mounted() {
        let mut app = test_app();
        let Some(Effect::LoadImages { mount, jobs, cancel }) = open(&mut app, 4).pop() else {
            panic!("expected image loads");
        };
        let (sender, _receiver) = mpsc::unbounded();
        let deferred: Vec<_> = jobs.into_iter().filter(|job| !job.eager).collect();
        assert_eq!(deferred.len(), 2);
        assert_eq!(load_deferred(&app.cache, mount, deferred, &cancel, &sender), 2);
    }

    #[test]
    fn late_result_for_abandoned_load_is_ignored() {
        let mut app = test_app();
        app.reduce(Message::OpenMagazine("m1".to_string()));
        app.reduce(Message::BackToLibrary);
        let effects = app.reduce(Message::MagazineFetched {
            id: "m1".to_string(),
            result: Ok(content(2)),
        });
        assert!(effects.is_empty());
        assert!(matches!(app.screen, Screen::Library));
    }
}
