use super::super::super::messages::Message;
use super::super::super::state::App;
use super::super::{Effect, ImageJob};
use crate::cache::ImageCache;
use iced::Event;
use iced::Task;
use iced::event;
use iced::futures::channel::{mpsc, oneshot};
use iced::keyboard;
use iced::mouse;
use iced::widget::image;
use iced::window;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

impl App {
    pub(in crate::app) fn run_effect(&mut self, effect: Effect) -> Task<Message> {
        match effect {
            Effect::LoadLibrary => {
                let source = Arc::clone(&self.source);
                info!(source = %source.describe(), "Dispatching library load task");
                run_blocking(
                    move || source.list().map_err(|err| err.to_string()),
                    Message::LibraryLoaded,
                )
            }
            Effect::FetchMagazine(id) => {
                let source = Arc::clone(&self.source);
                let (sender, receiver) = mpsc::unbounded();
                std::thread::spawn(move || {
                    let progress_id = id.clone();
                    let progress_sender = sender.clone();
                    let result = source
                        .fetch_with_progress(&id, &|percent| {
                            let _ = progress_sender.unbounded_send(Message::LoadProgress {
                                id: progress_id.clone(),
                                percent,
                            });
                        })
                        .map_err(|err| err.to_string());
                    let _ = sender.unbounded_send(Message::MagazineFetched { id, result });
                });
                Task::run(receiver, |message| message)
            }
            Effect::LoadImages {
                mount,
                jobs,
                cancel,
            } => self.load_images(mount, jobs, cancel),
            Effect::Quit => {
                info!("Quit requested");
                iced::exit()
            }
        }
    }

    /// Eager pages load in parallel; the rest follow one at a time so they
    /// never compete with the first spread.
    fn load_images(&self, mount: u64, jobs: Vec<ImageJob>, cancel: Arc<AtomicBool>) -> Task<Message> {
        let (eager, deferred): (Vec<_>, Vec<_>) = jobs.into_iter().partition(|job| job.eager);
        debug!(
            mount,
            eager = eager.len(),
            deferred = deferred.len(),
            "Dispatching page image loads"
        );

        let mut tasks = eager
            .into_iter()
            .map(|job| {
                let cache = Arc::clone(&self.cache);
                run_blocking(move || load_image(&cache, mount, job), |message| message)
            })
            .collect::<Vec<_>>();

        if !deferred.is_empty() {
            let cache = Arc::clone(&self.cache);
            let (sender, receiver) = mpsc::unbounded();
            std::thread::spawn(move || {
                load_deferred(&cache, mount, deferred, &cancel, &sender);
            });
            tasks.push(Task::run(receiver, |message| message));
        }

        Task::batch(tasks)
    }
}

/// Returns how many results were sent before the mount was left.
pub(super) fn load_deferred(
    cache: &ImageCache,
    mount: u64,
    jobs: Vec<ImageJob>,
    cancel: &AtomicBool,
    sender: &mpsc::UnboundedSender<Message>,
) -> usize {
    let total = jobs.len();
    let mut sent = 0;
    for job in jobs {
        if cancel.load(Ordering::Relaxed) {
            debug!(mount, skipped = total - sent, "Reader unmounted; stopping deferred loads");
            break;
        }
        if sender.unbounded_send(load_image(cache, mount, job)).is_err() {
            debug!(mount, "Image receiver dropped; stopping deferred loads");
            break;
        }
        sent += 1;
    }
    sent
}

fn load_image(cache: &ImageCache, mount: u64, job: ImageJob) -> Message {
    let result = cache
        .load(&job.source)
        .map(image::Handle::from_bytes)
        .map_err(|err| {
            warn!(source = %job.source.as_str(), "Page image unavailable: {err:#}");
            format!("{err:#}")
        });
    Message::ImageLoaded {
        mount,
        handle: job.handle,
        result,
    }
}

/// Run blocking work on its own thread and deliver the result as a message.
fn run_blocking<T, F, M>(work: F, to_message: M) -> Task<Message>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
    M: Fn(T) -> Message + Send + 'static,
{
    let (sender, receiver) = oneshot::channel();
    std::thread::spawn(move || {
        let _ = sender.send(work());
    });
    Task::future(receiver).then(move |result| match result {
        Ok(value) => Task::done(to_message(value)),
        Err(_) => {
            warn!("Background worker exited without a result");
            Task::none()
        }
    })
}

pub(super) fn runtime_event_to_message(
    event: Event,
    status: event::Status,
    _window_id: window::Id,
) -> Option<Message> {
    if status == event::Status::Captured {
        return None;
    }
    match event {
        Event::Keyboard(keyboard::Event::KeyPressed { key, modifiers, .. }) => {
            Some(Message::KeyPressed { key, modifiers })
        }
        // A drag released outside the book still has to end.
        Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
            Some(Message::PointerReleased)
        }
        _ => None,
    }
}
