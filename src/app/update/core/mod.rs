mod reducer;
mod runtime;
mod shortcuts;

use super::super::messages::Message;
use super::super::state::App;
use iced::event;
use iced::time;
use iced::{Subscription, Task};
use std::time::Duration;

/// Frame interval while a page turn or snap-back is animating.
const ANIMATION_FRAME: Duration = Duration::from_millis(16);

impl App {
    pub fn subscription(app: &App) -> Subscription<Message> {
        let mut subscriptions: Vec<Subscription<Message>> = vec![
            iced::window::resize_events().map(|(_id, size)| Message::WindowResized {
                width: size.width,
                height: size.height,
            }),
            event::listen_with(runtime::runtime_event_to_message),
        ];

        if app
            .reading()
            .is_some_and(|reading| reading.reader.is_animating())
        {
            subscriptions.push(time::every(ANIMATION_FRAME).map(Message::Tick));
        }

        Subscription::batch(subscriptions)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        let effects = self.reduce(message);
        if effects.is_empty() {
            Task::none()
        } else {
            Task::batch(effects.into_iter().map(|effect| self.run_effect(effect)))
        }
    }
}
