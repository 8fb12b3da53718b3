use super::super::state::App;
use flipbook_core::{ImageLoad, PageHandle};
use iced::widget::image;
use std::time::Instant;
use tracing::{debug, trace};

impl App {
    pub(super) fn handle_pointer_moved(&mut self, x: f32) {
        let Some(reading) = self.reading_mut() else {
            return;
        };
        reading.pointer_x = x;
        if reading.pointer_down {
            reading.reader.pointer_move(x, Instant::now());
        }
    }

    pub(super) fn handle_pointer_pressed(&mut self) {
        let Some(reading) = self.reading_mut() else {
            return;
        };
        reading.pointer_down = reading.reader.pointer_down(reading.pointer_x, Instant::now());
        trace!(x = reading.pointer_x, grabbed = reading.pointer_down, "Pointer pressed on book");
    }

    pub(super) fn handle_pointer_released(&mut self) {
        let Some(reading) = self.reading_mut() else {
            return;
        };
        if !reading.pointer_down {
            return;
        }
        reading.pointer_down = false;
        reading.reader.pointer_up(reading.pointer_x, Instant::now());
    }

    pub(super) fn handle_image_loaded(
        &mut self,
        mount: u64,
        handle: PageHandle,
        result: Result<image::Handle, String>,
    ) {
        let Some(reading) = self.reading_mut() else {
            return;
        };
        if reading.mount != mount {
            debug!(mount, current = reading.mount, "Dropping image for an unmounted reader");
            return;
        }
        let load = match result {
            Ok(image) => {
                reading.images.insert(handle, image);
                ImageLoad::Ready
            }
            Err(_) => ImageLoad::Failed,
        };
        if !reading.reader.mark_image(handle, load) {
            reading.images.remove(&handle);
            debug!(?handle, "Dropping image for a replaced page surface");
        }
    }

    pub(super) fn handle_window_resized(&mut self, width: f32, height: f32) {
        self.window_width = width;
        self.window_height = height;
        let surface = self.reader_surface();
        if let Some(reading) = self.reading_mut() {
            reading.reader.resize(surface, Instant::now());
        }
    }

    pub(super) fn handle_tick(&mut self, now: Instant) {
        if let Some(reading) = self.reading() {
            reading.reader.tick(now);
        }
    }
}
