use super::messages::{Message, SortColumn};
use super::state::{App, LibraryState, ReadingState, Screen};
use flipbook_core::{
    FlipFrame, ImageLoad, NavIntent, PageLink, PageSurface, ReaderView, Spread,
};
use iced::alignment::{Horizontal, Vertical};
use iced::widget::{
    Column, Row, button, column, container, horizontal_space, image, mouse_area, progress_bar,
    row, scrollable, stack, text, text_input,
};
use iced::{Background, Color, ContentFit, Element, Length, Shadow, Vector};
use std::time::Instant;

impl App {
    pub fn view(&self) -> Element<'_, Message> {
        let content: Element<'_, Message> = match &self.screen {
            Screen::Library => self.library_view(&self.library),
            Screen::Loading { percent, .. } => loading_view(*percent),
            Screen::Reading(reading) => self.reading_view(reading),
            Screen::Failed { id, message } => failed_view(id, message),
        };

        container(content)
            .padding(16)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn library_view<'a>(&'a self, library: &'a LibraryState) -> Element<'a, Message> {
        let arrow = |column: SortColumn| {
            if library.sort_column != column {
                ""
            } else if library.sort_desc {
                " ▼"
            } else {
                " ▲"
            }
        };
        let refresh = button(if library.loading { "Loading..." } else { "Refresh" })
            .on_press_maybe((!library.loading).then_some(Message::RefreshLibrary));

        let toolbar = row![
            text_input("Filter magazines", &library.filter)
                .on_input(Message::FilterChanged)
                .width(Length::Fill),
            button(text(format!("Title{}", arrow(SortColumn::Title))))
                .on_press(Message::SortBy(SortColumn::Title)),
            button(text(format!("Published{}", arrow(SortColumn::PublishDate))))
                .on_press(Message::SortBy(SortColumn::PublishDate)),
            refresh,
        ]
        .spacing(10)
        .align_y(Vertical::Center);

        let mut list = Column::new().spacing(8).width(Length::Fill);
        let entries = library.visible_entries();
        if entries.is_empty() && !library.loading {
            let hint = if library.entries.is_empty() {
                "No published magazines yet."
            } else {
                "No magazines match the filter."
            };
            list = list.push(text(hint));
        }
        for entry in entries {
            let mut card = column![
                text(entry.title.as_str()).size(20),
                text(format!(
                    "{} · {} pages",
                    entry.publish_label(),
                    entry.page_count
                ))
                .size(14),
            ]
            .spacing(4);
            if let Some(description) = &entry.description {
                card = card.push(text(description.as_str()).size(14));
            }
            list = list.push(
                button(card)
                    .width(Length::Fill)
                    .on_press(Message::OpenMagazine(entry.id.clone())),
            );
        }

        let mut layout = column![
            text(format!("Magazines · {}", self.source.describe())).size(24),
            toolbar,
        ]
        .spacing(12);
        if let Some(error) = &library.error {
            layout = layout.push(text(format!("Could not load the library: {error}")));
        }
        layout
            .push(scrollable(list).height(Length::Fill))
            .into()
    }

    fn reading_view<'a>(&'a self, reading: &'a ReadingState) -> Element<'a, Message> {
        let view = reading.reader.view(Instant::now());

        let mut header = row![
            button("Library").on_press(Message::BackToLibrary),
            text(view.title).size(22),
            horizontal_space(),
            text(view.controls.label.clone()),
        ]
        .spacing(12)
        .align_y(Vertical::Center);
        if view.controls.is_flipping {
            header = header.push(text("turning...").size(14));
        }

        let book: Element<'a, Message> = if view.is_placeholder() {
            placeholder(reading)
        } else {
            match view.frame {
                Some(frame) => self.book_view(reading, &view, frame),
                None => placeholder(reading),
            }
        };

        // Pointer x is relative to the whole book area, not the shifted page.
        let book_area = mouse_area(
            container(book)
                .width(Length::Fill)
                .height(Length::Fill)
                .align_x(Horizontal::Center)
                .align_y(Vertical::Center),
        )
        .on_press(Message::PointerPressed)
        .on_release(Message::PointerReleased)
        .on_move(Message::PointerMoved);

        column![header, book_area, controls_row(&view)]
            .spacing(12)
            .into()
    }

    fn book_view<'a>(
        &'a self,
        reading: &'a ReadingState,
        view: &ReaderView<'a>,
        frame: FlipFrame,
    ) -> Element<'a, Message> {
        let options = reading.reader.options();
        let (width, height) = (frame.layout.page.width, frame.layout.page.height);
        // Pages dim towards the middle of a turn and recover as it lands.
        let opacity = frame
            .turn
            .map_or(1.0, |turn| 0.35 + 0.65 * (1.0 - 2.0 * turn.progress).abs());
        let shadow_alpha = if options.draw_shadow {
            options.max_shadow_opacity * (1.0 - opacity + 0.2).min(1.0)
        } else {
            0.0
        };

        let indices = match frame.spread {
            Spread::Empty => Vec::new(),
            Spread::Single(index) => vec![index],
            Spread::Pair(left, right) => vec![left, right],
        };
        let mut pages = Row::new().spacing(0).align_y(Vertical::Center);
        for index in indices {
            let page = match view.surfaces.get(index) {
                Some(surface) => page_view(reading, surface, width, height, opacity),
                None => blank_page(width, height),
            };
            pages = pages.push(page);
        }

        let book = container(pages).style(move |_theme| container::Style {
            background: Some(Background::Color(Color::from_rgb8(0xf4, 0xf1, 0xea))),
            shadow: Shadow {
                color: Color::from_rgba(0.0, 0.0, 0.0, shadow_alpha),
                offset: Vector::new(0.0, 4.0),
                blur_radius: 18.0,
            },
            ..container::Style::default()
        });

        let offset = frame.drag_offset;
        row![
            horizontal_space().width(Length::Fixed(offset.max(0.0))),
            book,
            horizontal_space().width(Length::Fixed((-offset).max(0.0))),
        ]
        .into()
    }
}

fn page_view<'a>(
    reading: &'a ReadingState,
    surface: &'a PageSurface,
    width: f32,
    height: f32,
    opacity: f32,
) -> Element<'a, Message> {
    let body: Element<'a, Message> = match (surface.load, reading.images.get(&surface.handle)) {
        (ImageLoad::Ready, Some(handle)) => image(handle.clone())
            .width(Length::Fixed(width))
            .height(Length::Fixed(height))
            .content_fit(ContentFit::Contain)
            .opacity(opacity)
            .into(),
        (ImageLoad::Failed, _) => centered_text(surface.alt.clone(), width, height),
        _ => centered_text(format!("Page {}", surface.page_number), width, height),
    };

    match &surface.caption {
        Some(caption) => stack![
            body,
            container(
                container(text(caption.as_str()).size(14))
                    .padding(8)
                    .width(Length::Fill)
                    .style(|_theme| container::Style {
                        background: Some(Background::Color(Color::from_rgba(0.0, 0.0, 0.0, 0.6))),
                        text_color: Some(Color::WHITE),
                        ..container::Style::default()
                    })
            )
            .width(Length::Fixed(width))
            .height(Length::Fixed(height))
            .align_y(Vertical::Bottom),
        ]
        .into(),
        None => body,
    }
}

fn centered_text<'a>(label: String, width: f32, height: f32) -> Element<'a, Message> {
    container(text(label).color(Color::from_rgb8(0x55, 0x55, 0x55)))
        .width(Length::Fixed(width))
        .height(Length::Fixed(height))
        .align_x(Horizontal::Center)
        .align_y(Vertical::Center)
        .into()
}

fn blank_page<'a>(width: f32, height: f32) -> Element<'a, Message> {
    container(text(""))
        .width(Length::Fixed(width))
        .height(Length::Fixed(height))
        .into()
}

fn placeholder(reading: &ReadingState) -> Element<'_, Message> {
    let message = match reading.reader.engine_error() {
        Some(err) => format!("The book cannot be shown yet: {err}"),
        None => "This magazine has no pages.".to_string(),
    };
    text(message).into()
}

fn controls_row<'a>(view: &ReaderView<'a>) -> Element<'a, Message> {
    let controls = &view.controls;
    let nav = |label: &'a str, enabled: bool, intent: NavIntent| {
        button(label).on_press_maybe(enabled.then_some(Message::Navigate(intent)))
    };

    let mut strip = Row::new()
        .spacing(6)
        .align_y(Vertical::Center)
        .push(nav("First", controls.first_enabled, NavIntent::First))
        .push(nav("Previous", controls.prev_enabled, NavIntent::Prev));
    for link in &controls.links {
        let link: Element<'a, Message> = match *link {
            PageLink::Number { number, active } => {
                let enabled = !active && !controls.is_flipping;
                button(text(number.to_string()))
                    .on_press_maybe(
                        enabled.then_some(Message::Navigate(NavIntent::PageNumber(number))),
                    )
                    .style(if active {
                        button::primary
                    } else {
                        button::secondary
                    })
                    .into()
            }
            PageLink::Ellipsis => text("…").into(),
        };
        strip = strip.push(link);
    }
    strip = strip.push(nav("Next", controls.next_enabled, NavIntent::Next));

    container(strip)
        .width(Length::Fill)
        .align_x(Horizontal::Center)
        .into()
}

fn loading_view<'a>(percent: u8) -> Element<'a, Message> {
    container(
        column![
            text("Loading magazine...").size(20),
            progress_bar(0.0..=100.0, f32::from(percent)).width(Length::Fixed(320.0)),
            text(format!("{percent}%")).size(14),
        ]
        .spacing(10)
        .align_x(Horizontal::Center),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .align_x(Horizontal::Center)
    .align_y(Vertical::Center)
    .into()
}

fn failed_view<'a>(id: &'a str, message: &'a str) -> Element<'a, Message> {
    container(
        column![
            text("Could not load this magazine.").size(22),
            text(message).size(14),
            row![
                button("Try again").on_press(Message::OpenMagazine(id.to_string())),
                button("Back to library").on_press(Message::BackToLibrary),
            ]
            .spacing(10),
        ]
        .spacing(12)
        .align_x(Horizontal::Center),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .align_x(Horizontal::Center)
    .align_y(Vertical::Center)
    .into()
}
