//! Size-responsive layout: page size, orientation and visible spreads.

use crate::options::{ReaderOptions, SizeMode};

/// Size of the surface the book is mounted into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// One page visible at a time.
    Portrait,
    /// Two-page spreads.
    Landscape,
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookLayout {
    pub page: PageSize,
    pub orientation: Orientation,
}

impl BookLayout {
    /// Width of the whole book: one page in portrait, two in landscape.
    pub fn book_width(&self) -> f32 {
        match self.orientation {
            Orientation::Portrait => self.page.width,
            Orientation::Landscape => self.page.width * 2.0,
        }
    }
}

/// Compute page size and orientation for the given surface.
pub fn compute_layout(options: &ReaderOptions, surface: SurfaceSize) -> BookLayout {
    match options.size {
        SizeMode::Fixed => {
            let page = PageSize {
                width: options.width,
                height: options.height,
            };
            let orientation = if options.use_portrait && surface.width < page.width * 2.0 {
                Orientation::Portrait
            } else {
                Orientation::Landscape
            };
            BookLayout { page, orientation }
        }
        SizeMode::Stretch => stretch_layout(options, surface),
    }
}

fn stretch_layout(options: &ReaderOptions, surface: SurfaceSize) -> BookLayout {
    let ratio = options.height / options.width.max(1.0);

    let mut orientation = Orientation::Landscape;
    let mut width = surface.width / 2.0;
    if options.use_portrait && width < options.min_width {
        orientation = Orientation::Portrait;
        width = surface.width;
    }

    let mut width = width.clamp(options.min_width, options.max_width);
    let mut height = (width * ratio).clamp(options.min_height, options.max_height);

    if options.auto_size && height > surface.height {
        height = surface.height.max(options.min_height);
        width = (height / ratio).clamp(options.min_width, options.max_width);
    }

    BookLayout {
        page: PageSize { width, height },
        orientation,
    }
}

/// Pages visible together for a given current index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spread {
    Empty,
    Single(usize),
    Pair(usize, usize),
}

/// With a cover the first page stands alone and pairs start at odd indices.
pub fn spread_for(index: usize, total: usize, orientation: Orientation, show_cover: bool) -> Spread {
    if total == 0 {
        return Spread::Empty;
    }
    let index = index.min(total - 1);
    if orientation == Orientation::Portrait {
        return Spread::Single(index);
    }

    let start = if show_cover {
        if index == 0 {
            return Spread::Single(0);
        }
        if index % 2 == 1 { index } else { index - 1 }
    } else {
        index - index % 2
    };

    if start + 1 < total {
        Spread::Pair(start, start + 1)
    } else {
        Spread::Single(start)
    }
}
