//! Condensed page-number strip: first page, last page, a window around the
//! current page and ellipsis markers for the skipped ranges.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    /// 1-based page number; `active` marks the current page.
    Number { number: usize, active: bool },
    Ellipsis,
}

/// Build the strip for a 0-based `current` index out of `total` pages.
pub fn visible_page_links(current: usize, total: usize, radius: usize) -> Vec<PageLink> {
    if total == 0 {
        return Vec::new();
    }
    let current_number = current.min(total - 1) + 1;
    let link = |number: usize| PageLink::Number {
        number,
        active: number == current_number,
    };

    let left = current_number.saturating_sub(radius).max(2);
    let right = (current_number + radius).min(total - 1);

    let mut links = vec![link(1)];
    if left > 2 {
        links.push(PageLink::Ellipsis);
    }
    links.extend((left..=right).map(link));
    if right < total - 1 {
        links.push(PageLink::Ellipsis);
    }
    if total > 1 {
        links.push(link(total));
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(links: &[PageLink]) -> String {
        links
            .iter()
            .map(|link| match link {
                PageLink::Number { number, active: true } => format!("[{number}]"),
                PageLink::Number { number, .. } => number.to_string(),
                PageLink::Ellipsis => "...".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn window_in_the_middle_has_both_ellipses() {
        assert_eq!(render(&visible_page_links(9, 20, 2)), "1 ... 8 9 [10] 11 12 ... 20");
    }

    #[test]
    fn window_near_the_start_skips_leading_ellipsis() {
        assert_eq!(render(&visible_page_links(0, 10, 2)), "[1] 2 3 ... 10");
        assert_eq!(render(&visible_page_links(2, 10, 2)), "1 2 [3] 4 5 ... 10");
    }

    #[test]
    fn window_near_the_end_skips_trailing_ellipsis() {
        assert_eq!(render(&visible_page_links(9, 10, 2)), "1 ... 8 9 [10]");
    }

    #[test]
    fn small_sets_list_every_page() {
        assert_eq!(render(&visible_page_links(0, 1, 2)), "[1]");
        assert_eq!(render(&visible_page_links(1, 3, 2)), "1 [2] 3");
        assert!(visible_page_links(0, 0, 2).is_empty());
    }
}
