/// Prefix window over an ordered sequence. There is no offset: widening the
/// page size only ever appends to what was already shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
    step: usize,
}

impl Paginator {
    pub fn new(page_size: usize, step: usize) -> Self {
        Self {
            page_size,
            step: step.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size;
    }

    /// Widens the window by one step.
    pub fn show_more(&mut self) {
        self.page_size = self.page_size.saturating_add(self.step);
    }

    pub fn window<'s, T>(&self, items: &'s [T]) -> &'s [T] {
        paginate(items, self.page_size)
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(25, 25)
    }
}

pub fn paginate<T>(items: &[T], page_size: usize) -> &[T] {
    &items[..items.len().min(page_size)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_prefix_and_widens_monotonically() {
        let items: Vec<u32> = (0..10).collect();
        let mut pager = Paginator::new(3, 4);
        let first = pager.window(&items).to_vec();
        assert_eq!(first, vec![0, 1, 2]);

        pager.show_more();
        let second = pager.window(&items);
        assert_eq!(second.len(), 7);
        assert!(second.starts_with(&first));

        pager.show_more();
        assert_eq!(pager.window(&items).len(), 10);
    }

    #[test]
    fn zero_page_size_yields_empty_window() {
        assert!(paginate(&[1, 2, 3], 0).is_empty());
    }

    #[test]
    fn zero_step_still_widens() {
        let mut pager = Paginator::new(0, 0);
        pager.show_more();
        assert_eq!(pager.page_size(), 1);
    }
}
