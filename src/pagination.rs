#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,
    current_page: usize,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self, count: usize) -> usize {
        count.div_ceil(self.page_size).max(1)
    }

    pub fn go_to(&mut self, page: usize, count: usize) {
        if page >= 1 && page <= self.total_pages(count) {
            self.current_page = page;
        }
    }

    pub fn next(&mut self, count: usize) {
        if self.current_page < self.total_pages(count) {
            self.current_page += 1;
        }
    }

    pub fn previous(&mut self) {
        if self.current_page > 1 {
            self.current_page -= 1;
        }
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    pub fn sync_len(&mut self, count: usize) {
        let total = self.total_pages(count);
        if self.current_page > total {
            self.current_page = total;
        }
    }

    pub fn window(&self, count: usize) -> (usize, usize) {
        let start = (self.current_page - 1) * self.page_size;
        let start = start.min(count);
        let end = (start + self.page_size).min(count);
        (start, end)
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let (start, end) = self.window(items.len());
        &items[start..end]
    }
}
