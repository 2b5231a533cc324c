use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One page of a sorted listing.
#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
    /// 1-based page number
    pub number: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
    pub items: Vec<T>,
}

/// Number of pages for `len` items; never less than 1.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    len.div_ceil(page_size).max(1)
}

/// Slice `items` into page `number` (1-based).
pub fn paginate<T: Clone>(items: &[T], number: usize, page_size: usize) -> Page<T> {
    let number = number.max(1);
    let start = (number - 1).saturating_mul(page_size);
    let page_items = items
        .iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect();

    Page {
        number,
        page_size,
        total: items.len(),
        total_pages: total_pages(items.len(), page_size),
        items: page_items,
    }
}

/// Current page index of a listing that can grow or shrink under it.
pub struct Pager {
    page: AtomicUsize,
    page_size: usize,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: AtomicUsize::new(1),
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current(&self) -> usize {
        self.page.load(Ordering::SeqCst)
    }

    /// Reset to page 1 when the current page would start past the end of a
    /// listing of `len` items. Returns the resulting page.
    pub fn settle(&self, len: usize) -> usize {
        let page = self.current();
        if (page - 1) * self.page_size >= len {
            self.page.store(1, Ordering::SeqCst);
            return 1;
        }
        page
    }

    /// Move by `delta` pages, clamped to `[1, total_pages]`.
    pub fn change(&self, delta: i64, len: usize) -> usize {
        let max = total_pages(len, self.page_size) as i64;
        let next = (self.current() as i64 + delta).clamp(1, max) as usize;
        self.page.store(next, Ordering::SeqCst);
        next
    }

    /// Jump to `page`, clamped to `[1, total_pages]`.
    pub fn set(&self, page: usize, len: usize) -> usize {
        let next = page.clamp(1, total_pages(len, self.page_size));
        self.page.store(next, Ordering::SeqCst);
        next
    }
}
