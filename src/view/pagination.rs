//! Page arithmetic over a result buffer.

use serde::{Deserialize, Serialize};

/// Number of pages needed for `len` items, or `0` when there is nothing to show.
pub fn total_pages(len: usize, page_size: usize) -> usize {
	if len == 0 || page_size == 0 {
		return 0;
	}
	len.div_ceil(page_size)
}

/// Clamp a requested page into `[0, total_pages - 1]`.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
	page.min(total_pages.saturating_sub(1))
}

/// Slice of `items` shown on `page`. Out-of-range pages yield an empty slice.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
	let Some(start) = page.checked_mul(page_size) else {
		return &[];
	};
	if start >= items.len() {
		return &[];
	}
	let end = start.saturating_add(page_size).min(items.len());
	&items[start..end]
}

/// Pagination cursor stored with every search session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
	pub page: usize,
	pub page_size: usize,
	pub total_pages: usize,
}

impl Pagination {
	pub fn new(page_size: usize) -> Self {
		Self {
			page: 0,
			page_size,
			total_pages: 0,
		}
	}

	/// Recompute the page count after the item count changed.
	pub fn refresh(&mut self, len: usize) {
		self.total_pages = total_pages(len, self.page_size);
	}

	/// Move to `page`, clamped to the valid range. Returns the page actually selected.
	pub fn set_page(&mut self, page: usize) -> usize {
		self.page = clamp_page(page, self.total_pages);
		self.page
	}

	/// Change the page size, keeping the cursor on the last valid page if the
	/// current one disappears.
	pub fn set_page_size(&mut self, page_size: usize, len: usize) {
		self.page_size = page_size;
		self.refresh(len);
		self.page = clamp_page(self.page, self.total_pages);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn zero_items_means_zero_pages() {
		assert_eq!(total_pages(0, 50), 0);
		assert_eq!(total_pages(1, 50), 1);
		assert_eq!(total_pages(50, 50), 1);
		assert_eq!(total_pages(51, 50), 2);
	}

	#[test]
	fn paginate_returns_partial_last_page() {
		let items: Vec<u32> = (0..7).collect();
		assert_eq!(paginate(&items, 0, 3), &[0, 1, 2]);
		assert_eq!(paginate(&items, 2, 3), &[6]);
		assert!(paginate(&items, 3, 3).is_empty());
		assert!(paginate(&items, usize::MAX, 3).is_empty());
	}

	#[test]
	fn set_page_clamps_to_last_page() {
		let mut pagination = Pagination::new(10);
		pagination.refresh(35);
		assert_eq!(pagination.total_pages, 4);
		assert_eq!(pagination.set_page(99), 3);
		assert_eq!(pagination.set_page(1), 1);
	}

	#[test]
	fn set_page_without_pages_stays_at_zero() {
		let mut pagination = Pagination::new(10);
		assert_eq!(pagination.set_page(5), 0);
	}

	#[test]
	fn shrinking_page_count_moves_to_last_valid_page() {
		let mut pagination = Pagination::new(50);
		pagination.refresh(120);
		assert_eq!(pagination.total_pages, 3);
		pagination.set_page(2);

		pagination.set_page_size(100, 120);
		assert_eq!(pagination.total_pages, 2);
		assert_eq!(pagination.page, 1);
	}

	#[test]
	fn page_never_reaches_total_pages() {
		for len in [0usize, 1, 9, 10, 11, 99, 100, 101] {
			for size in [1usize, 3, 10, 50] {
				let mut pagination = Pagination::new(7);
				pagination.refresh(len);
				pagination.set_page(len);
				pagination.set_page_size(size, len);
				let page = pagination.set_page(usize::MAX);
				assert!(pagination.total_pages == 0 || page < pagination.total_pages);
			}
		}
	}
}
