use serde::Serialize;

/// One page of an evaluated record set. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<R> {
    pub items: Vec<R>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Cut `records` into pages of `page_size` (0 = a single page) and return the
/// one at `page`, clamped into `1..=total_pages`.
pub fn paginate<R>(records: Vec<R>, page_size: usize, page: usize) -> Page<R> {
    let total_items = records.len();
    let total_pages = match (total_items, page_size) {
        (0, _) => 0,
        (_, 0) => 1,
        (n, size) => n.div_ceil(size),
    };
    let page = page.clamp(1, total_pages.max(1));
    let items = if page_size == 0 {
        records
    } else {
        records
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect()
    };
    Page {
        items,
        page,
        page_size,
        total_items,
        total_pages,
    }
}
