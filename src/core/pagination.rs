use crate::domain::model::Page;
use crate::utils::error::{ConsoleError, Result};

/// 切出第 `page` 頁（從 1 開始）。
///
/// `has_more` 為真當且僅當這頁的結尾位置仍小於總筆數。
/// 超出範圍的頁回傳空資料。
pub fn paginate<T: Clone>(all: &[T], page: usize, page_size: usize) -> Result<Page<T>> {
    if page == 0 {
        return Err(ConsoleError::ValidationError {
            message: "page numbers start at 1".to_string(),
        });
    }
    if page_size == 0 {
        return Err(ConsoleError::ValidationError {
            message: "page size must be at least 1".to_string(),
        });
    }

    let start = (page - 1).saturating_mul(page_size);
    let end = start.saturating_add(page_size);
    let data = all
        .get(start.min(all.len())..end.min(all.len()))
        .map(|slice| slice.to_vec())
        .unwrap_or_default();

    Ok(Page {
        data,
        has_more: end < all.len(),
    })
}
