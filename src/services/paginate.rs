use crate::services::dataset::Value;

pub const PAGE_SIZE: usize = 50;

/// At least one page even for an empty dataset, so the page control always
/// has a valid [1, total_pages] range.
pub fn total_pages(total_rows: usize) -> usize {
    total_rows.div_ceil(PAGE_SIZE).max(1)
}

/// Rows for a 1-indexed page. Callers clamp the page number to
/// [1, total_pages]; an out-of-range request just comes back empty.
pub fn page_slice(rows: &[Vec<Value>], page: usize) -> &[Vec<Value>] {
    if page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(PAGE_SIZE);
    if start >= rows.len() {
        return &[];
    }
    let end = (start + PAGE_SIZE).min(rows.len());
    &rows[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<Vec<Value>> {
        (0..n).map(|i| vec![Value::Number(i as f64)]).collect()
    }

    #[test]
    fn page_sizes_sum_to_total() {
        for total in [0, 1, 49, 50, 51, 120, 250] {
            let rows = rows(total);
            let pages = total_pages(total);
            let mut seen = 0;
            for page in 1..=pages {
                let slice = page_slice(&rows, page);
                assert!(slice.len() <= PAGE_SIZE);
                seen += slice.len();
            }
            assert_eq!(seen, total);
        }
    }

    #[test]
    fn last_page_holds_the_remainder() {
        let rows = rows(120);
        assert_eq!(total_pages(120), 3);
        assert_eq!(page_slice(&rows, 1).len(), 50);
        assert_eq!(page_slice(&rows, 2).len(), 50);
        assert_eq!(page_slice(&rows, 3).len(), 20);
    }

    #[test]
    fn pages_are_contiguous_windows() {
        let rows = rows(75);
        let second = page_slice(&rows, 2);
        assert_eq!(second[0][0], Value::Number(50.0));
        assert_eq!(second.last().unwrap()[0], Value::Number(74.0));
    }

    #[test]
    fn empty_dataset_still_has_one_page() {
        assert_eq!(total_pages(0), 1);
        assert!(page_slice(&rows(0), 1).is_empty());
    }

    #[test]
    fn out_of_range_pages_come_back_empty() {
        let rows = rows(10);
        assert!(page_slice(&rows, 0).is_empty());
        assert!(page_slice(&rows, 2).is_empty());
        assert!(page_slice(&rows, usize::MAX).is_empty());
    }
}
