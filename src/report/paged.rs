//! Paginated report
//!
//! This is the paginated document format: plain text, not PDF. The text
//! report is laid out on fixed-height pages. Every page starts with a header
//! line and a blank line and ends with a `Page i of n` footer. Pages are
//! separated by a form feed (`\f`), which printers and pagers treat as a page
//! break.

use crate::report::text::{text_lines, REPORT_TITLE};
use crate::types::AnalysisResult;

/// Form feed between pages
pub const PAGE_BREAK: char = '\u{000C}';

/// Header, spacer and footer lines on every page
const CHROME_LINES: usize = 3;

/// Smallest page height that leaves room for content
pub const MIN_PAGE_LINES: usize = CHROME_LINES + 1;

/// Split the report into pages of at most `page_lines` lines each
pub fn paginate(result: &AnalysisResult, page_lines: usize) -> Vec<Vec<String>> {
    let page_lines = page_lines.max(MIN_PAGE_LINES);
    let body_lines = page_lines - CHROME_LINES;

    // the title block is replaced by the per-page header
    let body: Vec<String> = text_lines(result).into_iter().skip(2).collect();
    let chunks: Vec<&[String]> = body.chunks(body_lines).collect();
    let total = chunks.len().max(1);

    let header = format!(
        "{} | {}",
        REPORT_TITLE,
        result.metadata.generated_at.format("%Y-%m-%d")
    );

    (0..total)
        .map(|i| {
            let mut page = Vec::with_capacity(page_lines);
            page.push(header.clone());
            page.push(String::new());
            if let Some(chunk) = chunks.get(i) {
                page.extend(chunk.iter().cloned());
            }
            page.push(format!("Page {} of {}", i + 1, total));
            page
        })
        .collect()
}

/// Render the paginated document as a single string
pub fn render_paged(result: &AnalysisResult, page_lines: usize) -> String {
    let pages: Vec<String> = paginate(result, page_lines)
        .into_iter()
        .map(|page| page.join("\n"))
        .collect();
    let separator = format!("\n{PAGE_BREAK}");
    let mut out = pages.join(separator.as_str());
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, SAMPLE_CSV};
    use crate::pipeline::UsageAnalyzer;
    use chrono::NaiveDate;

    fn sample_result() -> AnalysisResult {
        let dataset = Dataset::from_csv_str(SAMPLE_CSV).unwrap();
        UsageAnalyzer::default()
            .analyze_at(&dataset, NaiveDate::from_ymd_opt(2025, 10, 8).unwrap())
            .unwrap()
    }

    #[test]
    fn test_pages_respect_height_and_numbering() {
        let result = sample_result();
        let pages = paginate(&result, 12);
        assert!(pages.len() > 1);

        for (i, page) in pages.iter().enumerate() {
            assert!(page.len() <= 12);
            assert!(page[0].starts_with(REPORT_TITLE));
            assert_eq!(
                page.last().unwrap(),
                &format!("Page {} of {}", i + 1, pages.len())
            );
        }
    }

    #[test]
    fn test_no_content_is_lost() {
        let result = sample_result();
        let body: Vec<String> = text_lines(&result).into_iter().skip(2).collect();
        let paged: Vec<String> = paginate(&result, 10)
            .into_iter()
            .flat_map(|page| {
                let n = page.len();
                page.into_iter().skip(2).take(n - 3)
            })
            .collect();
        assert_eq!(paged, body);
    }

    #[test]
    fn test_form_feed_between_pages() {
        let result = sample_result();
        let doc = render_paged(&result, 15);
        let pages = paginate(&result, 15).len();
        assert_eq!(doc.matches(PAGE_BREAK).count(), pages - 1);
    }

    #[test]
    fn test_document_is_plain_text() {
        let doc = render_paged(&sample_result(), 20);
        assert!(doc.starts_with(REPORT_TITLE));
        assert!(doc
            .chars()
            .all(|c| c == PAGE_BREAK || c == '\n' || !c.is_control()));
    }

    #[test]
    fn test_tiny_page_height_is_clamped() {
        let pages = paginate(&sample_result(), 1);
        assert!(pages.iter().all(|p| p.len() <= MIN_PAGE_LINES));
    }
}
