// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 表格提取测试模块
///
/// 使用接近真实银行页面的HTML验证表格评分、表头识别和行提取

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use ratewatch::domain::models::quote_set::QuoteSet;
    use ratewatch::domain::models::source_profile::{RetrievalStrategy, SourceProfile};
    use ratewatch::domain::services::extraction_service::ExtractionService;

    /// 先有标题行、表头用 `<td>`、中途重复表头的渲染页面
    const RENDERED_PAGE: &str = r#"
        <html><body>
            <header><table><tr><td>Personal</td><td>Business</td><td>NRI</td></tr></table></header>
            <div class="container">
                <div class="deposit-rates">
                    <table>
                        <tr><td colspan="3">Domestic Term Deposits w.e.f. 01.01.2025</td></tr>
                        <tr><td>Period</td><td>Rates (% p.a.)</td><td>Senior Citizens (% p.a.)</td></tr>
                        <tr><td>7 days to 14 days</td><td>2.80</td><td>3.30</td></tr>
                        <tr><td>Period</td><td>Rates</td><td>Senior</td></tr>
                        <tr><td>444 days (Special)</td><td>7.30</td><td>7.80</td></tr>
                        <tr><td>1 year</td><td>6.10</td><td>-</td></tr>
                        <tr><td>Note: rates subject to change</td></tr>
                    </table>
                </div>
            </div>
            <footer><table><tr><td>Branch</td><td>Phone</td></tr></table></footer>
        </body></html>
    "#;

    fn profile() -> SourceProfile {
        SourceProfile::new("Indian Bank", vec!["https://bank.example/interest-rates/".to_string()])
            .with_strategy(RetrievalStrategy::RenderedOnly)
            .with_container_classes(vec!["deposit-rates".to_string()])
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn test_rendered_page_extraction() {
        let outcome = ExtractionService::default().extract_html(RENDERED_PAGE, &profile(), date());

        assert_eq!(outcome.tables_found, 3);
        assert_eq!(outcome.candidates, 1);
        assert_eq!(outcome.quotes.len(), 3);

        let short = &outcome.quotes[0];
        assert_eq!(short.tenure_description, "7 days to 14 days");
        assert_eq!((short.min_days, short.max_days), (Some(7), Some(14)));
        assert_eq!(short.regular_rate, Some(2.8));
        assert_eq!(short.senior_rate, Some(3.3));
        assert_eq!(short.category, "General");

        let special = &outcome.quotes[1];
        assert_eq!((special.min_days, special.max_days), (Some(444), Some(444)));
        assert_eq!(special.category, "Special");

        let one_year = &outcome.quotes[2];
        assert_eq!(one_year.regular_rate, Some(6.1));
        assert_eq!(one_year.senior_rate, None);
        assert!(one_year.is_clean());
    }

    #[test]
    fn test_repeated_extraction_merges_to_same_set() {
        let service = ExtractionService::default();
        let mut merged = QuoteSet::new();

        let first = service.extract_html(RENDERED_PAGE, &profile(), date());
        let second = service.extract_html(RENDERED_PAGE, &profile(), date());
        assert_eq!(first.quotes, second.quotes);

        assert_eq!(merged.extend(first.quotes), 3);
        assert_eq!(merged.extend(second.quotes), 0);
        assert_eq!(merged.len(), 3);
        assert!(merged.get("Indian Bank", "1 year").is_some());
    }

    #[test]
    fn test_unrelated_page_yields_nothing() {
        let html = r#"<html><body>
            <h2>Contact us</h2>
            <table><tr><th>City</th><th>Phone</th></tr><tr><td>Pune</td><td>12345</td></tr></table>
        </body></html>"#;
        let outcome = ExtractionService::default().extract_html(html, &profile(), date());
        assert_eq!(outcome.tables_found, 1);
        assert!(outcome.quotes.is_empty());
    }
}
