// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 归一化测试模块
///
/// 用银行页面上常见的写法验证期限与利率文本的归一化结果

#[cfg(test)]
mod tests {
    use ratewatch::domain::services::rate_normalizer::normalize_rate;
    use ratewatch::domain::services::tenure_normalizer::normalize_tenure;

    fn days(text: &str) -> Option<(u32, u32)> {
        normalize_tenure(text).map(|r| (r.min_days(), r.max_days()))
    }

    #[test]
    fn test_published_tenure_phrasings() {
        let cases = [
            ("91 days to 6 months", Some((91, 180))),
            ("1 Year", Some((365, 365))),
            ("less than 46 days", Some((1, 45))),
            ("7 days to 45 days", Some((7, 45))),
            ("180 Days to 210 Days", Some((180, 210))),
            ("1 year to 2 years", Some((365, 730))),
            ("5 years to 10 years", Some((1825, 3650))),
            ("Tenure", None),
            ("--", None),
        ];

        for (text, expected) in cases {
            assert_eq!(days(text), expected, "tenure text: {:?}", text);
        }
    }

    #[test]
    fn test_more_than_years_falls_back_to_year_count() {
        // No open-ended rule exists for years, the bare year count wins.
        assert_eq!(days("more than 5 years"), Some((1825, 1825)));
    }

    #[test]
    fn test_normalized_ranges_are_ordered() {
        for text in ["7 days to 45 days", "9 months to 1 year", "more than 10 days", "444"] {
            let range = normalize_tenure(text).unwrap();
            assert!(range.min_days() >= 1);
            assert!(range.min_days() <= range.max_days());
        }
    }

    #[test]
    fn test_rate_text() {
        assert_eq!(normalize_rate("6.5%"), Some(6.5));
        assert_eq!(normalize_rate(" 7.25 % "), Some(7.25));
        assert_eq!(normalize_rate("150"), None);
        assert_eq!(normalize_rate("N/A"), None);
        assert_eq!(normalize_rate("0"), None);
        assert_eq!(normalize_rate(""), None);
    }
}
