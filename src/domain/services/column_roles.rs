// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::rate_normalizer::normalize_rate;
use crate::domain::services::table_grid::TableGrid;

const TENURE_HEADERS: &[&str] = &["period", "tenure", "duration", "tenor"];
const REGULAR_HEADERS: &[&str] = &[
    "regular",
    "general",
    "public",
    "standard",
    "non senior",
    "non-senior",
];

/// 列角色映射
///
/// 每个角色对应一个列下标，未能识别的角色为 `None`。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnRoleMap {
    pub tenure: Option<usize>,
    pub regular_rate: Option<usize>,
    pub senior_rate: Option<usize>,
    /// 被当作表头的行
    pub header_row: usize,
    /// 表头没有明确说明利率列，需要逐行按数值兜底
    pub ambiguous: bool,
}

/// 根据表头推断列角色
///
/// 期限列默认是第一列，只有表头明确写了期限类词语时才改用该列；
/// 普通利率列优先取表头写明 regular/general/public/standard 的列，
/// 否则取期限列之后的第一列；老年利率列取表头含 "senior" 的列，
/// 否则抽一行数据，如果后面一列的数值高于普通利率就认定为老年利率。
pub fn infer_column_roles(grid: &TableGrid) -> ColumnRoleMap {
    let header_row = grid.header_row();
    if grid.column_count() < 2 {
        return ColumnRoleMap {
            header_row,
            ambiguous: true,
            ..Default::default()
        };
    }

    let headers: Vec<String> = grid
        .rows
        .get(header_row)
        .map(|r| r.cells.iter().map(|c| c.to_lowercase()).collect())
        .unwrap_or_default();

    let tenure = headers
        .iter()
        .position(|h| TENURE_HEADERS.iter().any(|t| h.contains(t)))
        .unwrap_or(0);

    let mut regular_explicit = None;
    let mut senior_explicit = None;
    for (idx, header) in headers.iter().enumerate() {
        if idx == tenure {
            continue;
        }
        let non_senior = header.contains("non senior") || header.contains("non-senior");
        if header.contains("senior") && !non_senior {
            senior_explicit.get_or_insert(idx);
        } else if REGULAR_HEADERS.iter().any(|t| header.contains(t)) {
            regular_explicit.get_or_insert(idx);
        }
    }

    let columns = grid.column_count();
    let regular = regular_explicit.or_else(|| {
        (tenure + 1..columns)
            .chain(0..tenure)
            .find(|&idx| Some(idx) != senior_explicit)
    });
    let senior = senior_explicit.or_else(|| {
        regular.and_then(|regular| sample_senior_column(grid, header_row, tenure, regular))
    });

    ColumnRoleMap {
        tenure: Some(tenure),
        regular_rate: regular,
        senior_rate: senior,
        header_row,
        ambiguous: regular_explicit.is_none(),
    }
}

/// 在第一条两列都能解析出利率的数据行上比较数值
fn sample_senior_column(
    grid: &TableGrid,
    header_row: usize,
    tenure: usize,
    regular: usize,
) -> Option<usize> {
    let candidate = (regular + 1..grid.column_count()).find(|&idx| idx != tenure)?;
    let (regular_rate, candidate_rate) = grid.rows.iter().skip(header_row + 1).find_map(|row| {
        Some((
            normalize_rate(row.cells.get(regular)?)?,
            normalize_rate(row.cells.get(candidate)?)?,
        ))
    })?;
    (candidate_rate > regular_rate).then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_headers() {
        let grid = TableGrid::from_rows(&[
            vec!["Tenure", "Senior Citizens", "General Public"],
            vec!["7 days to 45 days", "4.00", "3.50"],
        ]);
        let roles = infer_column_roles(&grid);
        assert_eq!(roles.tenure, Some(0));
        assert_eq!(roles.regular_rate, Some(2));
        assert_eq!(roles.senior_rate, Some(1));
        assert!(!roles.ambiguous);
    }

    #[test]
    fn test_explicit_tenure_column_overrides_first() {
        let grid = TableGrid::from_rows(&[
            vec!["S.No", "Period", "Rate"],
            vec!["1", "7 days to 45 days", "3.50"],
        ]);
        let roles = infer_column_roles(&grid);
        assert_eq!(roles.tenure, Some(1));
        assert_eq!(roles.regular_rate, Some(2));
    }

    #[test]
    fn test_non_senior_header_is_regular() {
        let grid = TableGrid::from_rows(&[
            vec!["Tenure", "Non Senior Citizen", "Senior Citizen"],
            vec!["1 year", "6.80", "7.30"],
        ]);
        let roles = infer_column_roles(&grid);
        assert_eq!(roles.regular_rate, Some(1));
        assert_eq!(roles.senior_rate, Some(2));
    }

    #[test]
    fn test_positional_defaults_with_sampled_senior() {
        let grid = TableGrid::from_rows(&[
            vec!["Tenure", "Rate A", "Rate B"],
            vec!["7 days", "N/A", "3.25"],
            vec!["1 year", "6.80", "7.30"],
        ]);
        let roles = infer_column_roles(&grid);
        assert_eq!(roles.regular_rate, Some(1));
        assert_eq!(roles.senior_rate, Some(2));
        assert!(roles.ambiguous);
    }

    #[test]
    fn test_third_column_not_higher_is_not_senior() {
        let grid = TableGrid::from_rows(&[
            vec!["Tenure", "Rate", "Effective Yield"],
            vec!["1 year", "6.80", "6.50"],
        ]);
        let roles = infer_column_roles(&grid);
        assert_eq!(roles.senior_rate, None);
    }

    #[test]
    fn test_single_column_table_has_no_roles() {
        let grid = TableGrid::from_rows(&[vec!["Tenure"], vec!["7 days"]]);
        let roles = infer_column_roles(&grid);
        assert_eq!(roles.tenure, None);
        assert_eq!(roles.regular_rate, None);
    }
}
