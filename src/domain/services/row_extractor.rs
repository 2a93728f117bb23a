// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::rate_quote::{RateQuote, DEFAULT_CATEGORY};
use crate::domain::services::column_roles::ColumnRoleMap;
use crate::domain::services::rate_normalizer::normalize_rate;
use crate::domain::services::table_grid::TableGrid;
use crate::domain::services::tenure_normalizer::normalize_tenure;
use chrono::NaiveDate;

/// 期限单元格的最短长度，更短的视为非数据行
const MIN_TENURE_CHARS: usize = 3;

pub const TAX_SAVING_CATEGORY: &str = "Tax Saving";
pub const SPECIAL_CATEGORY: &str = "Special";

/// 一次表格提取的上下文
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    /// 银行名称
    pub bank: &'a str,
    /// 抓取日期
    pub scraped_date: NaiveDate,
    /// 表格标题等上下文文本（小写）
    pub table_context: &'a str,
}

/// 逐行提取报价候选
///
/// 跳过表头及其之前的行。期限单元格不足三个字符或不含数字的行
/// （重复表头、说明行）直接丢弃；期限无法解析或没有有效普通利率的行
/// 同样丢弃。表头推断不明确时，对每行在期限列之外的数值单元格里
/// 取第一个有效利率作为普通利率，其后严格更高的值作为老年利率。
/// 不做去重。
pub fn extract_rows(grid: &TableGrid, roles: &ColumnRoleMap, ctx: &RowContext<'_>) -> Vec<RateQuote> {
    let Some(tenure_col) = roles.tenure else {
        return Vec::new();
    };

    let mut quotes = Vec::new();
    for row in grid.rows.iter().skip(roles.header_row + 1) {
        let cells = &row.cells;
        if cells.len() < 2 {
            continue;
        }

        let Some(tenure_text) = cells.get(tenure_col).map(|c| c.trim()) else {
            continue;
        };
        if !looks_like_tenure(tenure_text) {
            continue;
        }
        let Some(tenure) = normalize_tenure(tenure_text) else {
            continue;
        };

        let rate_at = |col: Option<usize>| col.and_then(|i| cells.get(i)).and_then(|c| normalize_rate(c));
        let mut regular = roles.regular_rate.and_then(|i| rate_at(Some(i)).map(|r| (i, r)));
        let mut senior = rate_at(roles.senior_rate);

        if roles.ambiguous {
            let numeric: Vec<(usize, f64)> = cells
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != tenure_col)
                .filter_map(|(idx, c)| normalize_rate(c).map(|r| (idx, r)))
                .collect();
            if regular.is_none() {
                regular = numeric.first().copied();
            }
            if senior.is_none() {
                if let Some((regular_col, regular_rate)) = regular {
                    senior = numeric
                        .iter()
                        .find(|(idx, rate)| *idx > regular_col && *rate > regular_rate)
                        .map(|(_, rate)| *rate);
                }
            }
        }

        let Some((_, regular_rate)) = regular else {
            continue;
        };

        quotes.push(
            RateQuote::new(
                ctx.bank,
                tenure_text,
                tenure,
                regular_rate,
                senior,
                ctx.scraped_date,
            )
            .with_category(categorize(ctx.table_context, tenure_text)),
        );
    }
    quotes
}

/// 期限单元格是否像数据：至少三个字符且包含数字
pub fn looks_like_tenure(text: &str) -> bool {
    text.chars().count() >= MIN_TENURE_CHARS && text.chars().any(|c| c.is_ascii_digit())
}

/// 存款类别
///
/// 表格上下文或期限文本提到节税存款时为 "Tax Saving"，
/// 期限文本标注 special 时为 "Special"，其余为 "General"。
pub fn categorize(table_context: &str, tenure_text: &str) -> &'static str {
    let tenure = tenure_text.to_lowercase();
    let context = table_context.to_lowercase();
    if ["tax sav", "tax-sav"]
        .iter()
        .any(|t| tenure.contains(t) || context.contains(t))
    {
        TAX_SAVING_CATEGORY
    } else if tenure.contains("special") {
        SPECIAL_CATEGORY
    } else {
        DEFAULT_CATEGORY
    }
}
