// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());

/// 表头行关键字
const HEADER_TERMS: &[&str] = &["tenure", "period", "tenor", "duration", "maturity"];
/// 只在前几行里寻找表头
const HEADER_SCAN_ROWS: usize = 3;

/// 表格中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    /// 单元格文本（已压缩空白）
    pub cells: Vec<String>,
    /// 整行都由 `<th>` 组成
    pub all_th: bool,
}

/// 从 `<table>` 节点展开得到的纯文本网格
///
/// 嵌套表格的行不会计入外层表格。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableGrid {
    pub rows: Vec<GridRow>,
}

impl TableGrid {
    /// 从HTML表格节点构建网格
    pub fn from_element(table: ElementRef<'_>) -> Self {
        let rows = table
            .select(&ROW_SELECTOR)
            .filter(|row| {
                row.ancestors()
                    .find(|node| node.value().as_element().is_some_and(|e| e.name() == "table"))
                    .map(|node| node.id())
                    == Some(table.id())
            })
            .map(|row| {
                let cells: Vec<ElementRef<'_>> = row
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                    .collect();
                GridRow {
                    all_th: !cells.is_empty() && cells.iter().all(|c| c.value().name() == "th"),
                    cells: cells.into_iter().map(element_text).collect(),
                }
            })
            .filter(|row| !row.cells.is_empty())
            .collect();

        Self { rows }
    }

    /// 直接由文本行构建网格，所有单元格视为 `<td>`
    pub fn from_rows<S: AsRef<str>>(rows: &[Vec<S>]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|cells| GridRow {
                    cells: cells.iter().map(|c| c.as_ref().trim().to_string()).collect(),
                    all_th: false,
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 最宽一行的列数
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// 前 `n` 行拼接后的小写文本
    pub fn leading_text(&self, n: usize) -> String {
        self.rows
            .iter()
            .take(n)
            .flat_map(|r| r.cells.iter())
            .map(|c| c.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// 表头行下标
    ///
    /// 在前三行里取第一个整行 `<th>`、或者提到期限类词语且首列不含数字的行；
    /// 找不到时把第一行当作表头使用。
    pub fn header_row(&self) -> usize {
        self.rows
            .iter()
            .take(HEADER_SCAN_ROWS)
            .position(|row| {
                if row.all_th {
                    return true;
                }
                let text = row.cells.join(" ").to_lowercase();
                let first_has_digit = row
                    .cells
                    .first()
                    .is_some_and(|c| c.chars().any(|ch| ch.is_ascii_digit()));
                HEADER_TERMS.iter().any(|t| text.contains(t)) && !first_has_digit
            })
            .unwrap_or(0)
    }

    /// 表头单元格文本
    pub fn header_cells(&self) -> Vec<String> {
        self.rows
            .get(self.header_row())
            .map(|r| r.cells.clone())
            .unwrap_or_default()
    }
}

/// 元素内全部文本，空白压缩为单个空格
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
