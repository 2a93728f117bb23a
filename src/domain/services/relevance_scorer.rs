// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::source_profile::SourceProfile;
use crate::domain::services::table_grid::{element_text, TableGrid};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// 通用领域关键字
pub const DOMAIN_KEYWORDS: &[&str] = &["fd", "fixed", "deposit", "interest", "rate", "tenure"];

const TENURE_TERMS: &[&str] = &["tenure", "period", "term", "duration", "days", "months", "years"];
const RATE_TERMS: &[&str] = &["rate", "interest", "%", "percentage"];

const SITE_CLASS_WEIGHT: u32 = 5;
const TABLE_KEYWORD_WEIGHT: u32 = 3;
const CONTAINER_KEYWORD_WEIGHT: u32 = 2;
const CONTEXT_WEIGHT: u32 = 2;
const CONTENT_WEIGHT: u32 = 3;

const MAX_PRECEDING_HEADINGS: usize = 3;
const LEADING_ROWS: usize = 2;

static TABLES_AND_HEADINGS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, h5, h6, table").unwrap());
static CAPTION: Lazy<Selector> = Lazy::new(|| Selector::parse("caption").unwrap());

/// 表格评分使用的关键字配置
#[derive(Debug, Clone)]
pub struct KeywordProfile {
    /// 站点特定的CSS类（小写）
    pub site_classes: Vec<String>,
    /// 领域关键字（小写）
    pub keywords: Vec<String>,
}

impl KeywordProfile {
    /// 不带站点特定信息的通用配置
    pub fn generic() -> Self {
        Self {
            site_classes: Vec::new(),
            keywords: DOMAIN_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// 通用关键字加上数据源自带的类名与关键字
    pub fn for_source(profile: &SourceProfile) -> Self {
        let mut keywords = Self::generic().keywords;
        for keyword in &profile.keywords {
            let keyword = keyword.to_lowercase();
            if !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }
        Self {
            site_classes: profile
                .container_classes
                .iter()
                .map(|c| c.to_lowercase())
                .collect(),
            keywords,
        }
    }

    fn mentions_keyword(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

/// 候选表格
///
/// 持有指向页面中 `<table>` 节点的引用，只在一次提取过程中存活。
#[derive(Debug)]
pub struct TableCandidate<'a> {
    /// 表格节点
    pub element: ElementRef<'a>,
    /// 表格在文档中的顺序
    pub position: usize,
    /// 相关性分数
    pub score: u32,
    /// 表头单元格文本
    pub headers: Vec<String>,
    /// 表格文本网格
    pub grid: TableGrid,
    /// 标题及前置标题文本（小写），供类别判断使用
    pub context: String,
}

/// 表格相关性评分器
///
/// 嵌套在相关容器中的表格、紧跟在利率标题后的表格本身也都是页面里的
/// `<table>`，所以按文档顺序枚举全部表格，再把容器与标题作为评分信号。
pub struct RelevanceScorer {
    profile: KeywordProfile,
}

impl RelevanceScorer {
    pub fn new(profile: KeywordProfile) -> Self {
        Self { profile }
    }

    /// 为页面中所有表格打分，按分数降序排列，同分保持文档顺序
    pub fn rank<'a>(&self, document: &'a Html) -> Vec<TableCandidate<'a>> {
        let mut headings: Vec<String> = Vec::new();
        let mut candidates = Vec::new();

        for element in document.select(&TABLES_AND_HEADINGS) {
            if element.value().name() != "table" {
                headings.push(element_text(element).to_lowercase());
                continue;
            }

            let preceding: Vec<&String> = headings.iter().rev().take(MAX_PRECEDING_HEADINGS).collect();
            let caption = element
                .select(&CAPTION)
                .next()
                .map(|c| element_text(c).to_lowercase())
                .unwrap_or_default();
            let grid = TableGrid::from_element(element);
            let score = self.score(element, &grid, &caption, &preceding);
            let position = candidates.len();

            debug!(position, score, rows = grid.rows.len(), "Scored table");

            let mut context = caption;
            for heading in preceding {
                context.push(' ');
                context.push_str(heading);
            }

            candidates.push(TableCandidate {
                element,
                position,
                score,
                headers: grid.header_cells(),
                grid,
                context,
            });
        }

        // sort_by is stable, equal scores keep document order.
        candidates.sort_by(|a, b| b.score.cmp(&a.score));
        candidates
    }

    fn score(
        &self,
        table: ElementRef<'_>,
        grid: &TableGrid,
        caption: &str,
        headings: &[&String],
    ) -> u32 {
        let mut score = 0;

        let own = attr_text(table);
        for class in &self.profile.site_classes {
            if own.contains(class.as_str()) {
                score += SITE_CLASS_WEIGHT;
            }
        }
        for keyword in &self.profile.keywords {
            if own.contains(keyword.as_str()) {
                score += TABLE_KEYWORD_WEIGHT;
            }
        }

        score += table
            .ancestors()
            .filter_map(ElementRef::wrap)
            .filter(|e| matches!(e.value().name(), "div" | "section"))
            .map(|container| {
                let text = attr_text(container);
                if self.profile.site_classes.iter().any(|c| text.contains(c.as_str())) {
                    SITE_CLASS_WEIGHT
                } else if self.profile.mentions_keyword(&text) {
                    CONTAINER_KEYWORD_WEIGHT
                } else {
                    0
                }
            })
            .max()
            .unwrap_or(0);

        if self.profile.mentions_keyword(caption) {
            score += CONTEXT_WEIGHT;
        }
        for heading in headings {
            if self.profile.mentions_keyword(heading) {
                score += CONTEXT_WEIGHT;
            }
        }

        let leading = grid.leading_text(LEADING_ROWS);
        if TENURE_TERMS.iter().any(|t| leading.contains(t)) {
            score += CONTENT_WEIGHT;
        }
        if RATE_TERMS.iter().any(|t| leading.contains(t)) {
            score += CONTENT_WEIGHT;
        }

        score
    }
}

/// class 与 id 属性拼接后的小写文本
fn attr_text(element: ElementRef<'_>) -> String {
    let value = element.value();
    format!(
        "{} {}",
        value.attr("class").unwrap_or_default(),
        value.attr("id").unwrap_or_default()
    )
    .to_lowercase()
}
