// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 期限文本归一化
//!
//! 把 "91 days to 6 months"、"1 Year"、"less than 46 days" 之类的自由文本
//! 转换为以天为单位的 [`TenureRange`]。规则按固定优先级依次尝试，
//! 第一个命中的规则决定结果；这个顺序本身就是约定，因为同一段文本
//! 往往能宽松地匹配多个规则。

use crate::domain::models::rate_quote::TenureRange;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const DAYS_PER_MONTH: u32 = 30;
const DAYS_PER_YEAR: u32 = 365;
/// "more than N days" 的开放区间宽度
const OPEN_ENDED_WINDOW_DAYS: u32 = 365;

macro_rules! sep {
    () => {
        r"(?:to|up to|-|–|and up to|and|less than)"
    };
}

static DAY_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(r"(\d+)\s*days?\s*", sep!(), r"\s*(\d+)\s*days?")).unwrap()
});

static YEAR_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(\d+)\s*years?\s*(?:\d+\s*days?)?\s*",
        sep!(),
        r"\s*(\d+)\s*years?"
    ))
    .unwrap()
});

static MONTH_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(\d+)\s*months?\s*",
        sep!(),
        r"?\s*",
        sep!(),
        r"?\s*(\d+)\s*months?"
    ))
    .unwrap()
});

static MIXED_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(\d+)\s*(day|month|year)s?\s*",
        sep!(),
        r"\s*(\d+)\s*(day|month|year)s?"
    ))
    .unwrap()
});

// Group 1 marks a comparative qualifier; such matches are left for the
// "less than" / "more than" rules.
static SINGLE_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:(less|more) than\s*)?(\d+)\s*days?").unwrap());
static SINGLE_MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*months?").unwrap());
static SINGLE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*years?").unwrap());
static LESS_THAN_DAYS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"less than\s*(\d+)\s*days?").unwrap());
static MORE_THAN_DAYS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"more than\s*(\d+)\s*days?").unwrap());
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// 命中的归一化规则，按优先级排列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenureRule {
    DayRange,
    YearRange,
    MonthRange,
    MixedRange,
    SingleDays,
    SingleMonths,
    SingleYears,
    LessThanDays,
    MoreThanDays,
    Numbers,
}

/// 归一化结果：命中的规则以及对应的区间
///
/// 规则命中但数值不满足区间不变量时 `range` 为 `None`，
/// 此时不会继续尝试后续规则。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenureMatch {
    pub rule: TenureRule,
    pub range: Option<TenureRange>,
}

/// 把期限文本转换为天数区间，无法解析时返回 `None`
pub fn normalize_tenure(text: &str) -> Option<TenureRange> {
    classify_tenure(text).and_then(|m| m.range)
}

/// 按优先级依次匹配规则，返回第一个命中的规则
///
/// 文本会先转小写并去除首尾空白。没有任何规则命中（包括文本中
/// 不含数字）时返回 `None`。
pub fn classify_tenure(text: &str) -> Option<TenureMatch> {
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    if let Some(c) = DAY_RANGE.captures(&text) {
        return Some(hit(TenureRule::DayRange, range(&c, 1, 1, 2, 1)));
    }
    if let Some(c) = YEAR_RANGE.captures(&text) {
        return Some(hit(
            TenureRule::YearRange,
            range(&c, 1, DAYS_PER_YEAR, 2, DAYS_PER_YEAR),
        ));
    }
    if let Some(c) = MONTH_RANGE.captures(&text) {
        return Some(hit(
            TenureRule::MonthRange,
            range(&c, 1, DAYS_PER_MONTH, 2, DAYS_PER_MONTH),
        ));
    }
    if let Some(c) = MIXED_RANGE.captures(&text) {
        let min = unit_factor(&c[2]).and_then(|f| scaled(&c, 1, f));
        let max = unit_factor(&c[4]).and_then(|f| scaled(&c, 3, f));
        let range = min.zip(max).and_then(|(min, max)| TenureRange::new(min, max));
        return Some(hit(TenureRule::MixedRange, range));
    }
    if let Some(c) = SINGLE_DAY
        .captures_iter(&text)
        .find(|c| c.get(1).is_none())
    {
        return Some(hit(
            TenureRule::SingleDays,
            scaled(&c, 2, 1).and_then(TenureRange::single),
        ));
    }
    if let Some(c) = SINGLE_MONTH.captures(&text) {
        return Some(hit(
            TenureRule::SingleMonths,
            scaled(&c, 1, DAYS_PER_MONTH).and_then(TenureRange::single),
        ));
    }
    if let Some(c) = SINGLE_YEAR.captures(&text) {
        return Some(hit(
            TenureRule::SingleYears,
            scaled(&c, 1, DAYS_PER_YEAR).and_then(TenureRange::single),
        ));
    }
    if let Some(c) = LESS_THAN_DAYS.captures(&text) {
        let range = scaled(&c, 1, 1)
            .and_then(|days| days.checked_sub(1))
            .and_then(|max| TenureRange::new(1, max));
        return Some(hit(TenureRule::LessThanDays, range));
    }
    if let Some(c) = MORE_THAN_DAYS.captures(&text) {
        let range = scaled(&c, 1, 1).and_then(|days| {
            TenureRange::new(
                days.checked_add(1)?,
                days.checked_add(OPEN_ENDED_WINDOW_DAYS)?,
            )
        });
        return Some(hit(TenureRule::MoreThanDays, range));
    }

    // Last resort: literal integers, no unit conversion.
    let numbers: Vec<Option<u32>> = NUMBER
        .find_iter(&text)
        .take(2)
        .map(|m| m.as_str().parse().ok())
        .collect();
    let range = match numbers.as_slice() {
        [] => return None,
        [single] => single.and_then(TenureRange::single),
        [min, max, ..] => min.zip(*max).and_then(|(min, max)| TenureRange::new(min, max)),
    };
    Some(hit(TenureRule::Numbers, range))
}

fn hit(rule: TenureRule, range: Option<TenureRange>) -> TenureMatch {
    TenureMatch { rule, range }
}

fn unit_factor(unit: &str) -> Option<u32> {
    match unit {
        "day" => Some(1),
        "month" => Some(DAYS_PER_MONTH),
        "year" => Some(DAYS_PER_YEAR),
        _ => None,
    }
}

fn scaled(caps: &Captures<'_>, group: usize, factor: u32) -> Option<u32> {
    caps.get(group)?
        .as_str()
        .parse::<u32>()
        .ok()?
        .checked_mul(factor)
}

fn range(
    caps: &Captures<'_>,
    min_group: usize,
    min_factor: u32,
    max_group: usize,
    max_factor: u32,
) -> Option<TenureRange> {
    TenureRange::new(
        scaled(caps, min_group, min_factor)?,
        scaled(caps, max_group, max_factor)?,
    )
}
