// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 清洗并校验利率文本
///
/// 去掉 `%` 和首尾空白后解析为数值，只接受 `0 < rate < 100`。
/// 非数值、缺失或越界的输入都视为无效并返回 `None`，
/// 这是一种可恢复的分类结果而不是错误。
pub fn normalize_rate(text: &str) -> Option<f64> {
    let cleaned = text.trim().replace('%', "");
    let rate: f64 = cleaned.trim().parse().ok()?;
    (rate > 0.0 && rate < 100.0).then_some(rate)
}
