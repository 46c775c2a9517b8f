//! 连续发帖天数计算

use std::collections::BTreeSet;

use chrono::NaiveDate;

/// 最长连续自然日天数
///
/// 日期降序遍历，相邻两天差 1 天则累加，否则重置为 1。
pub fn longest_streak(dates: &BTreeSet<NaiveDate>) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous: Option<NaiveDate> = None;

    for &date in dates.iter().rev() {
        current = match previous {
            Some(prev) if prev.pred_opt() == Some(date) => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        previous = Some(date);
    }

    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn days(start: NaiveDate, offsets: &[i64]) -> BTreeSet<NaiveDate> {
        offsets
            .iter()
            .map(|&d| start + Duration::days(d))
            .collect()
    }

    fn d0() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 26).unwrap()
    }

    #[test]
    fn test_empty() {
        assert_eq!(longest_streak(&BTreeSet::new()), 0);
    }

    #[test]
    fn test_single_day() {
        assert_eq!(longest_streak(&days(d0(), &[0])), 1);
    }

    #[test]
    fn test_consecutive_across_month_end() {
        // 2026-02-26 .. 2026-03-02
        assert_eq!(longest_streak(&days(d0(), &[0, 1, 2, 3])), 4);
        assert_eq!(longest_streak(&days(d0(), &[0, 1, 2, 3, 4])), 5);
    }

    #[test]
    fn test_gap_resets_run() {
        assert_eq!(longest_streak(&days(d0(), &[0, 1, 2, 4, 5, 6])), 3);
    }

    #[test]
    fn test_longest_run_not_most_recent() {
        assert_eq!(longest_streak(&days(d0(), &[0, 1, 2, 3, 4, 5, 10, 11])), 6);
    }
}
