//! Monthly trends and insight heuristics.
//!
//! Buckets records by calendar month over a trailing window and derives
//! qualitative insights from the buckets using fixed thresholds.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{CompensationPolicy, DayRecord, Insight, MonthBucket, TrendReport, YearMonth};

use super::day_hours::calculate_day_hours;

/// Overtime must exceed deficit by this factor (and vice versa) for a
/// balance insight to fire.
pub const BALANCE_RATIO: i64 = 2;

/// Month-over-month overtime growth, in percent, above which an increase
/// insight fires.
pub const OVERTIME_INCREASE_THRESHOLD_PERCENT: i64 = 20;

/// Returns the `n` most recent months ending at the month of `today`, oldest first.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use timesheet_engine::calculation::months_back;
///
/// let today = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
/// let months: Vec<String> = months_back(3, today).iter().map(|m| m.to_string()).collect();
/// assert_eq!(months, vec!["2023-12", "2024-01", "2024-02"]);
/// ```
pub fn months_back(n: usize, today: NaiveDate) -> Vec<YearMonth> {
    let mut months = Vec::with_capacity(n);
    let mut current = YearMonth::from_date(today);

    for _ in 0..n {
        months.push(current);
        current = current.previous();
    }

    months.reverse();
    months
}

/// Sums records into one bucket per month in `months`.
///
/// Buckets come back in the order of `months`, including months without any
/// matching record.
pub fn bucket_by_month(
    records: &[DayRecord],
    months: &[YearMonth],
    policy: &CompensationPolicy,
) -> Vec<MonthBucket> {
    months
        .iter()
        .map(|month| {
            let prefix = month.prefix();
            let mut bucket = MonthBucket::empty(*month);

            for record in records.iter().filter(|r| r.matches_prefix(&prefix)) {
                let hours = calculate_day_hours(record, policy);
                bucket.total += hours.total;
                bucket.overtime += hours.overtime;
                bucket.deficit += hours.deficit;
                bucket.day_count += 1;
                if record.is_complete() {
                    bucket.days_worked += 1;
                }
            }

            bucket
        })
        .collect()
}

/// Derives insights from month buckets.
///
/// Checks run in order and several may fire, except when fewer than two
/// months hold data: then only [`Insight::InsufficientData`] is returned.
///
/// # Example
///
/// ```
/// use timesheet_engine::calculation::derive_insights;
/// use timesheet_engine::models::{CompensationPolicy, Insight, MonthBucket, YearMonth};
///
/// let buckets = vec![MonthBucket::empty(YearMonth::new(2024, 1).unwrap())];
/// let insights = derive_insights(&buckets, &CompensationPolicy::default());
/// assert_eq!(insights, vec![Insight::InsufficientData]);
/// ```
pub fn derive_insights(buckets: &[MonthBucket], policy: &CompensationPolicy) -> Vec<Insight> {
    let months_with_data = buckets.iter().filter(|b| b.has_data()).count();
    if months_with_data < 2 {
        return vec![Insight::InsufficientData];
    }

    let mut insights = Vec::new();

    let overtime: i64 = buckets.iter().map(|b| b.overtime).sum();
    let deficit: i64 = buckets.iter().map(|b| b.deficit).sum();

    if overtime > BALANCE_RATIO * deficit {
        insights.push(Insight::PositiveBalance { overtime, deficit });
    } else if deficit > BALANCE_RATIO * overtime {
        insights.push(Insight::NegativeBalance { overtime, deficit });
    }

    if let [.., prior, latest] = buckets {
        if let Some(insight) = overtime_increase(prior.overtime, latest.overtime) {
            insights.push(insight);
        }
    }

    let total: i64 = buckets.iter().map(|b| b.total).sum();
    let days_worked: i64 = buckets.iter().map(|b| i64::from(b.days_worked)).sum();
    if days_worked > 0 {
        let average_minutes = total / days_worked;
        let expected_minutes = policy.standard_daily_minutes;
        if average_minutes > expected_minutes {
            insights.push(Insight::AboveExpected {
                average_minutes,
                expected_minutes,
                delta_minutes: average_minutes - expected_minutes,
            });
        }
    }

    insights
}

/// Buckets `records` over `months` and derives the insights in one go.
pub fn trend_report(
    records: &[DayRecord],
    months: &[YearMonth],
    policy: &CompensationPolicy,
) -> TrendReport {
    let buckets = bucket_by_month(records, months, policy);
    let insights = derive_insights(&buckets, policy);
    TrendReport {
        months: buckets,
        insights,
    }
}

fn overtime_increase(previous: i64, current: i64) -> Option<Insight> {
    // No baseline to compare against.
    if previous <= 0 {
        return None;
    }

    if current * 100 <= previous * (100 + OVERTIME_INCREASE_THRESHOLD_PERCENT) {
        return None;
    }

    let percent = (Decimal::from(current - previous) * Decimal::ONE_HUNDRED
        / Decimal::from(previous))
    .round_dp(1);

    Some(Insight::OvertimeIncrease {
        previous,
        current,
        percent,
    })
}
