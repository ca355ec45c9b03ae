//! Obligation rollups and urgency classification.
//!
//! Pure functions over an obligation slice; the handlers fetch rows
//! and hand them in together with the KST civil date.

use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::dtos::reminder::UpcomingTax;
use crate::dtos::statistics::{
    MonthRollup, StationRollup, StatusRollup, TaxStatistics, TypeRollup,
};
use crate::models::{Tax, TaxStatus, TaxType};

const ALL_TYPES: [TaxType; 4] = [
    TaxType::Acquisition,
    TaxType::Property,
    TaxType::Local,
    TaxType::Other,
];

const ALL_STATUSES: [TaxStatus; 3] = [
    TaxStatus::AccountingReview,
    TaxStatus::PaymentScheduled,
    TaxStatus::PaymentCompleted,
];

/// Counts fed to the insight generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxAggregates {
    pub total: usize,
    pub unpaid: usize,
    pub overdue: usize,
    pub monthly_due: usize,
    pub weekly_due: usize,
}

fn is_completed(tax: &Tax) -> bool {
    TaxStatus::from_string(&tax.status) == TaxStatus::PaymentCompleted
}

fn is_overdue(tax: &Tax, today: NaiveDate) -> bool {
    tax.due_date.is_some_and(|due| due < today) && !is_completed(tax)
}

/// One-pass rollup over the obligation list.
pub fn compute_statistics(
    taxes: &[Tax],
    station_names: &HashMap<Uuid, String>,
    today: NaiveDate,
) -> TaxStatistics {
    let mut total_amount = 0i64;
    let mut overdue_taxes = 0usize;
    let mut completed_tax_sum = 0i64;
    let mut type_totals = [(0usize, 0i64); ALL_TYPES.len()];
    let mut status_totals = [(0usize, 0i64); ALL_STATUSES.len()];
    let mut month_totals: BTreeMap<String, (usize, i64)> = BTreeMap::new();
    let mut station_totals: HashMap<Option<Uuid>, (usize, i64)> = HashMap::new();

    for tax in taxes {
        total_amount += tax.tax_amount;

        if is_overdue(tax, today) {
            overdue_taxes += 1;
        }
        if is_completed(tax) {
            completed_tax_sum += tax.tax_amount;
        }

        let tax_type = TaxType::from_string(&tax.tax_type);
        let type_idx = ALL_TYPES
            .iter()
            .position(|t| *t == tax_type)
            .unwrap_or(ALL_TYPES.len() - 1);
        type_totals[type_idx].0 += 1;
        type_totals[type_idx].1 += tax.tax_amount;

        let status = TaxStatus::from_string(&tax.status);
        let status_idx = ALL_STATUSES
            .iter()
            .position(|s| *s == status)
            .unwrap_or(1);
        status_totals[status_idx].0 += 1;
        status_totals[status_idx].1 += tax.tax_amount;

        if let Some(due) = tax.due_date {
            let bucket = month_totals
                .entry(due.format("%Y-%m").to_string())
                .or_default();
            bucket.0 += 1;
            bucket.1 += tax.tax_amount;
        }

        let station = station_totals.entry(tax.station_id).or_default();
        station.0 += 1;
        station.1 += tax.tax_amount;
    }

    let by_type = ALL_TYPES
        .iter()
        .zip(type_totals)
        .filter(|(_, (count, _))| *count > 0)
        .map(|(tax_type, (count, amount))| TypeRollup {
            tax_type: tax_type.as_str().to_string(),
            label: tax_type.label().to_string(),
            count,
            amount,
        })
        .collect();

    let by_status = ALL_STATUSES
        .iter()
        .zip(status_totals)
        .filter(|(_, (count, _))| *count > 0)
        .map(|(status, (count, amount))| StatusRollup {
            status: status.as_str().to_string(),
            label: status.label().to_string(),
            count,
            amount,
        })
        .collect();

    let by_month = month_totals
        .into_iter()
        .map(|(month, (count, amount))| MonthRollup {
            month,
            count,
            amount,
        })
        .collect();

    let mut by_station: Vec<StationRollup> = station_totals
        .into_iter()
        .map(|(station_id, (count, amount))| StationRollup {
            station_id,
            station_name: station_id
                .and_then(|id| station_names.get(&id).cloned())
                .unwrap_or_else(|| "미지정".to_string()),
            count,
            amount,
        })
        .collect();
    by_station.sort_by(|a, b| b.count.cmp(&a.count).then(b.amount.cmp(&a.amount)));
    by_station.truncate(10);

    TaxStatistics {
        total_taxes: taxes.len(),
        total_amount,
        overdue_taxes,
        completed_tax_sum,
        by_type,
        by_status,
        by_month,
        by_station,
    }
}

/// Bucket open obligations by how close their due date is, nearest
/// first. Anything more than 30 days out is dropped.
pub fn classify_upcoming(taxes: &[Tax], today: NaiveDate) -> Vec<UpcomingTax> {
    let mut upcoming: Vec<UpcomingTax> = taxes
        .iter()
        .filter(|tax| !is_completed(tax))
        .filter_map(|tax| {
            let due = tax.due_date?;
            let days = (due - today).num_days();
            let urgency = match days {
                d if d < 0 => "overdue",
                0 => "due_today",
                d if d <= 7 => "7_days",
                d if d <= 14 => "14_days",
                d if d <= 30 => "30_days",
                _ => return None,
            };
            Some(UpcomingTax {
                tax_id: tax.tax_id,
                station_id: tax.station_id,
                tax_type: tax.tax_type.clone(),
                tax_amount: tax.tax_amount,
                due_date: due,
                days_until_due: days,
                urgency,
            })
        })
        .collect();

    upcoming.sort_by_key(|tax| tax.days_until_due);
    upcoming
}

/// Headline counts for the insight prompt. Windows are half-open from
/// today: this week `[today, today+7)`, this month `[today, today+30)`.
pub fn tax_aggregates(taxes: &[Tax], today: NaiveDate) -> TaxAggregates {
    let week_end = today + Duration::days(7);
    let month_end = today + Duration::days(30);

    let mut aggregates = TaxAggregates {
        total: taxes.len(),
        unpaid: 0,
        overdue: 0,
        monthly_due: 0,
        weekly_due: 0,
    };

    for tax in taxes {
        if is_completed(tax) {
            continue;
        }
        aggregates.unpaid += 1;

        let Some(due) = tax.due_date else { continue };
        if due < today {
            aggregates.overdue += 1;
        }
        if due >= today && due < month_end {
            aggregates.monthly_due += 1;
        }
        if due >= today && due < week_end {
            aggregates.weekly_due += 1;
        }
    }

    aggregates
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn tax(
        station_id: Option<Uuid>,
        tax_type: TaxType,
        amount: i64,
        due: Option<NaiveDate>,
        status: TaxStatus,
    ) -> Tax {
        Tax {
            tax_id: Uuid::new_v4(),
            station_id,
            tax_type: tax_type.as_str().to_string(),
            tax_amount: amount,
            due_date: due,
            tax_notice_number: None,
            tax_year: None,
            tax_period: None,
            notes: None,
            status: status.as_str().to_string(),
            created_utc: Utc::now(),
            updated_utc: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_overdue_excludes_completed() {
        let today = date(2025, 6, 15);
        let taxes = vec![
            tax(None, TaxType::Property, 100, Some(date(2025, 6, 1)), TaxStatus::PaymentScheduled),
            tax(None, TaxType::Property, 200, Some(date(2025, 6, 1)), TaxStatus::PaymentCompleted),
            tax(None, TaxType::Property, 300, Some(date(2025, 6, 20)), TaxStatus::PaymentScheduled),
            tax(None, TaxType::Property, 400, None, TaxStatus::PaymentScheduled),
        ];

        let stats = compute_statistics(&taxes, &HashMap::new(), today);

        assert_eq!(stats.total_taxes, 4);
        assert_eq!(stats.total_amount, 1000);
        assert_eq!(stats.overdue_taxes, 1);
        assert_eq!(stats.completed_tax_sum, 200);
    }

    #[test]
    fn test_type_rollup_in_workflow_order() {
        let today = date(2025, 6, 15);
        let taxes = vec![
            tax(None, TaxType::Other, 50, None, TaxStatus::PaymentScheduled),
            tax(None, TaxType::Acquisition, 100, None, TaxStatus::AccountingReview),
            tax(None, TaxType::Acquisition, 200, None, TaxStatus::PaymentScheduled),
        ];

        let stats = compute_statistics(&taxes, &HashMap::new(), today);

        assert_eq!(stats.by_type.len(), 2);
        assert_eq!(stats.by_type[0].tax_type, "acquisition");
        assert_eq!(stats.by_type[0].label, "취득세");
        assert_eq!(stats.by_type[0].count, 2);
        assert_eq!(stats.by_type[0].amount, 300);
        assert_eq!(stats.by_type[1].tax_type, "other");
    }

    #[test]
    fn test_month_buckets_ascending_skip_null_due() {
        let today = date(2025, 6, 15);
        let taxes = vec![
            tax(None, TaxType::Property, 100, Some(date(2025, 7, 10)), TaxStatus::PaymentScheduled),
            tax(None, TaxType::Property, 200, Some(date(2025, 6, 5)), TaxStatus::PaymentScheduled),
            tax(None, TaxType::Property, 300, Some(date(2025, 6, 25)), TaxStatus::PaymentScheduled),
            tax(None, TaxType::Property, 400, None, TaxStatus::PaymentScheduled),
        ];

        let stats = compute_statistics(&taxes, &HashMap::new(), today);

        assert_eq!(stats.by_month.len(), 2);
        assert_eq!(stats.by_month[0].month, "2025-06");
        assert_eq!(stats.by_month[0].count, 2);
        assert_eq!(stats.by_month[0].amount, 500);
        assert_eq!(stats.by_month[1].month, "2025-07");
    }

    #[test]
    fn test_station_rollup_names_and_unassigned() {
        let today = date(2025, 6, 15);
        let station = Uuid::new_v4();
        let mut names = HashMap::new();
        names.insert(station, "강남 1호점".to_string());

        let taxes = vec![
            tax(Some(station), TaxType::Property, 100, None, TaxStatus::PaymentScheduled),
            tax(Some(station), TaxType::Property, 200, None, TaxStatus::PaymentScheduled),
            tax(None, TaxType::Property, 300, None, TaxStatus::PaymentScheduled),
        ];

        let stats = compute_statistics(&taxes, &names, today);

        assert_eq!(stats.by_station.len(), 2);
        assert_eq!(stats.by_station[0].station_name, "강남 1호점");
        assert_eq!(stats.by_station[0].count, 2);
        assert_eq!(stats.by_station[1].station_name, "미지정");
    }

    #[test]
    fn test_station_rollup_keeps_top_ten() {
        let today = date(2025, 6, 15);
        let mut names = HashMap::new();
        let mut taxes = Vec::new();
        for i in 0..12 {
            let id = Uuid::new_v4();
            names.insert(id, format!("충전소 {i}"));
            // Station i carries i+1 obligations
            for _ in 0..=i {
                taxes.push(tax(Some(id), TaxType::Property, 10, None, TaxStatus::PaymentScheduled));
            }
        }

        let stats = compute_statistics(&taxes, &names, today);

        assert_eq!(stats.by_station.len(), 10);
        assert_eq!(stats.by_station[0].count, 12);
        assert_eq!(stats.by_station[9].count, 3);
    }

    #[test]
    fn test_urgency_boundaries() {
        let today = date(2025, 6, 15);
        let taxes = vec![
            tax(None, TaxType::Property, 1, Some(date(2025, 6, 14)), TaxStatus::PaymentScheduled),
            tax(None, TaxType::Property, 2, Some(date(2025, 6, 15)), TaxStatus::PaymentScheduled),
            tax(None, TaxType::Property, 3, Some(date(2025, 6, 22)), TaxStatus::PaymentScheduled),
            tax(None, TaxType::Property, 4, Some(date(2025, 6, 29)), TaxStatus::PaymentScheduled),
            tax(None, TaxType::Property, 5, Some(date(2025, 7, 15)), TaxStatus::PaymentScheduled),
            tax(None, TaxType::Property, 6, Some(date(2025, 7, 16)), TaxStatus::PaymentScheduled),
        ];

        let upcoming = classify_upcoming(&taxes, today);

        assert_eq!(upcoming.len(), 5);
        assert_eq!(upcoming[0].urgency, "overdue");
        assert_eq!(upcoming[1].urgency, "due_today");
        assert_eq!(upcoming[2].urgency, "7_days");
        assert_eq!(upcoming[3].urgency, "14_days");
        assert_eq!(upcoming[4].urgency, "30_days");
    }

    #[test]
    fn test_upcoming_skips_completed_and_far_out() {
        let today = date(2025, 6, 15);
        let taxes = vec![
            tax(None, TaxType::Property, 1, Some(date(2025, 6, 10)), TaxStatus::PaymentCompleted),
            tax(None, TaxType::Property, 2, Some(date(2025, 8, 1)), TaxStatus::PaymentScheduled),
            tax(None, TaxType::Property, 3, None, TaxStatus::PaymentScheduled),
        ];

        assert!(classify_upcoming(&taxes, today).is_empty());
    }

    #[test]
    fn test_aggregates_windows() {
        let today = date(2025, 6, 15);
        let taxes = vec![
            // overdue
            tax(None, TaxType::Property, 1, Some(date(2025, 6, 1)), TaxStatus::PaymentScheduled),
            // this week and this month
            tax(None, TaxType::Property, 2, Some(date(2025, 6, 18)), TaxStatus::PaymentScheduled),
            // this month only (week window is [15, 22))
            tax(None, TaxType::Property, 3, Some(date(2025, 6, 22)), TaxStatus::PaymentScheduled),
            // outside the month window [15, 7-15)
            tax(None, TaxType::Property, 4, Some(date(2025, 7, 15)), TaxStatus::PaymentScheduled),
            // completed, ignored everywhere
            tax(None, TaxType::Property, 5, Some(date(2025, 6, 16)), TaxStatus::PaymentCompleted),
        ];

        let aggregates = tax_aggregates(&taxes, today);

        assert_eq!(aggregates.total, 5);
        assert_eq!(aggregates.unpaid, 4);
        assert_eq!(aggregates.overdue, 1);
        assert_eq!(aggregates.monthly_due, 2);
        assert_eq!(aggregates.weekly_due, 1);
    }
}
