//! Tax obligation model and payment workflow.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Category of a tax obligation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxType {
    Acquisition,
    Property,
    Local,
    Other,
}

impl TaxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxType::Acquisition => "acquisition",
            TaxType::Property => "property",
            TaxType::Local => "local",
            TaxType::Other => "other",
        }
    }

    /// Strict parse for request input.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "acquisition" => Some(TaxType::Acquisition),
            "property" => Some(TaxType::Property),
            "local" => Some(TaxType::Local),
            "other" => Some(TaxType::Other),
            _ => None,
        }
    }

    /// Lenient parse for stored values.
    pub fn from_string(s: &str) -> Self {
        Self::parse(s).unwrap_or(TaxType::Other)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaxType::Acquisition => "취득세",
            TaxType::Property => "재산세",
            TaxType::Local => "지방세",
            TaxType::Other => "기타세",
        }
    }

    /// Payment workflow for this tax type, in order.
    /// Acquisition tax passes an accountant review first; the rest
    /// start at payment_scheduled.
    pub fn workflow(&self) -> &'static [TaxStatus] {
        match self {
            TaxType::Acquisition => &[
                TaxStatus::AccountingReview,
                TaxStatus::PaymentScheduled,
                TaxStatus::PaymentCompleted,
            ],
            _ => &[TaxStatus::PaymentScheduled, TaxStatus::PaymentCompleted],
        }
    }

    /// First workflow status for a newly registered obligation.
    pub fn initial_status(&self) -> TaxStatus {
        self.workflow()[0]
    }
}

/// Payment workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxStatus {
    AccountingReview,
    PaymentScheduled,
    PaymentCompleted,
}

impl TaxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxStatus::AccountingReview => "accounting_review",
            TaxStatus::PaymentScheduled => "payment_scheduled",
            TaxStatus::PaymentCompleted => "payment_completed",
        }
    }

    /// Strict parse for request input.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "accounting_review" => Some(TaxStatus::AccountingReview),
            "payment_scheduled" => Some(TaxStatus::PaymentScheduled),
            "payment_completed" => Some(TaxStatus::PaymentCompleted),
            _ => None,
        }
    }

    /// Lenient parse for stored values.
    pub fn from_string(s: &str) -> Self {
        Self::parse(s).unwrap_or(TaxStatus::PaymentScheduled)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaxStatus::AccountingReview => "회계사 검토",
            TaxStatus::PaymentScheduled => "납부 예정",
            TaxStatus::PaymentCompleted => "납부 완료",
        }
    }

    /// A status moves one workflow step at a time, forward or backward.
    pub fn can_transition(tax_type: TaxType, from: TaxStatus, to: TaxStatus) -> bool {
        let workflow = tax_type.workflow();
        let from_pos = workflow.iter().position(|s| *s == from);
        let to_pos = workflow.iter().position(|s| *s == to);
        match (from_pos, to_pos) {
            (Some(f), Some(t)) => f.abs_diff(t) == 1,
            _ => false,
        }
    }
}

/// Tax obligation record. Amounts are integral KRW.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tax {
    pub tax_id: Uuid,
    pub station_id: Option<Uuid>,
    pub tax_type: String,
    pub tax_amount: i64,
    pub due_date: Option<NaiveDate>,
    pub tax_notice_number: Option<String>,
    pub tax_year: Option<i32>,
    pub tax_period: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// Input for creating a tax obligation.
#[derive(Debug, Clone)]
pub struct CreateTax {
    pub station_id: Option<Uuid>,
    pub tax_type: TaxType,
    pub tax_amount: i64,
    pub due_date: Option<NaiveDate>,
    pub tax_notice_number: Option<String>,
    pub tax_year: Option<i32>,
    pub tax_period: Option<String>,
    pub notes: Option<String>,
    pub status: TaxStatus,
}

/// Input for replacing a tax obligation. Status is excluded; it only
/// moves through the transition operation.
#[derive(Debug, Clone)]
pub struct UpdateTax {
    pub station_id: Option<Uuid>,
    pub tax_type: TaxType,
    pub tax_amount: i64,
    pub due_date: Option<NaiveDate>,
    pub tax_notice_number: Option<String>,
    pub tax_year: Option<i32>,
    pub tax_period: Option<String>,
    pub notes: Option<String>,
}

/// Filter parameters for listing tax obligations.
#[derive(Debug, Clone, Default)]
pub struct ListTaxesFilter {
    pub station_id: Option<Uuid>,
    pub status: Option<TaxStatus>,
    pub tax_type: Option<TaxType>,
    pub due_after: Option<NaiveDate>,
    pub due_before: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquisition_walks_three_statuses() {
        let workflow = TaxType::Acquisition.workflow();
        assert_eq!(
            workflow,
            &[
                TaxStatus::AccountingReview,
                TaxStatus::PaymentScheduled,
                TaxStatus::PaymentCompleted,
            ]
        );
        assert_eq!(
            TaxType::Acquisition.initial_status(),
            TaxStatus::AccountingReview
        );
    }

    #[test]
    fn test_other_types_skip_review() {
        for tax_type in [TaxType::Property, TaxType::Local, TaxType::Other] {
            assert_eq!(
                tax_type.workflow(),
                &[TaxStatus::PaymentScheduled, TaxStatus::PaymentCompleted]
            );
            assert_eq!(tax_type.initial_status(), TaxStatus::PaymentScheduled);
        }
    }

    #[test]
    fn test_transition_one_step_each_way() {
        assert!(TaxStatus::can_transition(
            TaxType::Acquisition,
            TaxStatus::AccountingReview,
            TaxStatus::PaymentScheduled
        ));
        assert!(TaxStatus::can_transition(
            TaxType::Acquisition,
            TaxStatus::PaymentScheduled,
            TaxStatus::AccountingReview
        ));
        assert!(TaxStatus::can_transition(
            TaxType::Property,
            TaxStatus::PaymentScheduled,
            TaxStatus::PaymentCompleted
        ));
    }

    #[test]
    fn test_transition_rejects_jumps() {
        // Two steps forward in the acquisition workflow
        assert!(!TaxStatus::can_transition(
            TaxType::Acquisition,
            TaxStatus::AccountingReview,
            TaxStatus::PaymentCompleted
        ));
        // Review does not exist for property tax
        assert!(!TaxStatus::can_transition(
            TaxType::Property,
            TaxStatus::PaymentScheduled,
            TaxStatus::AccountingReview
        ));
        // Self-transition
        assert!(!TaxStatus::can_transition(
            TaxType::Acquisition,
            TaxStatus::PaymentScheduled,
            TaxStatus::PaymentScheduled
        ));
    }

    #[test]
    fn test_type_labels() {
        assert_eq!(TaxType::Acquisition.label(), "취득세");
        assert_eq!(TaxType::Property.label(), "재산세");
        assert_eq!(TaxType::Local.label(), "지방세");
        assert_eq!(TaxType::Other.label(), "기타세");
    }
}
