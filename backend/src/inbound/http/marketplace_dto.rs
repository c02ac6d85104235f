//! Response payloads shared by the commission and bid handlers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Bid, Commission, Consent};

/// Recorded halves of a pending completion or mutual cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsentResponse {
    pub customer: bool,
    pub artist: bool,
}

impl From<Consent> for ConsentResponse {
    fn from(value: Consent) -> Self {
        Self {
            customer: value.customer,
            artist: value.artist,
        }
    }
}

/// Commission as seen by clients. Budgets are in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionResponse {
    #[schema(example = "7b4b3f1e-2d0c-4a8e-9f57-4c1f8f1d2a10")]
    pub id: String,
    pub customer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<String>,
    #[schema(example = "Portrait of my cat")]
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_min: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_max: Option<u64>,
    /// Calendar date, `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[schema(example = "open")]
    pub status: String,
    pub consent: ConsentResponse,
    pub revision: u32,
    pub created_at: String,
}

impl From<Commission> for CommissionResponse {
    fn from(value: Commission) -> Self {
        let details = value.details();
        let budget = details.budget();
        Self {
            id: value.id().to_string(),
            customer_id: value.customer_id().to_string(),
            artist_id: value.artist_id().map(ToString::to_string),
            title: details.title().to_owned(),
            description: details.description().to_owned(),
            category: details.category().map(|c| c.as_ref().to_owned()),
            budget_min: budget.min(),
            budget_max: budget.max(),
            deadline: details.deadline().map(|d| d.format("%Y-%m-%d").to_string()),
            status: value.status().as_str().to_owned(),
            consent: value.consent().into(),
            revision: value.revision(),
            created_at: value.created_at().to_rfc3339(),
        }
    }
}

/// Bid as seen by clients. Amounts are in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BidResponse {
    pub id: String,
    pub commission_id: String,
    pub artist_id: String,
    #[schema(example = 6000)]
    pub amount: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[schema(example = "pending")]
    pub status: String,
    pub created_at: String,
}

impl From<Bid> for BidResponse {
    fn from(value: Bid) -> Self {
        let terms = value.terms();
        Self {
            id: value.id().to_string(),
            commission_id: value.commission_id().to_string(),
            artist_id: value.artist_id().to_string(),
            amount: terms.amount.get(),
            estimated_days: terms.estimated_days.map(|days| days.get()),
            message: terms.message.as_ref().map(|m| m.as_ref().to_owned()),
            status: value.status().as_str().to_owned(),
            created_at: value.created_at().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use rstest::rstest;
    use serde_json::{Value, json};
    use uuid::Uuid;

    use super::*;
    use crate::domain::{BidTerms, CommissionDetails, CommissionDetailsDraft, UserId};

    fn commission() -> Commission {
        let created = Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).single().expect("timestamp");
        let details = CommissionDetails::new(
            CommissionDetailsDraft {
                title: "Cat portrait".to_owned(),
                description: "Oil on canvas".to_owned(),
                category: None,
                budget_min: Some(5_000),
                budget_max: None,
                deadline: NaiveDate::from_ymd_opt(2026, 12, 24),
            },
            created.date_naive(),
        )
        .expect("valid details");
        Commission::open(Uuid::nil(), UserId::random(), details, created)
    }

    #[rstest]
    fn commission_json_omits_absent_fields() {
        let body = serde_json::to_value(CommissionResponse::from(commission())).expect("json");

        assert_eq!(body["status"], json!("open"));
        assert_eq!(body["deadline"], json!("2026-12-24"));
        assert_eq!(body["budgetMin"], json!(5_000));
        assert_eq!(body["consent"], json!({"customer": false, "artist": false}));
        assert!(body.get("artistId").is_none());
        assert!(body.get("budgetMax").is_none());
        assert!(body.get("category").is_none());
    }

    #[rstest]
    fn bid_json_carries_terms() {
        let commission = commission();
        let bid = Bid::pending(
            Uuid::new_v4(),
            commission.id(),
            UserId::random(),
            BidTerms::new(6_000, Some(10), Some("Happy to")).expect("terms"),
            commission.created_at(),
        );

        let body = serde_json::to_value(BidResponse::from(bid)).expect("json");

        assert_eq!(body["amount"], json!(6_000));
        assert_eq!(body["estimatedDays"], json!(10));
        assert_eq!(body["status"], json!("pending"));
        assert_eq!(
            body["commissionId"].as_str(),
            Some(Uuid::nil().to_string().as_str())
        );
        assert!(matches!(body["message"], Value::String(_)));
    }
}
