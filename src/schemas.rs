//! Shapes of the three accepted submissions.
//!
//! Serde gives each payload its typed shape, garde carries the field
//! constraints. A failed validation reports every violated rule at once
//! rather than stopping at the first.

use garde::{Report, Validate};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const ORDER_COLLECTION: &str = "order";
pub const MESSAGE_COLLECTION: &str = "message";
pub const AFFILIATE_COLLECTION: &str = "affiliate";

/// One line of an order. Quantity falls back to 1 when the form omits it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItem {
    #[garde(skip)]
    pub name: String,
    #[garde(range(min = 0.0))]
    pub price: f64,
    #[serde(default = "default_quantity")]
    #[garde(range(min = 1))]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Order {
    #[garde(length(min = 1))]
    pub customer_name: String,
    #[garde(email)]
    pub customer_email: String,
    #[garde(skip)]
    pub plan: String,
    #[serde(default)]
    #[garde(dive)]
    pub items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub notes: Option<String>,
}

/// Contact-form submission. The body keeps its original wire name `message`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Message {
    #[garde(skip)]
    pub name: String,
    #[garde(email)]
    pub email: String,
    #[garde(skip)]
    pub subject: String,
    #[garde(skip)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Affiliate {
    #[garde(skip)]
    pub name: String,
    #[garde(email)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub audience: Option<String>,
}

/// Acknowledgment for a persisted submission.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
    pub status: &'static str,
}

impl CreatedResponse {
    pub fn new(id: String) -> Self {
        Self {
            id,
            status: "created",
        }
    }
}

/// Runs the field constraints, flattening the full report so the response
/// names every offending field.
pub fn validate<T>(value: &T) -> Result<(), AppError>
where
    T: Validate,
    T::Context: Default,
{
    value
        .validate()
        .map_err(|report| AppError::Validation(flatten_report(&report)))
}

fn flatten_report(report: &Report) -> String {
    report
        .iter()
        .map(|(path, error)| {
            let path = path.to_string();
            if path.is_empty() {
                error.message().to_string()
            } else {
                format!("{path}: {}", error.message())
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
