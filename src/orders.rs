//! Orders
//!
//! The draft behind the order form, the payload submitted for it, and how the
//! server's answer is shown to the user.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{discounts::OrderDiscount, products::VariantId};

/// Message shown when the server rejects individual form fields.
pub const FIELD_ERRORS_MESSAGE: &str = "Some fields weren't filled";

/// Quantity of one variant in a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftLine {
    /// Variant ordered
    pub variant: VariantId,

    /// Quantity ordered
    pub quantity: u32,
}

/// Everything entered in the order form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    /// Quantities per variant
    #[serde(default)]
    pub lines: Vec<DraftLine>,

    /// Order discount
    #[serde(default)]
    pub discount: OrderDiscount,

    /// Free-text note
    #[serde(default)]
    pub note: String,

    /// Customer the order is placed for
    #[serde(default)]
    pub customer: Option<u64>,
}

impl OrderDraft {
    /// Set the quantity of a variant, replacing any lines it already has.
    pub fn set_quantity(&mut self, variant: VariantId, quantity: u32) {
        self.lines.retain(|line| line.variant != variant);
        self.lines.push(DraftLine { variant, quantity });
    }

    /// Quantity of a variant across all of its lines; zero when it is not in the draft.
    pub fn quantity(&self, variant: VariantId) -> u32 {
        self.lines
            .iter()
            .filter(|line| line.variant == variant)
            .fold(0, |total, line| total.saturating_add(line.quantity))
    }

    /// Lines with a non-zero quantity, ordered by variant.
    ///
    /// Repeated entries for one variant are merged into a single line.
    pub fn ordered_lines(&self) -> Vec<DraftLine> {
        let mut quantities: BTreeMap<VariantId, u32> = BTreeMap::new();

        for line in self.lines.iter().filter(|line| line.quantity > 0) {
            let quantity = quantities.entry(line.variant).or_default();
            *quantity = quantity.saturating_add(line.quantity);
        }

        quantities
            .into_iter()
            .map(|(variant, quantity)| DraftLine { variant, quantity })
            .collect()
    }

    /// Build the payload submitted for this draft.
    pub fn submission(&self) -> OrderSubmission {
        OrderSubmission {
            lines: self.ordered_lines(),
            discount: self.discount.clone(),
            note: self.note.clone(),
            customer: self.customer,
            shipping: Fulfilment::NOT_REQUIRED,
            billing: Fulfilment::NOT_REQUIRED,
        }
    }
}

/// Shipping or billing section of a submission. Orders created from the
/// dashboard never collect either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fulfilment {
    /// Whether the section has to be filled in
    pub required: bool,
}

impl Fulfilment {
    /// The section is not needed for this order.
    pub const NOT_REQUIRED: Self = Self { required: false };
}

/// JSON payload posted when the order form is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSubmission {
    /// Variants ordered with a quantity above zero
    pub lines: Vec<DraftLine>,

    /// Discount as entered
    pub discount: OrderDiscount,

    /// Free-text note
    pub note: String,

    /// Customer the order is placed for
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub customer: Option<u64>,

    /// Shipping placeholder
    pub shipping: Fulfilment,

    /// Billing placeholder
    pub billing: Fulfilment,
}

impl OrderSubmission {
    /// Encode the payload as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// What happened to a submitted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The order was created; the browser should go to this location.
    Redirect(String),

    /// The server rejected some fields.
    FieldErrors(Vec<String>),

    /// Any other failure.
    Failed {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },
}

impl SubmissionOutcome {
    /// Classify the server's response to a submission.
    pub fn classify(status: u16, body: &str) -> Self {
        let payload: Option<Value> = serde_json::from_str(body).ok();
        let success = (200..300).contains(&status);

        if success {
            if let Some(location) = payload
                .as_ref()
                .and_then(|payload| payload.get("location"))
                .and_then(Value::as_str)
            {
                debug!(status, location, "order created");

                return SubmissionOutcome::Redirect(location.to_owned());
            }
        } else if let Some(fields) = payload.as_ref().and_then(field_errors) {
            warn!(status, ?fields, "order rejected with field errors");

            return SubmissionOutcome::FieldErrors(fields);
        }

        warn!(status, "order submission failed");

        SubmissionOutcome::Failed {
            status,
            body: body.to_owned(),
        }
    }

    /// Whether the order was created.
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Redirect(_))
    }

    /// Text shown to the user.
    pub fn message(&self) -> String {
        match self {
            SubmissionOutcome::Redirect(location) => location.clone(),
            SubmissionOutcome::FieldErrors(_) => FIELD_ERRORS_MESSAGE.to_owned(),
            SubmissionOutcome::Failed { status, body } => format!("{status} {body}"),
        }
    }
}

/// Names of the rejected fields, if the payload carries a non-empty `errors` entry.
fn field_errors(payload: &Value) -> Option<Vec<String>> {
    let fields: Vec<String> = match payload.get("errors")? {
        Value::Object(errors) => errors.keys().cloned().collect(),
        Value::Array(errors) => errors
            .iter()
            .map(|error| match error {
                Value::String(field) => field.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => return None,
    };

    if fields.is_empty() { None } else { Some(fields) }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::discounts::DiscountKind;

    fn draft() -> OrderDraft {
        let mut draft = OrderDraft {
            discount: OrderDiscount::new(DiscountKind::Percentage, "10.00"),
            note: "Deliver after 5pm".to_owned(),
            ..OrderDraft::default()
        };

        draft.set_quantity(VariantId(20), 1);
        draft.set_quantity(VariantId(10), 2);
        draft.set_quantity(VariantId(11), 0);

        draft
    }

    #[test]
    fn set_quantity_updates_existing_line() {
        let mut draft = draft();

        draft.set_quantity(VariantId(10), 5);

        assert_eq!(draft.quantity(VariantId(10)), 5);
        assert_eq!(draft.quantity(VariantId(99)), 0);
        assert_eq!(draft.lines.len(), 3);
    }

    #[test]
    fn submission_skips_empty_lines() {
        let submission = draft().submission();

        assert_eq!(
            submission.lines,
            [
                DraftLine {
                    variant: VariantId(10),
                    quantity: 2,
                },
                DraftLine {
                    variant: VariantId(20),
                    quantity: 1,
                },
            ]
        );
        assert_eq!(submission.shipping, Fulfilment::NOT_REQUIRED);
        assert_eq!(submission.billing, Fulfilment::NOT_REQUIRED);
    }

    #[test]
    fn repeated_variants_merge_into_one_line() {
        let mut draft = OrderDraft {
            lines: vec![
                DraftLine {
                    variant: VariantId(10),
                    quantity: 2,
                },
                DraftLine {
                    variant: VariantId(20),
                    quantity: 1,
                },
                DraftLine {
                    variant: VariantId(10),
                    quantity: 3,
                },
            ],
            ..OrderDraft::default()
        };

        assert_eq!(
            draft.ordered_lines(),
            [
                DraftLine {
                    variant: VariantId(10),
                    quantity: 5,
                },
                DraftLine {
                    variant: VariantId(20),
                    quantity: 1,
                },
            ]
        );
        assert_eq!(draft.quantity(VariantId(10)), 5);

        draft.set_quantity(VariantId(10), 1);

        assert_eq!(draft.quantity(VariantId(10)), 1);
        assert_eq!(draft.lines.len(), 2);
    }

    #[test]
    fn submission_json_omits_missing_customer() -> TestResult {
        let json: Value = serde_json::from_str(&draft().submission().to_json()?)?;

        assert_eq!(json["lines"][0]["variant"], 10);
        assert_eq!(json["lines"][0]["quantity"], 2);
        assert_eq!(json["discount"]["type"], "percentage");
        assert_eq!(json["discount"]["value"], "10.00");
        assert_eq!(json["note"], "Deliver after 5pm");
        assert_eq!(json["shipping"]["required"], false);
        assert!(json.get("customer").is_none());

        Ok(())
    }

    #[test]
    fn submission_json_includes_customer() -> TestResult {
        let mut draft = draft();
        draft.customer = Some(42);

        let json: Value = serde_json::from_str(&draft.submission().to_json()?)?;

        assert_eq!(json["customer"], 42);

        Ok(())
    }

    #[test]
    fn success_with_location_redirects() {
        let outcome = SubmissionOutcome::classify(201, r#"{"location": "/dashboard/orders/7/"}"#);

        assert_eq!(
            outcome,
            SubmissionOutcome::Redirect("/dashboard/orders/7/".to_owned())
        );
        assert!(outcome.is_success());
        assert_eq!(outcome.message(), "/dashboard/orders/7/");
    }

    #[test]
    fn field_errors_collapse_to_generic_message() {
        let outcome = SubmissionOutcome::classify(
            400,
            r#"{"errors": {"note": ["required"], "lines": ["empty"]}}"#,
        );

        assert_eq!(
            outcome,
            SubmissionOutcome::FieldErrors(vec!["lines".to_owned(), "note".to_owned()])
        );
        assert_eq!(outcome.message(), FIELD_ERRORS_MESSAGE);
        assert!(!outcome.is_success());
    }

    #[test]
    fn field_error_list_is_accepted() {
        let outcome = SubmissionOutcome::classify(400, r#"{"errors": ["customer"]}"#);

        assert_eq!(
            outcome,
            SubmissionOutcome::FieldErrors(vec!["customer".to_owned()])
        );
    }

    #[test]
    fn other_failures_show_status_and_body() {
        let outcome = SubmissionOutcome::classify(500, "Internal Server Error");

        assert_eq!(
            outcome,
            SubmissionOutcome::Failed {
                status: 500,
                body: "Internal Server Error".to_owned(),
            }
        );
        assert_eq!(outcome.message(), "500 Internal Server Error");
    }

    #[test]
    fn empty_error_list_is_a_plain_failure() {
        let outcome = SubmissionOutcome::classify(400, r#"{"errors": {}}"#);

        assert!(matches!(outcome, SubmissionOutcome::Failed { status: 400, .. }));
    }

    #[test]
    fn success_without_location_is_a_failure() {
        let outcome = SubmissionOutcome::classify(200, "{}");

        assert!(matches!(outcome, SubmissionOutcome::Failed { status: 200, .. }));
    }
}
