//! Request payloads accepted by the simulation control API.
//!
//! The dashboard posts its form values verbatim, so every numeric field may
//! arrive either as a JSON number or as a decimal string. [`NumericField`]
//! captures both shapes and defers validation to the conversion methods,
//! which report the offending field by its wire name.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A single form field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} {reason}")]
pub struct FieldError {
    /// Wire name of the field (camelCase).
    pub field: &'static str,
    /// Human-readable description of the problem.
    pub reason: String,
}

impl FieldError {
    /// Build an error for the named wire field.
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// A count supplied either as a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    /// A JSON number (`5`).
    Number(serde_json::Number),
    /// A JSON string holding a number (`"5"`).
    Text(String),
}

impl NumericField {
    /// Interpret the field as a strictly positive `u32`.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] naming `field` when the value is negative,
    /// fractional, zero, non-numeric, or larger than `u32::MAX`.
    pub fn to_count(&self, field: &'static str) -> Result<u32, FieldError> {
        let raw = match self {
            Self::Number(n) => n
                .as_u64()
                .ok_or_else(|| FieldError::new(field, "must be a positive whole number"))?,
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(FieldError::new(field, "is required"));
                }
                trimmed
                    .parse::<u64>()
                    .map_err(|_err| FieldError::new(field, "must be a positive whole number"))?
            }
        };

        if raw == 0 {
            return Err(FieldError::new(field, "must be greater than zero"));
        }

        u32::try_from(raw).map_err(|_err| FieldError::new(field, "is too large"))
    }
}

fn required(value: Option<&NumericField>, field: &'static str) -> Result<u32, FieldError> {
    value
        .ok_or_else(|| FieldError::new(field, "is required"))?
        .to_count(field)
}

/// Body of `POST /api/v1/simulating/start`.
///
/// Field aliases accept the names used by the original console client
/// (`ticketReleaseRate`, `customerRetrievalRate`, `maxTicketCapacity`).
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StartRequest {
    /// Lifetime cap on tickets released during the run.
    #[serde(default)]
    #[ts(type = "number | string | null")]
    pub total_tickets: Option<NumericField>,

    /// Tickets per second released by each vendor.
    #[serde(default, alias = "ticketReleaseRate")]
    #[ts(type = "number | string | null")]
    pub release_rate: Option<NumericField>,

    /// Tickets per second retrieved by each customer.
    #[serde(default, alias = "customerRetrievalRate", alias = "consumerRetrievalRate")]
    #[ts(type = "number | string | null")]
    pub retrieval_rate: Option<NumericField>,

    /// Maximum number of tickets held in the pool at once.
    #[serde(default, alias = "maxTicketCapacity")]
    #[ts(type = "number | string | null")]
    pub max_capacity: Option<NumericField>,
}

impl StartRequest {
    /// Validate every field and produce a [`RunConfig`].
    ///
    /// # Errors
    ///
    /// Returns the first [`FieldError`] encountered, in form order.
    pub fn into_run_config(self) -> Result<RunConfig, FieldError> {
        Ok(RunConfig {
            total_tickets: required(self.total_tickets.as_ref(), "totalTickets")?,
            release_rate: required(self.release_rate.as_ref(), "releaseRate")?,
            retrieval_rate: required(self.retrieval_rate.as_ref(), "retrievalRate")?,
            max_capacity: required(self.max_capacity.as_ref(), "maxCapacity")?,
        })
    }
}

/// Validated parameters for one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct RunConfig {
    /// Lifetime cap on tickets released during the run.
    pub total_tickets: u32,
    /// Tickets per second released by each vendor.
    pub release_rate: u32,
    /// Tickets per second retrieved by each customer.
    pub retrieval_rate: u32,
    /// Maximum number of tickets held in the pool at once.
    pub max_capacity: u32,
}

impl RunConfig {
    /// Check that every field is positive.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] for the first zero field.
    pub fn validate(&self) -> Result<(), FieldError> {
        let fields = [
            ("totalTickets", self.total_tickets),
            ("releaseRate", self.release_rate),
            ("retrievalRate", self.retrieval_rate),
            ("maxCapacity", self.max_capacity),
        ];
        for (field, value) in fields {
            if value == 0 {
                return Err(FieldError::new(field, "must be greater than zero"));
            }
        }
        Ok(())
    }
}

/// Body of `PUT /api/v1/simulating/updateConfig`.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct UpdateRatesRequest {
    /// New per-vendor release rate, if changing.
    #[serde(default, alias = "ticketReleaseRate")]
    #[ts(type = "number | string | null")]
    pub release_rate: Option<NumericField>,

    /// New per-customer retrieval rate, if changing.
    #[serde(default, alias = "customerRetrievalRate", alias = "consumerRetrievalRate")]
    #[ts(type = "number | string | null")]
    pub retrieval_rate: Option<NumericField>,
}

/// A validated partial rate change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateUpdate {
    /// New release rate, or `None` to keep the current one.
    pub release_rate: Option<u32>,
    /// New retrieval rate, or `None` to keep the current one.
    pub retrieval_rate: Option<u32>,
}

impl UpdateRatesRequest {
    /// Validate the supplied rates.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] if a supplied rate is not a positive count,
    /// or if neither rate is present.
    pub fn into_rate_update(self) -> Result<RateUpdate, FieldError> {
        if self.release_rate.is_none() && self.retrieval_rate.is_none() {
            return Err(FieldError::new(
                "releaseRate",
                "or retrievalRate must be supplied",
            ));
        }
        Ok(RateUpdate {
            release_rate: self
                .release_rate
                .map(|v| v.to_count("releaseRate"))
                .transpose()?,
            retrieval_rate: self
                .retrieval_rate
                .map(|v| v.to_count("retrievalRate"))
                .transpose()?,
        })
    }
}
