//! Mock credit system limiting how many reports a session may generate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use thiserror::Error;

use super::live_feed::TIMESTAMP_FORMAT;

/// Billing entries shown in the sidebar.
pub const RECENT_BILLING_ENTRIES: usize = 10;

#[derive(Debug, Error, PartialEq)]
pub enum CreditError {
    #[error("Insufficient credits: {remaining:.2} remaining, {required:.2} required per report")]
    Insufficient { remaining: f64, required: f64 },
}

impl From<CreditError> for AppError {
    fn from(err: CreditError) -> Self {
        AppError::PaymentRequired(format!(
            "{}. Credits reset when a new session starts.",
            err
        ))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillingRecord {
    pub question: String,
    pub cost: f64,
    pub recorded_at: DateTime<Utc>,
}

impl BillingRecord {
    pub fn timestamp(&self) -> String {
        self.recorded_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Session credit balance. `remaining` never goes below zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreditLedger {
    pub initial: f64,
    pub used: f64,
    pub remaining: f64,
    pub cost_per_report: f64,
    #[serde(default)]
    pub billing_log: Vec<BillingRecord>,
}

impl CreditLedger {
    pub fn new(initial: f64, cost_per_report: f64) -> Self {
        Self {
            initial: initial.max(0.0),
            used: 0.0,
            remaining: initial.max(0.0),
            cost_per_report,
            billing_log: Vec::new(),
        }
    }

    /// Refuse before any work is done when a report cannot be paid for.
    pub fn ensure_available(&self) -> Result<(), CreditError> {
        if self.remaining <= 0.0 || self.remaining < self.cost_per_report {
            return Err(CreditError::Insufficient {
                remaining: self.remaining,
                required: self.cost_per_report,
            });
        }
        Ok(())
    }

    /// Charge one report. Only called after the report was produced.
    pub fn charge(&mut self, question: &str, now: DateTime<Utc>) -> Result<BillingRecord, CreditError> {
        self.ensure_available()?;

        let record = BillingRecord {
            question: question.to_string(),
            cost: self.cost_per_report,
            recorded_at: now,
        };

        self.used += self.cost_per_report;
        self.remaining = (self.remaining - self.cost_per_report).max(0.0);
        self.billing_log.push(record.clone());

        Ok(record)
    }

    /// Most recent records first.
    pub fn recent_billing(&self) -> Vec<BillingRecord> {
        self.billing_log
            .iter()
            .rev()
            .take(RECENT_BILLING_ENTRIES)
            .cloned()
            .collect()
    }
}
