// ============================================================================
// Syndic Core - Expense Entity
// File: crates/syndic-core/src/domain/expense.rs
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use super::schedule::parse_date;
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseType {
    Electricity,
    Water,
    Elevator,
    Security,
    Clean,
    Other,
}

impl ExpenseType {
    pub const ALL: [ExpenseType; 6] = [
        ExpenseType::Electricity,
        ExpenseType::Water,
        ExpenseType::Elevator,
        ExpenseType::Security,
        ExpenseType::Clean,
        ExpenseType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseType::Electricity => "electricity",
            ExpenseType::Water => "water",
            ExpenseType::Elevator => "elevator",
            ExpenseType::Security => "security",
            ExpenseType::Clean => "clean",
            ExpenseType::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s.to_lowercase())
    }
}

/// Expense entry stored in the apartment's expense array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
    pub amount: f64,
    pub date: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

#[derive(Debug, Clone, Validate)]
pub struct NewExpense {
    pub expense_type: ExpenseType,

    #[validate(range(exclusive_min = 0.0, message = "Amount must be greater than zero"))]
    pub amount: f64,

    pub date: String,

    #[validate(length(max = 500, message = "Description is too long"))]
    pub description: Option<String>,
}

impl NewExpense {
    pub fn check(&self) -> Result<(), DomainError> {
        self.validate()?;
        parse_date(&self.date)?;
        Ok(())
    }
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Validate)]
pub struct ExpenseUpdate {
    pub expense_type: Option<ExpenseType>,

    #[validate(range(exclusive_min = 0.0, message = "Amount must be greater than zero"))]
    pub amount: Option<f64>,

    pub date: Option<String>,

    #[validate(length(max = 500, message = "Description is too long"))]
    pub description: Option<String>,
}

impl ExpenseUpdate {
    pub fn check(&self) -> Result<(), DomainError> {
        self.validate()?;
        if let Some(date) = &self.date {
            parse_date(date)?;
        }
        Ok(())
    }

    pub fn apply(&self, expense: &mut Expense) {
        if let Some(expense_type) = self.expense_type {
            expense.expense_type = expense_type;
        }
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(date) = &self.date {
            expense.date = date.trim().to_string();
        }
        if let Some(description) = &self.description {
            expense.description = syndic_shared::utils::non_empty(Some(description.clone()));
        }
    }
}

/// Totals for the dashboard
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseSummary {
    pub total: f64,
    pub count: usize,
    pub by_type: BTreeMap<ExpenseType, f64>,
}

impl ExpenseSummary {
    pub fn from_expenses(expenses: &[Expense]) -> Self {
        let mut summary = ExpenseSummary::default();
        for expense in expenses {
            summary.total += expense.amount;
            summary.count += 1;
            *summary.by_type.entry(expense.expense_type).or_insert(0.0) += expense.amount;
        }
        summary
    }
}
