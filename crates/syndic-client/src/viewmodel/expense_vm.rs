//! Expenses screen: list, summary and the add/edit form

use tokio::sync::mpsc;

use syndic_core::domain::{Actor, Expense, ExpenseSummary, ExpenseType, ExpenseUpdate, NewExpense};
use syndic_core::domain::schedule::{format_date, parse_date};
use syndic_shared::utils::non_empty;

use super::{parse_amount, spawn_scoped};
use crate::context::AppContext;
use crate::events::{AppEvent, Outcome};
use crate::i18n::{Translator, UserMessage};

pub struct ExpenseViewModel {
    pub expenses: Vec<Expense>,
    pub summary: ExpenseSummary,

    pub expense_type: ExpenseType,
    pub amount: String,
    pub date: String,
    pub description: String,
    /// Id of the expense being edited; `None` adds a new one.
    pub editing: Option<String>,

    pub error: Option<String>,
    pub is_loading: bool,
    ctx: AppContext,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl ExpenseViewModel {
    pub fn new(ctx: AppContext, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            expenses: Vec::new(),
            summary: ExpenseSummary::default(),
            expense_type: ExpenseType::Other,
            amount: String::new(),
            date: format_date(chrono::Local::now().date_naive()),
            description: String::new(),
            editing: None,
            error: None,
            is_loading: false,
            ctx,
            event_tx,
        }
    }

    pub fn refresh(&mut self, actor: &Actor) {
        let Some(apartment_id) = actor.apartment_id.clone() else {
            return;
        };
        self.is_loading = true;
        let expenses = self.ctx.expenses.clone();
        let actor = actor.clone();
        spawn_scoped(
            &self.ctx,
            &self.event_tx,
            async move {
                let mut list = expenses.get_apartment_expenses(&actor, &apartment_id).await?;
                // Newest expense date first; unparseable dates last.
                list.sort_by_key(|e| std::cmp::Reverse(parse_date(&e.date).ok()));
                let summary = ExpenseSummary::from_expenses(&list);
                Ok((list, summary))
            },
            AppEvent::ExpensesLoaded,
        );
    }

    pub fn on_loaded(&mut self, result: &Outcome<(Vec<Expense>, ExpenseSummary)>, translator: &Translator) {
        self.is_loading = false;
        match result {
            Ok((expenses, summary)) => {
                self.error = None;
                self.expenses = expenses.clone();
                self.summary = summary.clone();
            }
            Err(e) => self.error = Some(e.user_message(translator)),
        }
    }

    pub fn start_edit(&mut self, expense: &Expense) {
        self.editing = Some(expense.id.clone());
        self.expense_type = expense.expense_type;
        self.amount = expense.amount.to_string();
        self.date = expense.date.clone();
        self.description = expense.description.clone().unwrap_or_default();
        self.error = None;
    }

    pub fn submit(&mut self, actor: &Actor, translator: &Translator) {
        let Some(apartment_id) = actor.apartment_id.clone() else {
            return;
        };
        if self.is_loading {
            return;
        }
        let amount = match parse_amount(&self.amount, "Amount") {
            Ok(amount) => amount,
            Err(e) => {
                self.error = Some(e.user_message(translator));
                return;
            }
        };

        self.error = None;
        self.is_loading = true;
        let expenses = self.ctx.expenses.clone();
        let actor = actor.clone();
        match self.editing.clone() {
            Some(expense_id) => {
                let update = ExpenseUpdate {
                    expense_type: Some(self.expense_type),
                    amount: Some(amount),
                    date: Some(self.date.clone()),
                    description: Some(self.description.clone()),
                };
                spawn_scoped(
                    &self.ctx,
                    &self.event_tx,
                    async move { expenses.update_expense(&actor, &apartment_id, &expense_id, update).await },
                    AppEvent::ExpenseSaved,
                );
            }
            None => {
                let form = NewExpense {
                    expense_type: self.expense_type,
                    amount,
                    date: self.date.clone(),
                    description: non_empty(Some(self.description.clone())),
                };
                spawn_scoped(
                    &self.ctx,
                    &self.event_tx,
                    async move { expenses.add_expense(&actor, &apartment_id, form).await },
                    AppEvent::ExpenseSaved,
                );
            }
        }
    }

    pub fn on_saved(&mut self, result: &Outcome<Expense>, translator: &Translator) {
        self.is_loading = false;
        match result {
            Ok(expense) => {
                match self.expenses.iter_mut().find(|e| e.id == expense.id) {
                    Some(existing) => *existing = expense.clone(),
                    None => self.expenses.insert(0, expense.clone()),
                }
                self.summary = ExpenseSummary::from_expenses(&self.expenses);
                self.clear_form();
            }
            Err(e) => self.error = Some(e.user_message(translator)),
        }
    }

    pub fn delete(&mut self, actor: &Actor, expense_id: &str) {
        let Some(apartment_id) = actor.apartment_id.clone() else {
            return;
        };
        self.is_loading = true;
        let expenses = self.ctx.expenses.clone();
        let actor = actor.clone();
        let expense_id = expense_id.to_string();
        spawn_scoped(
            &self.ctx,
            &self.event_tx,
            async move {
                expenses.delete_expense(&actor, &apartment_id, &expense_id).await?;
                Ok(expense_id)
            },
            AppEvent::ExpenseDeleted,
        );
    }

    pub fn on_deleted(&mut self, result: &Outcome<String>, translator: &Translator) {
        self.is_loading = false;
        match result {
            Ok(expense_id) => {
                self.error = None;
                self.expenses.retain(|e| &e.id != expense_id);
                self.summary = ExpenseSummary::from_expenses(&self.expenses);
            }
            Err(e) => self.error = Some(e.user_message(translator)),
        }
    }

    pub fn clear_form(&mut self) {
        self.editing = None;
        self.amount.clear();
        self.description.clear();
        self.error = None;
    }
}
