//! Expense entries, stored as one array document per apartment

use chrono::Utc;
use std::sync::Arc;
use syndic_shared::constants::{COLLECTION_EXPENSES, DEFAULT_MAX_WRITE_ATTEMPTS};
use syndic_shared::new_id;
use syndic_shared::utils::non_empty;
use tracing::info;

use super::gateway::ArrayDocument;
use crate::domain::{Actor, Expense, ExpenseSummary, ExpenseUpdate, NewExpense};
use crate::error::DomainError;
use crate::repositories::DocumentStore;

const FIELD: &str = "expenses";

pub struct ExpenseService<S: DocumentStore + ?Sized> {
    store: Arc<S>,
    max_write_attempts: u32,
}

impl<S: DocumentStore + ?Sized> ExpenseService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }

    pub fn with_max_write_attempts(mut self, attempts: u32) -> Self {
        self.max_write_attempts = attempts;
        self
    }

    fn document(&self) -> ArrayDocument<'_, S> {
        ArrayDocument::new(self.store.as_ref(), COLLECTION_EXPENSES, FIELD, self.max_write_attempts)
    }

    pub async fn add_expense(&self, actor: &Actor, apartment_id: &str, form: NewExpense) -> Result<Expense, DomainError> {
        actor.ensure_manager(apartment_id)?;
        form.check()?;

        let expense = Expense {
            id: new_id(),
            expense_type: form.expense_type,
            amount: form.amount,
            date: form.date.trim().to_string(),
            description: non_empty(form.description),
            created_at: Utc::now(),
            created_by: actor.user_id.clone(),
        };

        let entry = expense.clone();
        self.document()
            .mutate(apartment_id, move |items: &mut Vec<Expense>| {
                items.push(entry.clone());
                Ok(())
            })
            .await?;

        info!("Expense {} ({:.2}) added to {}", expense.id, expense.amount, apartment_id);
        Ok(expense)
    }

    pub async fn get_apartment_expenses(&self, actor: &Actor, apartment_id: &str) -> Result<Vec<Expense>, DomainError> {
        actor.ensure_member(apartment_id)?;
        self.document().load(apartment_id).await
    }

    pub async fn update_expense(
        &self,
        actor: &Actor,
        apartment_id: &str,
        expense_id: &str,
        update: ExpenseUpdate,
    ) -> Result<Expense, DomainError> {
        actor.ensure_manager(apartment_id)?;
        update.check()?;

        let expense = self
            .document()
            .mutate(apartment_id, |items: &mut Vec<Expense>| {
                let expense = items
                    .iter_mut()
                    .find(|e| e.id == expense_id)
                    .ok_or_else(|| DomainError::not_found("Expense"))?;
                update.apply(expense);
                Ok(expense.clone())
            })
            .await?;

        info!("Expense {} updated in {}", expense_id, apartment_id);
        Ok(expense)
    }

    pub async fn delete_expense(&self, actor: &Actor, apartment_id: &str, expense_id: &str) -> Result<(), DomainError> {
        actor.ensure_manager(apartment_id)?;

        self.document()
            .mutate(apartment_id, |items: &mut Vec<Expense>| {
                let before = items.len();
                items.retain(|e| e.id != expense_id);
                if items.len() == before {
                    return Err(DomainError::not_found("Expense"));
                }
                Ok(())
            })
            .await?;

        info!("Expense {} deleted from {}", expense_id, apartment_id);
        Ok(())
    }

    pub async fn expense_summary(&self, actor: &Actor, apartment_id: &str) -> Result<ExpenseSummary, DomainError> {
        let expenses = self.get_apartment_expenses(actor, apartment_id).await?;
        Ok(ExpenseSummary::from_expenses(&expenses))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExpenseType;
    use crate::services::testing::{resident, syndic, FakeStore};

    fn water(amount: f64) -> NewExpense {
        NewExpense {
            expense_type: ExpenseType::Water,
            amount,
            date: "05/03/2024".to_string(),
            description: Some("March bill".to_string()),
        }
    }

    #[tokio::test]
    async fn test_added_expenses_get_distinct_ids() {
        let service = ExpenseService::new(FakeStore::shared());
        let actor = syndic("apt-1");

        let first = service.add_expense(&actor, "apt-1", water(40.0)).await.unwrap();
        let second = service.add_expense(&actor, "apt-1", water(60.0)).await.unwrap();
        assert_ne!(first.id, second.id);

        let listed = service.get_apartment_expenses(&actor, "apt-1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().any(|e| e.id == second.id && e.amount == 60.0));
    }

    #[tokio::test]
    async fn test_update_changes_only_the_amount() {
        let service = ExpenseService::new(FakeStore::shared());
        let actor = syndic("apt-1");
        let created = service.add_expense(&actor, "apt-1", water(40.0)).await.unwrap();

        let update = ExpenseUpdate {
            amount: Some(55.5),
            ..Default::default()
        };
        service.update_expense(&actor, "apt-1", &created.id, update).await.unwrap();

        let listed = service.get_apartment_expenses(&actor, "apt-1").await.unwrap();
        assert_eq!(listed.len(), 1);
        let stored = &listed[0];
        assert_eq!(stored.id, created.id);
        assert_eq!(stored.amount, 55.5);
        assert_eq!(stored.expense_type, created.expense_type);
        assert_eq!(stored.date, created.date);
        assert_eq!(stored.description, created.description);
        assert_eq!(stored.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_invalid_amount_never_reaches_the_store() {
        let store = FakeStore::shared();
        let service = ExpenseService::new(store.clone());

        let err = service.add_expense(&syndic("apt-1"), "apt-1", water(0.0)).await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
        assert_eq!(store.revision(COLLECTION_EXPENSES, "apt-1"), None);
    }

    #[tokio::test]
    async fn test_residents_can_read_but_not_write() {
        let service = ExpenseService::new(FakeStore::shared());
        let reader = resident("apt-1");

        let err = service.add_expense(&reader, "apt-1", water(10.0)).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert!(service.get_apartment_expenses(&reader, "apt-1").await.unwrap().is_empty());
        assert!(service.get_apartment_expenses(&reader, "apt-2").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_and_summary() {
        let service = ExpenseService::new(FakeStore::shared());
        let actor = syndic("apt-1");
        let a = service.add_expense(&actor, "apt-1", water(40.0)).await.unwrap();
        let mut power = water(25.0);
        power.expense_type = ExpenseType::Electricity;
        service.add_expense(&actor, "apt-1", power).await.unwrap();
        service.add_expense(&actor, "apt-1", water(10.0)).await.unwrap();

        service.delete_expense(&actor, "apt-1", &a.id).await.unwrap();
        let err = service.delete_expense(&actor, "apt-1", &a.id).await.unwrap_err();
        assert_eq!(err, DomainError::not_found("Expense"));

        let summary = service.expense_summary(&actor, "apt-1").await.unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total, 35.0);
        assert_eq!(summary.by_type.get(&ExpenseType::Water), Some(&10.0));
    }
}
