use crate::domain::{BookId, Direction, Loan, LoanFilter, LoanId, NewLoan, Page, PageRequest, is_late_at};
use crate::ports::loan_repository::LoanRepository as LoanRepositoryTrait;
use crate::ports::{InsertOutcome, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct State {
    last_id: i64,
    loans: BTreeMap<LoanId, Loan>,
}

/// LoanRepositoryのインメモリ実装
///
/// 貸出可能性の確認と挿入を同じロック内で行うため、
/// 同じ書籍への同時挿入は1件だけが成功する。
#[derive(Default)]
pub struct LoanRepository {
    state: Mutex<State>,
}

impl LoanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録済みの貸出数
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.loans.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn state(&self) -> Result<MutexGuard<'_, State>> {
        Ok(self.state.lock().map_err(|e| e.to_string())?)
    }

    fn page_of(
        state: &State,
        page: PageRequest,
        predicate: impl Fn(&Loan) -> bool,
    ) -> Page<Loan> {
        let matching = state.loans.values().filter(|l| predicate(*l)).cloned();
        let matching: Vec<Loan> = match page.direction() {
            Direction::Asc => matching.collect(),
            Direction::Desc => matching.rev().collect(),
        };
        Page::slice(matching, page)
    }
}

fn has_unreturned(state: &State, book_id: BookId) -> bool {
    state
        .loans
        .values()
        .any(|l| l.book_id() == book_id && !l.is_returned())
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    async fn insert(&self, loan: NewLoan) -> Result<InsertOutcome<Loan>> {
        let mut state = self.state()?;
        if has_unreturned(&state, loan.book.id) {
            return Ok(InsertOutcome::Conflict);
        }

        state.last_id += 1;
        let loan = loan.with_id(LoanId::new(state.last_id));
        state.loans.insert(loan.id, loan.clone());
        Ok(InsertOutcome::Inserted(loan))
    }

    async fn get_by_id(&self, id: LoanId) -> Result<Option<Loan>> {
        Ok(self.state()?.loans.get(&id).cloned())
    }

    async fn exists_unreturned_for_book(&self, book_id: BookId) -> Result<bool> {
        Ok(has_unreturned(&*self.state()?, book_id))
    }

    async fn update(&self, loan: &Loan) -> Result<Option<Loan>> {
        let mut state = self.state()?;
        Ok(state.loans.get_mut(&loan.id).map(|stored| {
            stored.customer = loan.customer.clone();
            stored.customer_email = loan.customer_email.clone();
            stored.returned = loan.returned;
            stored.clone()
        }))
    }

    async fn find(&self, filter: &LoanFilter, page: PageRequest) -> Result<Page<Loan>> {
        let state = self.state()?;
        Ok(Self::page_of(&state, page, |l| filter.matches(l)))
    }

    async fn find_by_book(&self, book_id: BookId, page: PageRequest) -> Result<Page<Loan>> {
        let state = self.state()?;
        Ok(Self::page_of(&state, page, |l| l.book_id() == book_id))
    }

    async fn find_late(&self, cutoff: NaiveDate) -> Result<Vec<Loan>> {
        Ok(self
            .state()?
            .loans
            .values()
            .filter(|l| is_late_at(l, cutoff))
            .cloned()
            .collect())
    }
}
