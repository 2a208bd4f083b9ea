use crate::domain::{Book, BookFilter, BookId, Direction, NewBook, Page, PageRequest};
use crate::ports::book_repository::BookRepository as BookRepositoryTrait;
use crate::ports::{InsertOutcome, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct State {
    last_id: i64,
    books: BTreeMap<BookId, Book>,
}

/// BookRepositoryのインメモリ実装
///
/// IDは1から順に採番する。ISBNの一意性はロック内で確認する。
#[derive(Default)]
pub struct BookRepository {
    state: Mutex<State>,
}

impl BookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録済みの書籍数
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.books.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn state(&self) -> Result<MutexGuard<'_, State>> {
        Ok(self.state.lock().map_err(|e| e.to_string())?)
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn insert(&self, book: NewBook) -> Result<InsertOutcome<Book>> {
        let mut state = self.state()?;
        if state.books.values().any(|b| b.isbn == book.isbn) {
            return Ok(InsertOutcome::Conflict);
        }

        state.last_id += 1;
        let book = book.with_id(BookId::new(state.last_id));
        state.books.insert(book.id, book.clone());
        Ok(InsertOutcome::Inserted(book))
    }

    async fn get_by_id(&self, id: BookId) -> Result<Option<Book>> {
        Ok(self.state()?.books.get(&id).cloned())
    }

    async fn get_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        Ok(self
            .state()?
            .books
            .values()
            .find(|b| b.isbn == isbn)
            .cloned())
    }

    async fn exists_by_isbn(&self, isbn: &str) -> Result<bool> {
        Ok(self.state()?.books.values().any(|b| b.isbn == isbn))
    }

    async fn update(&self, book: &Book) -> Result<Option<Book>> {
        let mut state = self.state()?;
        Ok(state.books.get_mut(&book.id).map(|stored| {
            stored.title = book.title.clone();
            stored.author = book.author.clone();
            stored.clone()
        }))
    }

    async fn delete(&self, id: BookId) -> Result<bool> {
        Ok(self.state()?.books.remove(&id).is_some())
    }

    async fn find(&self, filter: &BookFilter, page: PageRequest) -> Result<Page<Book>> {
        let state = self.state()?;
        let matching = state.books.values().filter(|b| filter.matches(b)).cloned();
        let matching: Vec<Book> = match page.direction() {
            Direction::Asc => matching.collect(),
            Direction::Desc => matching.rev().collect(),
        };
        Ok(Page::slice(matching, page))
    }
}
