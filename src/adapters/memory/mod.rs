//! インメモリのリポジトリ実装
//!
//! テストとローカル実行用。検索条件の判定はドメインの述語をそのまま使う。

pub mod book_repository;
pub mod loan_repository;

pub use book_repository::BookRepository as InMemoryBookRepository;
pub use loan_repository::LoanRepository as InMemoryLoanRepository;
