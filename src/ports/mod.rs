pub mod book_repository;
pub mod clock;
pub mod loan_repository;
pub mod notifier;

pub use book_repository::*;
pub use clock::*;
pub use loan_repository::*;
pub use notifier::*;

/// ポート層の Result型（実装固有のI/Oエラーを保持する）
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 一意性制約付き挿入の結果
///
/// 永続化層が挿入時に制約違反を検出した場合は `Conflict` を返す。
/// チェックと書き込みを原子的に行うのは実装側の責務。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome<T> {
    Inserted(T),
    Conflict,
}
