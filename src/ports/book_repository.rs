use crate::domain::{Book, BookFilter, BookId, NewBook, Page, PageRequest};
use async_trait::async_trait;

use super::{InsertOutcome, Result};

/// 書籍リポジトリポート
///
/// カタログの永続化を抽象化する。IDの採番は挿入時に実装側が行う。
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// 書籍を登録する
    ///
    /// 同じISBNの書籍が既に存在する場合は `InsertOutcome::Conflict` を返す。
    async fn insert(&self, book: NewBook) -> Result<InsertOutcome<Book>>;

    /// IDで書籍を取得する
    async fn get_by_id(&self, id: BookId) -> Result<Option<Book>>;

    /// ISBNで書籍を取得する
    async fn get_by_isbn(&self, isbn: &str) -> Result<Option<Book>>;

    /// ISBNが登録済みか確認する
    async fn exists_by_isbn(&self, isbn: &str) -> Result<bool>;

    /// タイトルと著者を更新する
    ///
    /// 対象が存在しない場合は `None` を返す。
    async fn update(&self, book: &Book) -> Result<Option<Book>>;

    /// 書籍を削除する
    ///
    /// 削除した場合は `true`、存在しなかった場合は `false`。
    /// 貸出から参照されていないことは呼び出し側（カタログ）が確認する。
    /// PostgreSQL実装では外部キーが参照中の削除をエラーにする。
    async fn delete(&self, id: BookId) -> Result<bool>;

    /// 条件に一致する書籍をページ単位で検索する
    ///
    /// 空でない各フィールドに対して大文字小文字を区別しない部分一致（AND）。
    /// `Page::total` は一致した全件数。
    async fn find(&self, filter: &BookFilter, page: PageRequest) -> Result<Page<Book>>;
}
