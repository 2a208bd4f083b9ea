use serde::{Deserialize, Serialize};

use super::BookId;

/// 書籍 - カタログに登録済みの1冊
///
/// `isbn` はカタログ全体で一意な自然キー。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
}

/// 未登録の書籍（IDは永続化層が採番する）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
}

impl NewBook {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
        }
    }

    /// 採番されたIDを付与して登録済みの書籍にする
    pub fn with_id(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            isbn: self.isbn,
        }
    }
}

/// 書籍検索の条件
///
/// 空でないフィールドすべてに対して、大文字小文字を区別しない部分一致で絞り込む。
/// 未指定または空文字のフィールドは条件に含めない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookFilter {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
}

impl BookFilter {
    pub fn title(&self) -> Option<&str> {
        non_empty(&self.title)
    }

    pub fn author(&self) -> Option<&str> {
        non_empty(&self.author)
    }

    pub fn isbn(&self) -> Option<&str> {
        non_empty(&self.isbn)
    }

    /// 書籍が条件に一致するか
    pub fn matches(&self, book: &Book) -> bool {
        contains_ignore_case(&book.title, self.title())
            && contains_ignore_case(&book.author, self.author())
            && contains_ignore_case(&book.isbn, self.isbn())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn contains_ignore_case(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> Book {
        NewBook::new("As Aventuras", "Arthur", "001").with_id(BookId::new(1))
    }

    #[test]
    fn test_empty_filter_matches_any_book() {
        assert!(BookFilter::default().matches(&book()));
    }

    #[test]
    fn test_filter_matches_substring_ignoring_case() {
        let filter = BookFilter {
            title: Some("aventu".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&book()));
    }

    #[test]
    fn test_filter_requires_every_given_field() {
        let filter = BookFilter {
            title: Some("aventuras".to_string()),
            author: Some("fulano".to_string()),
            isbn: None,
        };
        assert!(!filter.matches(&book()));
    }

    #[test]
    fn test_filter_ignores_empty_strings() {
        let filter = BookFilter {
            title: Some(String::new()),
            author: Some("ART".to_string()),
            isbn: Some(String::new()),
        };
        assert!(filter.matches(&book()));
    }
}
