use rusty_library_loans::application::book::{
    CatalogError, create_book, delete_book, find_books, get_book_by_id, get_book_by_isbn,
    update_book,
};
use rusty_library_loans::application::loan::{save_loan, update_loan};
use rusty_library_loans::domain::{Book, BookFilter, BookId, NewBook, NewLoan, PageRequest};

mod common;

use common::{register_book, setup, today};

#[tokio::test]
async fn test_create_book_assigns_id() {
    let ctx = setup();

    let book = create_book(&ctx.deps, NewBook::new("As aventuras", "Arthur", "001"))
        .await
        .unwrap();

    assert!(book.id.is_assigned());
    assert_eq!(book.isbn, "001");
    assert_eq!(
        get_book_by_id(&ctx.deps, book.id).await.unwrap(),
        Some(book)
    );
}

#[tokio::test]
async fn test_create_book_with_duplicate_isbn_fails() {
    let ctx = setup();
    create_book(&ctx.deps, NewBook::new("As aventuras", "Arthur", "001"))
        .await
        .unwrap();

    let result = create_book(&ctx.deps, NewBook::new("Outro livro", "Fulano", "001")).await;

    assert!(matches!(result, Err(CatalogError::DuplicateIsbn(isbn)) if isbn == "001"));
    assert_eq!(ctx.books.len(), 1);
}

#[tokio::test]
async fn test_get_book_by_isbn() {
    let ctx = setup();
    let book = register_book(&ctx, "As aventuras", "Arthur", "001").await;

    assert_eq!(
        get_book_by_isbn(&ctx.deps, "001").await.unwrap(),
        Some(book)
    );
    assert_eq!(get_book_by_isbn(&ctx.deps, "999").await.unwrap(), None);
}

#[tokio::test]
async fn test_get_unknown_book_returns_none() {
    let ctx = setup();

    assert_eq!(
        get_book_by_id(&ctx.deps, BookId::new(42)).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_update_book() {
    let ctx = setup();
    let book = register_book(&ctx, "As aventuras", "Arthur", "001").await;

    let changed = Book {
        title: "Novas aventuras".to_string(),
        ..book.clone()
    };
    let updated = update_book(&ctx.deps, &changed).await.unwrap();

    assert_eq!(updated, Some(changed.clone()));
    assert_eq!(
        get_book_by_id(&ctx.deps, book.id).await.unwrap(),
        Some(changed)
    );
}

#[tokio::test]
async fn test_update_book_without_id_is_rejected() {
    let ctx = setup();
    let book = register_book(&ctx, "As aventuras", "Arthur", "001").await;

    for id in [0, -1] {
        let unsaved = Book {
            id: BookId::new(id),
            title: "Outro".to_string(),
            ..book.clone()
        };

        let result = update_book(&ctx.deps, &unsaved).await;

        assert!(matches!(result, Err(CatalogError::InvalidArgument(_))));
    }
    // 保存済みの書籍は変わらない
    assert_eq!(
        get_book_by_id(&ctx.deps, book.id).await.unwrap(),
        Some(book)
    );
}

#[tokio::test]
async fn test_update_unknown_book_returns_none() {
    let ctx = setup();
    let ghost = NewBook::new("Fantasma", "Ninguém", "404").with_id(BookId::new(99));

    assert_eq!(update_book(&ctx.deps, &ghost).await.unwrap(), None);
}

#[tokio::test]
async fn test_delete_book() {
    let ctx = setup();
    let book = register_book(&ctx, "As aventuras", "Arthur", "001").await;

    delete_book(&ctx.deps, &book).await.unwrap();

    assert!(ctx.books.is_empty());
    assert_eq!(get_book_by_id(&ctx.deps, book.id).await.unwrap(), None);
}

#[tokio::test]
async fn test_delete_book_with_loans_is_rejected() {
    let ctx = setup();
    let book = register_book(&ctx, "As aventuras", "Arthur", "001").await;
    let loan = save_loan(&ctx.deps, NewLoan::new(book.clone(), "Fulano", today()))
        .await
        .unwrap();
    // 返却済みでも履歴が残るので削除できない
    update_loan(&ctx.deps, &loan.mark_returned()).await.unwrap();

    let result = delete_book(&ctx.deps, &book).await;

    assert!(matches!(result, Err(CatalogError::BookHasLoans(id)) if id == book.id.value()));
    assert_eq!(
        get_book_by_id(&ctx.deps, book.id).await.unwrap(),
        Some(book)
    );
    assert_eq!(ctx.loans.len(), 1);
}

#[tokio::test]
async fn test_delete_book_without_id_is_rejected() {
    let ctx = setup();
    register_book(&ctx, "As aventuras", "Arthur", "001").await;
    let unsaved = NewBook::new("As aventuras", "Arthur", "001").with_id(BookId::new(0));

    let result = delete_book(&ctx.deps, &unsaved).await;

    assert!(matches!(result, Err(CatalogError::InvalidArgument(_))));
    assert_eq!(ctx.books.len(), 1);
}

#[tokio::test]
async fn test_find_books_by_partial_title_ignores_case() {
    let ctx = setup();
    register_book(&ctx, "As aventuras", "Arthur", "001").await;
    register_book(&ctx, "Aventuras no mar", "Fulano", "002").await;
    register_book(&ctx, "Dom Casmurro", "Machado", "003").await;

    let filter = BookFilter {
        title: Some("AVENTURAS".to_string()),
        ..Default::default()
    };
    let page = find_books(&ctx.deps, &filter, PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    let isbns: Vec<_> = page.items.iter().map(|b| b.isbn.as_str()).collect();
    assert_eq!(isbns, vec!["001", "002"]);
}

#[tokio::test]
async fn test_find_books_combines_fields() {
    let ctx = setup();
    register_book(&ctx, "As aventuras", "Arthur", "001").await;
    register_book(&ctx, "Aventuras no mar", "Fulano", "002").await;

    let filter = BookFilter {
        title: Some("aventuras".to_string()),
        author: Some("ful".to_string()),
        isbn: None,
    };
    let page = find_books(&ctx.deps, &filter, PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].isbn, "002");
}

#[tokio::test]
async fn test_find_books_pagination_reports_total() {
    let ctx = setup();
    for i in 0..5 {
        register_book(&ctx, "Livro", "Autor", &format!("00{}", i)).await;
    }

    let page = find_books(&ctx.deps, &BookFilter::default(), PageRequest::new(1, 2))
        .await
        .unwrap();

    assert_eq!(page.total, 5);
    assert_eq!(page.page, 1);
    assert_eq!(page.size, 2);
    let isbns: Vec<_> = page.items.iter().map(|b| b.isbn.as_str()).collect();
    assert_eq!(isbns, vec!["002", "003"]);
}
