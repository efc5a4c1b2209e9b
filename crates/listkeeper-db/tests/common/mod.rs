// Backend-agnostic integration tests for the Database trait.
//
// Each public async function accepts `&dyn Database` so that the same logic
// can be exercised against both the SQLite and Postgres backends.

use std::time::Duration;

use listkeeper_core::{CreateList, Deadline, UpdateList};
use listkeeper_db::{Database, DbError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn deadline() -> Deadline {
    Deadline::after(Duration::from_secs(10))
}

fn make_sublist(parent_id: i64, title: &str) -> CreateList {
    CreateList {
        parent_id: Some(parent_id),
        ..CreateList::new(title, format!("{title} description"))
    }
}

// ---------------------------------------------------------------------------
// Top-level lists
// ---------------------------------------------------------------------------

/// Store, get, fetch, partial update, delete.
pub async fn test_list_crud(db: &dyn Database) {
    let stored = db
        .store(
            &deadline(),
            &CreateList {
                attachment: Some("20240101120000_1.pdf".into()),
                ..CreateList::new("Groceries", "Weekly shop")
            },
        )
        .await
        .unwrap();
    assert_eq!(stored.title, "Groceries");
    assert_eq!(stored.description, "Weekly shop");
    assert_eq!(stored.attachment.as_deref(), Some("20240101120000_1.pdf"));
    assert!(stored.parent_id.is_none());

    let fetched = db.get_by_id(&deadline(), stored.id).await.unwrap();
    assert_eq!(fetched.id, stored.id);
    assert_eq!(fetched.title, "Groceries");
    assert!(fetched.children.is_empty());

    let all = db.fetch_top_level(&deadline()).await.unwrap();
    assert_eq!(all.len(), 1);

    // Only the description is supplied; title and attachment stay.
    let updated = db
        .update(
            &deadline(),
            stored.id,
            &UpdateList {
                title: Some(String::new()),
                description: Some("Monthly shop".into()),
                attachment: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Groceries");
    assert_eq!(updated.description, "Monthly shop");
    assert_eq!(updated.attachment.as_deref(), Some("20240101120000_1.pdf"));
    assert!(updated.updated_at >= stored.updated_at);

    db.delete(&deadline(), stored.id).await.unwrap();
    assert!(db.fetch_top_level(&deadline()).await.unwrap().is_empty());
}

pub async fn test_get_missing(db: &dyn Database) {
    let err = db.get_by_id(&deadline(), 4040).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)), "got {err:?}");

    let err = db
        .update(
            &deadline(),
            4040,
            &UpdateList {
                title: Some("x".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)), "got {err:?}");
}

/// Deletes report success even when nothing matched.
pub async fn test_delete_is_idempotent(db: &dyn Database) {
    db.delete(&deadline(), 4040).await.unwrap();
    db.delete_child(&deadline(), 4040, 4041).await.unwrap();
}

// ---------------------------------------------------------------------------
// Sublists
// ---------------------------------------------------------------------------

pub async fn test_sublists(db: &dyn Database) {
    let parent = db
        .store(&deadline(), &CreateList::new("Groceries", "Weekly shop"))
        .await
        .unwrap();
    let other = db
        .store(&deadline(), &CreateList::new("Chores", "House"))
        .await
        .unwrap();

    let milk = db
        .store(&deadline(), &make_sublist(parent.id, "Milk"))
        .await
        .unwrap();
    let eggs = db
        .store(&deadline(), &make_sublist(parent.id, "Eggs"))
        .await
        .unwrap();
    assert_eq!(milk.parent_id, Some(parent.id));

    // Sublists never show up among top-level lists.
    let top: Vec<i64> = db
        .fetch_top_level(&deadline())
        .await
        .unwrap()
        .iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(top, vec![parent.id, other.id]);

    let children = db.fetch_children(&deadline(), parent.id).await.unwrap();
    let child_ids: Vec<i64> = children.iter().map(|l| l.id).collect();
    assert_eq!(child_ids, vec![milk.id, eggs.id]);
    assert!(db.fetch_children(&deadline(), other.id).await.unwrap().is_empty());

    // Children are loaded on single fetch only.
    let with_children = db.get_by_id(&deadline(), parent.id).await.unwrap();
    assert_eq!(with_children.children.len(), 2);
    assert!(db
        .fetch_top_level(&deadline())
        .await
        .unwrap()
        .iter()
        .all(|l| l.children.is_empty()));

    // Scoped get.
    let got = db.get_child(&deadline(), parent.id, milk.id).await.unwrap();
    assert_eq!(got.title, "Milk");
    let err = db
        .get_child(&deadline(), other.id, milk.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)), "got {err:?}");

    // A top-level delete never reaches a sublist.
    db.delete(&deadline(), milk.id).await.unwrap();
    assert!(db.get_child(&deadline(), parent.id, milk.id).await.is_ok());

    // A scoped delete under the wrong parent is a no-op.
    db.delete_child(&deadline(), other.id, milk.id).await.unwrap();
    assert!(db.get_child(&deadline(), parent.id, milk.id).await.is_ok());

    db.delete_child(&deadline(), parent.id, milk.id).await.unwrap();
    db.delete_child(&deadline(), parent.id, eggs.id).await.unwrap();
    assert!(db
        .fetch_children(&deadline(), parent.id)
        .await
        .unwrap()
        .is_empty());
}

/// No cascade: a parent with sublists cannot be deleted out from under them.
pub async fn test_delete_parent_with_children(db: &dyn Database) {
    let parent = db
        .store(&deadline(), &CreateList::new("Groceries", "Weekly shop"))
        .await
        .unwrap();
    let child = db
        .store(&deadline(), &make_sublist(parent.id, "Milk"))
        .await
        .unwrap();

    let err = db.delete(&deadline(), parent.id).await.unwrap_err();
    assert!(matches!(err, DbError::Constraint(_)), "got {err:?}");
    assert!(db.get_child(&deadline(), parent.id, child.id).await.is_ok());

    db.delete_child(&deadline(), parent.id, child.id).await.unwrap();
    db.delete(&deadline(), parent.id).await.unwrap();
    let err = db.get_by_id(&deadline(), parent.id).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));
}

// ---------------------------------------------------------------------------
// Deadlines
// ---------------------------------------------------------------------------

pub async fn test_expired_deadline(db: &dyn Database) {
    let expired = Deadline::after(Duration::ZERO);

    let err = db.fetch_top_level(&expired).await.unwrap_err();
    assert!(matches!(err, DbError::Timeout(_)), "got {err:?}");

    let err = db
        .store(&expired, &CreateList::new("Groceries", "Weekly shop"))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Timeout(_)), "got {err:?}");

    // Nothing was written.
    assert!(db.fetch_top_level(&deadline()).await.unwrap().is_empty());
}
