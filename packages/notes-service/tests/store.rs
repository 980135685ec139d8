use notes_config::Postgres;
use notes_service::{NoteStatus, NoteStore, NotesService};
use notes_storage::db::Db;
use notes_testkit::TestDatabase;

async fn build_service(test_db: &TestDatabase) -> NotesService {
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 2 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	NotesService::new(db)
}

async fn finish(service: NotesService, test_db: TestDatabase) {
	service.db.pool.close().await;
	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set NOTES_PG_DSN to run."]
async fn notes_are_visible_only_to_their_owner() {
	let Some(base_dsn) = notes_testkit::env_dsn() else {
		eprintln!("Skipping notes_are_visible_only_to_their_owner; set NOTES_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = build_service(&test_db).await;
	let store: &dyn NoteStore = &service;
	let note = store.add_note(5, "  buy milk  ").await.expect("Failed to add note.");

	assert_eq!(note.text, "buy milk");
	assert_eq!(note.status, NoteStatus::Active);

	let own = store.list_notes(5).await.expect("Failed to list notes.");
	let other = store.list_notes(6).await.expect("Failed to list notes.");

	assert_eq!(own.iter().map(|note| note.id).collect::<Vec<_>>(), vec![note.id]);
	assert!(other.is_empty());

	assert!(!store.delete_note(6, note.id).await.expect("Failed to delete note."));
	assert_eq!(store.list_notes(5).await.expect("Failed to list notes.").len(), 1);

	assert!(store.delete_note(5, note.id).await.expect("Failed to delete note."));
	assert!(!store.delete_note(5, note.id).await.expect("Failed to delete note."));
	assert!(store.list_notes(5).await.expect("Failed to list notes.").is_empty());

	finish(service, test_db).await;
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set NOTES_PG_DSN to run."]
async fn notes_are_listed_in_creation_order() {
	let Some(base_dsn) = notes_testkit::env_dsn() else {
		eprintln!("Skipping notes_are_listed_in_creation_order; set NOTES_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = build_service(&test_db).await;
	let mut expected = Vec::new();

	for text in ["one", "two", "three"] {
		expected.push(service.add_note(1, text).await.expect("Failed to add note.").id);
	}

	let listed = service.list_notes(1).await.expect("Failed to list notes.");

	assert_eq!(listed.iter().map(|note| note.id).collect::<Vec<_>>(), expected);

	service.clear_notes(1).await.expect("Failed to clear notes.");
	service.clear_notes(1).await.expect("Clearing an empty set must succeed.");

	assert!(service.list_notes(1).await.expect("Failed to list notes.").is_empty());

	finish(service, test_db).await;
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set NOTES_PG_DSN to run."]
async fn link_endpoints_are_validated() {
	let Some(base_dsn) = notes_testkit::env_dsn() else {
		eprintln!("Skipping link_endpoints_are_validated; set NOTES_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = build_service(&test_db).await;
	let a = service.add_note(1, "a").await.expect("Failed to add note.");
	let b = service.add_note(1, "b").await.expect("Failed to add note.");
	let foreign = service.add_note(2, "c").await.expect("Failed to add note.");

	let err = service.add_link(1, a.id, a.id).await.expect_err("Self-link must fail.");

	assert!(err.is_validation());

	let err = service.add_link(1, 999, 998).await.expect_err("Missing notes must fail.");

	assert!(err.is_validation());

	let err = service.add_link(1, a.id, foreign.id).await.expect_err("Foreign target must fail.");

	assert!(err.is_validation());

	let link = service.add_link(1, a.id, b.id).await.expect("Failed to add link.");
	let duplicate = service.add_link(1, a.id, b.id).await.expect("Duplicate links are allowed.");

	assert_ne!(link.id, duplicate.id);

	service.delete_note(1, a.id).await.expect("Failed to delete note.");

	let err = service.add_link(1, a.id, b.id).await.expect_err("Deleted source must fail.");

	assert!(err.is_validation());

	// Existing links survive the soft delete.
	assert_eq!(service.list_links(1).await.expect("Failed to list links.").len(), 2);

	finish(service, test_db).await;
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set NOTES_PG_DSN to run."]
async fn links_can_be_retargeted_and_removed() {
	let Some(base_dsn) = notes_testkit::env_dsn() else {
		eprintln!("Skipping links_can_be_retargeted_and_removed; set NOTES_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = build_service(&test_db).await;
	let a = service.add_note(1, "a").await.expect("Failed to add note.");
	let b = service.add_note(1, "b").await.expect("Failed to add note.");
	let c = service.add_note(1, "c").await.expect("Failed to add note.");
	let to_c = service.add_link(1, a.id, c.id).await.expect("Failed to add link.");
	let to_b = service.add_link(1, a.id, b.id).await.expect("Failed to add link.");
	let from_b = service.add_link(1, b.id, a.id).await.expect("Failed to add link.");

	let all = service.list_links(1).await.expect("Failed to list links.");

	assert_eq!(all.iter().map(|link| link.id).collect::<Vec<_>>(), vec![
		to_b.id, to_c.id, from_b.id
	]);

	let outgoing = service.list_links_for_note(1, a.id).await.expect("Failed to list links.");

	assert_eq!(outgoing.iter().map(|link| link.to_id).collect::<Vec<_>>(), vec![b.id, c.id]);

	assert!(!service.update_link(2, to_c.id, b.id).await.expect("Foreign link is absent."));
	assert!(!service.update_link(1, 9_999, b.id).await.expect("Missing link is absent."));

	let err = service.update_link(1, to_c.id, a.id).await.expect_err("Self-target must fail.");

	assert!(err.is_validation());

	service.delete_note(1, b.id).await.expect("Failed to delete note.");

	let err = service.update_link(1, to_c.id, b.id).await.expect_err("Inactive target must fail.");

	assert!(err.is_validation());

	let d = service.add_note(1, "d").await.expect("Failed to add note.");

	assert!(service.update_link(1, to_c.id, d.id).await.expect("Failed to update link."));

	let outgoing = service.list_links_for_note(1, a.id).await.expect("Failed to list links.");

	assert!(outgoing.iter().any(|link| link.id == to_c.id && link.to_id == d.id));

	assert!(!service.delete_link(2, to_c.id).await.expect("Foreign link is absent."));
	assert!(service.delete_link(1, to_c.id).await.expect("Failed to delete link."));
	assert!(!service.delete_link(1, to_c.id).await.expect("Link is already gone."));

	finish(service, test_db).await;
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set NOTES_PG_DSN to run."]
async fn authorization_is_idempotent() {
	let Some(base_dsn) = notes_testkit::env_dsn() else {
		eprintln!("Skipping authorization_is_idempotent; set NOTES_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = build_service(&test_db).await;

	assert!(!service.is_user_authorized(42).await.expect("Failed to check user."));

	service.authorize_user(42).await.expect("Failed to authorize user.");
	service.authorize_user(42).await.expect("Repeat authorization must succeed.");

	assert!(service.is_user_authorized(42).await.expect("Failed to check user."));
	assert!(!service.is_user_authorized(43).await.expect("Failed to check user."));

	finish(service, test_db).await;
}
