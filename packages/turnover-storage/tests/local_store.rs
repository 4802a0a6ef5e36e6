use std::fs;

use turnover_domain::Company;
use turnover_storage::{Error, LocalStore};

#[tokio::test]
async fn first_open_creates_an_empty_collection() {
	let dir = turnover_testkit::temp_dir("turnover_storage_empty");
	let path = dir.join("nested").join("companies.json");
	let store = LocalStore::open(&path, None).await.expect("open");

	assert_eq!(fs::read_to_string(&path).expect("read data file"), "[]");
	assert!(store.read_all().await.expect("read").is_empty());
}

#[tokio::test]
async fn first_open_copies_the_seed() {
	let dir = turnover_testkit::temp_dir("turnover_storage_seed");
	let seed = dir.join("seed.json");

	fs::write(&seed, r#"[{ "id": 3, "address": "3 Pine Ct" }]"#).expect("write seed");

	let store = LocalStore::open(dir.join("companies.json"), Some(&seed)).await.expect("open");
	let companies = store.read_all().await.expect("read");

	assert_eq!(companies.len(), 1);
	assert_eq!(companies[0].id, 3);
	assert_eq!(companies[0].address, "3 Pine Ct");
}

#[tokio::test]
async fn missing_seed_falls_back_to_empty() {
	let dir = turnover_testkit::temp_dir("turnover_storage_no_seed");
	let store = LocalStore::open(dir.join("companies.json"), Some(&dir.join("absent.json")))
		.await
		.expect("open");

	assert!(store.read_all().await.expect("read").is_empty());
}

#[tokio::test]
async fn existing_data_is_not_reseeded() {
	let dir = turnover_testkit::temp_dir("turnover_storage_existing");
	let path = dir.join("companies.json");
	let seed = dir.join("seed.json");

	fs::write(&path, r#"[{ "id": 1 }, { "id": 2 }]"#).expect("write data");
	fs::write(&seed, "[]").expect("write seed");

	let store = LocalStore::open(&path, Some(&seed)).await.expect("open");

	assert_eq!(store.read_all().await.expect("read").len(), 2);
}

#[tokio::test]
async fn write_all_replaces_the_collection() {
	let dir = turnover_testkit::temp_dir("turnover_storage_write");
	let store = LocalStore::open(dir.join("companies.json"), None).await.expect("open");
	let mut company = Company::new("1 Oak Rd", "Dana", "dana@example.com");

	company.id = 1;

	store.write_all(&[company.clone()]).await.expect("write");

	assert_eq!(store.read_all().await.expect("read"), vec![company]);

	let raw = fs::read_to_string(store.path()).expect("read data file");

	assert!(raw.contains("\"contactName\": \"Dana\""), "{raw}");

	store.write_all(&[]).await.expect("write empty");

	assert!(store.read_all().await.expect("read").is_empty());
}

#[tokio::test]
async fn blank_or_deleted_file_reads_as_empty() {
	let dir = turnover_testkit::temp_dir("turnover_storage_blank");
	let store = LocalStore::open(dir.join("companies.json"), None).await.expect("open");

	fs::write(store.path(), "  \n").expect("blank data file");

	assert!(store.read_all().await.expect("read").is_empty());

	fs::remove_file(store.path()).expect("remove data file");

	assert!(store.read_all().await.expect("read").is_empty());
}

#[tokio::test]
async fn corrupt_file_is_a_decode_error() {
	let dir = turnover_testkit::temp_dir("turnover_storage_corrupt");
	let store = LocalStore::open(dir.join("companies.json"), None).await.expect("open");

	fs::write(store.path(), "{ not json").expect("corrupt data file");

	let err = store.read_all().await.expect_err("decode should fail");

	assert!(matches!(err, Error::Decode { .. }), "{err:?}");
}
