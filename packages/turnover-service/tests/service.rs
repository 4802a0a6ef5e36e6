use std::{fs, path::PathBuf, sync::Arc};

use serde_json::json;

use turnover_config::{Config, Local, Service, Sheets, SyncPolicy};
use turnover_domain::{Company, MILESTONE_COUNT};
use turnover_service::{ClientOptions, Error, TurnoverService, codec};
use turnover_storage::LocalStore;
use turnover_testkit::{MemorySheet, SheetCall};

fn data_file(prefix: &str) -> PathBuf {
	turnover_testkit::temp_dir(prefix).join("data").join("companies.json")
}

async fn local_service(prefix: &str) -> TurnoverService {
	let local = LocalStore::open(data_file(prefix), None).await.expect("open local store");

	TurnoverService::new(local, ClientOptions::default())
}

async fn remote_service(prefix: &str) -> (TurnoverService, Arc<MemorySheet>) {
	let mut service = local_service(prefix).await;
	let sheet = Arc::new(MemorySheet::new());
	let outcome = service.attach_remote(sheet.clone()).await;

	assert!(outcome.success, "{}", outcome.message);

	(service, sheet)
}

fn company(address: &str) -> Company {
	Company::new(address, "Dana", "dana@example.com")
}

#[tokio::test]
async fn local_crud_assigns_ids_and_reports_missing_targets() {
	let service = local_service("turnover_local_crud").await;
	let first = service.add_company(company("1 Oak Rd")).await.expect("add first");
	let second = service.add_company(company("2 Elm St")).await.expect("add second");

	assert_eq!(first.id, 1);
	assert_eq!(second.id, 2);
	assert_eq!(first.created_date.len(), "2025-01-01".len());
	assert_eq!(first.milestones.len(), MILESTONE_COUNT);

	let mut renamed = first.clone();

	renamed.address = "1 Oak Road".to_string();

	assert_eq!(service.update_company(renamed).await, Ok(true));

	let mut stranger = company("9 Nowhere");

	stranger.id = 99;

	assert_eq!(service.update_company(stranger).await, Ok(false));
	assert_eq!(service.delete_company(2).await, Ok(true));
	assert_eq!(service.delete_company(2).await, Ok(false));

	let stored = service.load_companies().await.expect("load");

	assert_eq!(stored.len(), 1);
	assert_eq!(stored[0].address, "1 Oak Road");
}

#[tokio::test]
async fn added_company_keeps_an_explicit_created_date() {
	let service = local_service("turnover_created_date").await;
	let mut dated = company("3 Pine Ct");

	dated.created_date = "2024-12-31".to_string();

	let stored = service.add_company(dated).await.expect("add");

	assert_eq!(stored.created_date, "2024-12-31");
}

#[tokio::test]
async fn local_clear_empties_the_file() {
	let service = local_service("turnover_local_clear").await;

	service.add_company(company("1 Oak Rd")).await.expect("add");

	let outcome = service.clear_all_data().await;

	assert!(outcome.success);
	assert_eq!(service.load_companies().await, Ok(Vec::new()));
}

#[tokio::test]
async fn push_and_pull_require_a_remote() {
	let service = local_service("turnover_no_remote").await;

	assert!(!service.is_remote_configured());
	assert!(!service.push_local().await.success);
	assert!(!service.pull_remote().await.success);
	assert!(service.cache_status().is_none());
}

#[tokio::test(start_paused = true)]
async fn attached_remote_receives_saves() {
	let (service, sheet) = remote_service("turnover_remote_saves").await;

	assert!(service.is_remote_configured());
	assert_eq!(sheet.row(1), codec::header_row().into_cells());

	let added = service.add_company(company("1 Oak Rd")).await.expect("add");

	assert_eq!(sheet.row(2)[0], json!(added.id));
	assert!(service.local().read_all().await.expect("read local").is_empty());
	assert_eq!(service.load_companies().await, Ok(vec![added]));
}

#[tokio::test(start_paused = true)]
async fn failed_initialization_leaves_the_service_local() {
	let mut service = local_service("turnover_remote_down").await;
	let sheet = Arc::new(MemorySheet::new());

	sheet.fail(SheetCall::Describe);

	let outcome = service.attach_remote(sheet).await;

	assert!(!outcome.success);
	assert!(!service.is_remote_configured());
}

#[tokio::test(start_paused = true)]
async fn remote_read_failure_falls_back_to_the_local_file() {
	let (service, sheet) = remote_service("turnover_fallback").await;
	let mut local = company("7 Local Way");

	local.id = 7;
	local.normalize_milestones();
	service.local().write_all(std::slice::from_ref(&local)).await.expect("write local");
	sheet.fail(SheetCall::Read);

	assert_eq!(service.load_companies().await, Ok(vec![local]));
}

async fn seeded_remote_service(prefix: &str) -> (TurnoverService, Arc<MemorySheet>) {
	let (service, sheet) = remote_service(prefix).await;

	for id in 1..=3 {
		let mut stored = company(&format!("{id} Remote St"));

		stored.id = id;
		sheet.put_row(id as u32 + 1, codec::encode(&stored).into_cells());
	}

	(service, sheet)
}

fn remote_ids(sheet: &MemorySheet) -> Vec<serde_json::Value> {
	(2..=5)
		.map(|row| sheet.row(row))
		.filter(|cells| !cells.is_empty())
		.map(|cells| cells[0].clone())
		.collect()
}

#[tokio::test(start_paused = true)]
async fn add_during_a_remote_outage_leaves_the_sheet_untouched() {
	let (service, sheet) = seeded_remote_service("turnover_add_outage").await;
	let writes_before = sheet.writes().len();

	sheet.fail(SheetCall::Read);

	let result = service.add_company(company("New")).await;

	assert!(matches!(result, Err(Error::TransportUnavailable { .. })), "{result:?}");
	assert_eq!(remote_ids(&sheet), vec![json!(1), json!(2), json!(3)]);
	assert_eq!(sheet.count(SheetCall::Clear), 0);
	assert_eq!(sheet.writes().len(), writes_before);
}

#[tokio::test(start_paused = true)]
async fn update_and_delete_during_a_remote_outage_leave_the_sheet_untouched() {
	let (service, sheet) = seeded_remote_service("turnover_edit_outage").await;
	let mut local = company("Stale Local");

	local.id = 2;
	service.local().write_all(std::slice::from_ref(&local)).await.expect("write local");
	sheet.fail(SheetCall::Read);

	assert!(service.update_company(local).await.is_err());
	assert!(service.delete_company(2).await.is_err());
	assert_eq!(remote_ids(&sheet), vec![json!(1), json!(2), json!(3)]);
	assert_eq!(sheet.count(SheetCall::Clear), 0);

	sheet.recover(SheetCall::Read);

	let added = service.add_company(company("4 Remote St")).await.expect("add after recovery");

	assert_eq!(added.id, 4);
	assert_eq!(remote_ids(&sheet), vec![json!(1), json!(2), json!(3), json!(4)]);
}

#[tokio::test(start_paused = true)]
async fn push_then_pull_moves_the_collection() {
	let (service, sheet) = remote_service("turnover_push_pull").await;
	let mut first = company("1 Oak Rd");
	let mut second = company("2 Elm St");

	first.id = 1;
	second.id = 2;
	service.local().write_all(&[first, second]).await.expect("write local");

	let pushed = service.push_local().await;

	assert!(pushed.success, "{}", pushed.message);
	assert_eq!(sheet.row(3)[2], json!("2 Elm St"));

	service.local().write_all(&[]).await.expect("empty local");

	let pulled = service.pull_remote().await;

	assert!(pulled.success, "{}", pulled.message);
	assert_eq!(service.local().read_all().await.expect("read local").len(), 2);
}

#[tokio::test(start_paused = true)]
async fn remote_clear_restores_the_header() {
	let (service, sheet) = remote_service("turnover_remote_clear").await;

	service.add_company(company("1 Oak Rd")).await.expect("add");

	let outcome = service.clear_all_data().await;

	assert!(outcome.success, "{}", outcome.message);
	assert_eq!(sheet.row(1), codec::header_row().into_cells());
	assert!(sheet.row(2).is_empty());
	assert_eq!(service.load_companies().await, Ok(Vec::new()));
}

#[tokio::test(start_paused = true)]
async fn reset_remote_returns_to_the_local_file() {
	let (mut service, _sheet) = remote_service("turnover_reset").await;

	service.reset_remote();

	assert!(!service.is_remote_configured());

	let added = service.add_company(company("1 Oak Rd")).await.expect("add");

	assert_eq!(service.local().read_all().await.expect("read local"), vec![added]);
}

#[tokio::test(start_paused = true)]
async fn cache_management_is_forwarded_to_the_remote() {
	let (service, sheet) = remote_service("turnover_cache").await;

	assert_eq!(service.load_companies().await, Ok(Vec::new()));
	assert!(service.cache_status().is_some_and(|status| status.cached));

	service.clear_cache();

	assert!(service.cache_status().is_some_and(|status| !status.cached));
	assert!(service.force_refresh().await.is_ok());
	assert_eq!(sheet.count(SheetCall::Read), 3);
}

#[tokio::test]
async fn incomplete_sheets_section_is_a_configuration_failure() {
	let mut service = local_service("turnover_incomplete").await;
	let sheets = Sheets {
		spreadsheet_id: None,
		credentials_file: Some(PathBuf::from("credentials.json")),
		api_base: "http://127.0.0.1:9".to_string(),
		timeout_ms: 1_000,
	};
	let outcome = service.configure_remote(&sheets).await;

	assert!(!outcome.success);
	assert!(outcome.message.contains("spreadsheet_id"), "{}", outcome.message);
}

#[tokio::test]
async fn open_seeds_the_data_file_and_fills_milestones() {
	let dir = turnover_testkit::temp_dir("turnover_open_seed");
	let seed = dir.join("seed.json");

	fs::write(&seed, r#"[{ "id": 4, "address": "4 Birch Ln", "milestones": [] }]"#)
		.expect("write seed");

	let cfg = Config {
		service: Service::default(),
		local: Local { data_file: dir.join("data").join("companies.json"), seed_file: Some(seed) },
		sync: SyncPolicy::default(),
		sheets: None,
	};
	let service = TurnoverService::open(&cfg).await.expect("open service");
	let companies = service.load_companies().await.expect("load");

	assert!(!service.is_remote_configured());
	assert_eq!(companies.len(), 1);
	assert_eq!(companies[0].id, 4);
	assert_eq!(companies[0].milestones.len(), MILESTONE_COUNT);
}
