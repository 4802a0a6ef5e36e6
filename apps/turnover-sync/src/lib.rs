use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre;
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use turnover_config::Config;
use turnover_domain::Company;
use turnover_service::{Outcome, TurnoverService};

#[derive(Debug, Parser)]
#[command(
	version = turnover_cli::VERSION,
	rename_all = "kebab",
	styles = turnover_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Connect to the configured sheet and make sure its header row is in place.
	Init,
	/// Print every company as JSON.
	List {
		/// Skip the read cache.
		#[arg(long)]
		refresh: bool,
	},
	/// Add a company with the default milestone checklist.
	Add {
		#[arg(long)]
		address: String,
		#[arg(long, default_value = "")]
		contact_name: String,
		#[arg(long, default_value = "")]
		contact_email: String,
	},
	/// Complete or reopen one milestone of a company.
	UpdateMilestone {
		#[arg(long)]
		id: i64,
		#[arg(long, value_name = "NAME")]
		milestone: String,
		/// Completion date; today when omitted.
		#[arg(long, value_name = "DATE", conflicts_with = "reopen")]
		date: Option<String>,
		#[arg(long)]
		reopen: bool,
		#[arg(long = "tag", value_name = "TAG")]
		tags: Vec<String>,
		#[arg(long)]
		note: Option<String>,
	},
	Delete {
		#[arg(long)]
		id: i64,
	},
	/// Copy the local data file to the remote sheet.
	Push,
	/// Overwrite the local data file with the remote sheet's contents.
	Pull,
	/// Erase every company from the active store.
	ClearAll {
		#[arg(long)]
		yes: bool,
	},
	Status,
}

#[derive(Debug, Serialize)]
struct StatusReport {
	remote_configured: bool,
	data_file: PathBuf,
	cache: Option<CacheReport>,
}

#[derive(Debug, Serialize)]
struct CacheReport {
	cached: bool,
	entries: usize,
	expires_in_ms: Option<u128>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = turnover_config::load(&args.config)?;

	init_tracing(&config);

	let service = TurnoverService::open(&config).await?;

	match args.command {
		Command::Init => init(&config, &service),
		Command::List { refresh } => {
			let companies = if refresh {
				service.force_refresh().await?
			} else {
				service.load_companies().await?
			};

			print_json(&companies)
		},
		Command::Add { address, contact_name, contact_email } => {
			let company =
				service.add_company(Company::new(address, contact_name, contact_email)).await?;

			print_json(&company)
		},
		Command::UpdateMilestone { id, milestone, date, reopen, tags, note } => {
			let mut companies = service.load_active().await?;
			let Some(company) = companies.iter_mut().find(|company| company.id == id) else {
				return Err(eyre::eyre!("No company with id {id}."));
			};
			let Some(entry) = company.milestone_mut(&milestone) else {
				return Err(eyre::eyre!("Unknown milestone {milestone:?}."));
			};
			let today = OffsetDateTime::now_utc().date().to_string();

			if reopen {
				entry.reopen();
			} else {
				entry.complete(date.unwrap_or_else(|| today.clone()));
			}

			entry.tags.extend(tags.into_iter().map(Value::String));

			if let Some(text) = note {
				entry.notes.push(serde_json::json!({ "text": text, "date": today }));
			}

			let company = company.clone();

			if !service.update_company(company.clone()).await? {
				return Err(eyre::eyre!("Company {id} disappeared before the update."));
			}

			print_json(&company)
		},
		Command::Delete { id } => {
			if !service.delete_company(id).await? {
				return Err(eyre::eyre!("No company with id {id}."));
			}

			report(Outcome::ok(format!("Deleted company {id}.")))
		},
		Command::Push => report(service.push_local().await),
		Command::Pull => report(service.pull_remote().await),
		Command::ClearAll { yes } => {
			if !yes {
				return Err(eyre::eyre!("Refusing to clear all data without --yes."));
			}

			report(service.clear_all_data().await)
		},
		Command::Status => {
			let status = StatusReport {
				remote_configured: service.is_remote_configured(),
				data_file: service.local().path().to_path_buf(),
				cache: service.cache_status().map(|status| CacheReport {
					cached: status.cached,
					entries: status.entries,
					expires_in_ms: status.expires_in.map(|left| left.as_millis()),
				}),
			};

			print_json(&status)
		},
	}
}

fn init(config: &Config, service: &TurnoverService) -> color_eyre::Result<()> {
	if !config.sheets.as_ref().is_some_and(|sheets| sheets.is_configured()) {
		return Err(eyre::eyre!(
			"Set sheets.spreadsheet_id and sheets.credentials_file to use a remote sheet."
		));
	}
	if !service.is_remote_configured() {
		return Err(eyre::eyre!("The remote sheet could not be initialized; see the log."));
	}

	report(Outcome::ok("Remote sheet ready."))
}

fn report(outcome: Outcome) -> color_eyre::Result<()> {
	if !outcome.success {
		return Err(eyre::eyre!(outcome.message));
	}

	print_json(&outcome)
}

fn print_json<T>(value: &T) -> color_eyre::Result<()>
where
	T: Serialize + ?Sized,
{
	let json = serde_json::to_string_pretty(value)?;

	println!("{json}");

	Ok(())
}

fn init_tracing(config: &Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
