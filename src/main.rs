use bloodbank_core::config::AppConfig;
use bloodbank_core::error::AppError;
use bloodbank_core::matching::{
    check_eligibility, AlertMonitor, AllocationDecision, BloodBankService, BloodGroup,
    CompatibilityMatrix, DonorSubmission, EligibilityResult, IntakeGuard, MemoryInventoryStore,
    ProductClass, RequestSubmission, StockAlert,
};
use bloodbank_core::snapshot::LotSnapshotImporter;
use bloodbank_core::telemetry;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "bloodbank",
    about = "Run blood bank matching, screening and allocation decisions from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up donor/recipient compatibility and match quality
    Compat(CompatArgs),
    /// Screen a donor profile (JSON) for a product
    Eligibility(EligibilityArgs),
    /// Plan, and optionally commit, an allocation for a request against a lot snapshot
    Allocate(AllocateArgs),
    /// List expired, expiring and low-stock lots in a snapshot
    Alerts(AlertsArgs),
}

#[derive(Args, Debug)]
struct CompatArgs {
    /// Recipient blood group, e.g. A+
    #[arg(long)]
    recipient: String,
    /// Donor blood group; omit to list every compatible donor
    #[arg(long)]
    donor: Option<String>,
    /// Product class (whole_blood, plasma, platelets, red_cells, white_cells)
    #[arg(long, default_value = "red_cells")]
    product: String,
}

#[derive(Args, Debug)]
struct EligibilityArgs {
    /// Donor profile JSON file
    #[arg(long)]
    donor: PathBuf,
    /// Product the donor intends to give
    #[arg(long, default_value = "whole_blood")]
    product: String,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct AllocateArgs {
    /// Lot snapshot CSV
    #[arg(long)]
    lots: PathBuf,
    /// Request JSON file
    #[arg(long)]
    request: PathBuf,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// Apply the decision to the in-memory store and report the resulting stock
    #[arg(long)]
    commit: bool,
    /// Print the decision as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct AlertsArgs {
    /// Lot snapshot CSV
    #[arg(long)]
    lots: PathBuf,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// Print alerts as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        std::process::exit(i32::from(err.exit_code()));
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Compat(args) => run_compat(args),
        Command::Eligibility(args) => run_eligibility(args),
        Command::Allocate(args) => run_allocate(args, &config),
        Command::Alerts(args) => run_alerts(args, &config),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn today_or_local(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_compat(args: CompatArgs) -> Result<(), AppError> {
    let recipient: BloodGroup = args.recipient.parse()?;
    let product: ProductClass = args.product.parse()?;

    match args.donor {
        Some(donor) => {
            let donor: BloodGroup = donor.parse()?;
            println!("{}", describe_pair(donor, recipient, product));
        }
        None => {
            println!("Compatible {product} donors for {recipient}");
            for line in donor_ranking(recipient, product) {
                println!("- {line}");
            }
        }
    }

    Ok(())
}

fn describe_pair(donor: BloodGroup, recipient: BloodGroup, product: ProductClass) -> String {
    let matrix = CompatibilityMatrix::STANDARD;
    if matrix.is_compatible(donor, recipient, product) {
        let score = matrix.match_priority(recipient, donor, product);
        format!("{donor} -> {recipient} ({product}): compatible, match score {score}")
    } else {
        format!("{donor} -> {recipient} ({product}): incompatible")
    }
}

/// Compatible donors, best match first.
fn donor_ranking(recipient: BloodGroup, product: ProductClass) -> Vec<String> {
    let matrix = CompatibilityMatrix::STANDARD;
    let mut donors: Vec<(BloodGroup, i16)> = matrix
        .compatible_donors(recipient, product)
        .into_iter()
        .map(|donor| (donor, matrix.match_priority(recipient, donor, product)))
        .collect();
    donors.sort_by(|(left, left_score), (right, right_score)| {
        right_score.cmp(left_score).then(left.cmp(right))
    });

    donors
        .into_iter()
        .map(|(donor, score)| format!("{donor} (score {score})"))
        .collect()
}

fn run_eligibility(args: EligibilityArgs) -> Result<(), AppError> {
    let submission: DonorSubmission = read_json(&args.donor)?;
    let product: ProductClass = args.product.parse()?;
    let today = today_or_local(args.today);
    let donor = IntakeGuard::default().donor_from_submission(submission)?;

    let result = check_eligibility(&donor, product, today);
    info!(donor = %donor.id, eligible = result.eligible, "eligibility checked");

    if args.json {
        return print_json(&result);
    }

    println!("Donor {} ({}) for {} on {}", donor.id, donor.blood_group, product, today);
    for line in render_eligibility(&result) {
        println!("{line}");
    }
    Ok(())
}

fn render_eligibility(result: &EligibilityResult) -> Vec<String> {
    let mut lines = vec![if result.eligible {
        "Eligible to donate".to_string()
    } else {
        "Not eligible".to_string()
    }];

    for reason in &result.reasons {
        lines.push(format!("- {}", reason.summary()));
    }

    if let Some(date) = result.next_eligible_date {
        lines.push(format!("Next eligible: {date}"));
    } else if result.is_permanently_deferred() {
        lines.push("Permanently deferred".to_string());
    }
    lines
}

fn run_allocate(args: AllocateArgs, config: &AppConfig) -> Result<(), AppError> {
    let lots = LotSnapshotImporter::from_path(&args.lots)?;
    let submission: RequestSubmission = read_json(&args.request)?;
    let today = today_or_local(args.today);

    let store = Arc::new(MemoryInventoryStore::with_lots(lots));
    let service = BloodBankService::from_config(store, &config.inventory);
    let request = service.submit_request(submission)?;

    if !args.commit {
        let decision = service.preview(&request.id, today)?;
        if args.json {
            return print_json(&decision);
        }
        for line in render_decision(&decision) {
            println!("{line}");
        }
        return Ok(());
    }

    let outcome = service.fulfill(&request.id, today)?;
    if args.json {
        return print_json(&outcome);
    }

    for line in render_decision(&outcome.decision) {
        println!("{line}");
    }
    println!("Request status: {}", outcome.status.label());
    println!("\nRemaining {} stock", request.product);
    for level in service.stock(today)? {
        if level.product == request.product {
            println!("- {}: {} units in {} lots", level.blood_group, level.units, level.lots);
        }
    }
    info!(request = %request.id, attempts = outcome.attempts, "allocation committed");
    Ok(())
}

fn render_decision(decision: &AllocationDecision) -> Vec<String> {
    let mut lines = vec![format!(
        "Request {}: {} units of {} {} ({} priority, evaluated {})",
        decision.request_id,
        decision.units_needed(),
        decision.recipient_group,
        decision.product,
        decision.priority.label(),
        decision.evaluated_on
    )];

    if decision.draws.is_empty() {
        lines.push("No compatible stock available".to_string());
    }
    for draw in &decision.draws {
        lines.push(format!(
            "- draw {} from {} ({}, expires {}, match {})",
            draw.units, draw.lot_id, draw.blood_group, draw.expires_on, draw.match_score
        ));
    }

    if decision.residual > 0 {
        lines.push(format!("Shortfall: {} units", decision.residual));
    } else {
        lines.push("Request can be satisfied in full".to_string());
    }
    lines
}

fn run_alerts(args: AlertsArgs, config: &AppConfig) -> Result<(), AppError> {
    let lots = LotSnapshotImporter::from_path(&args.lots)?;
    let today = today_or_local(args.today);
    let monitor = AlertMonitor::new(config.inventory.alert_policy());

    let alerts = monitor.scan(&lots, today);
    info!(lots = lots.len(), alerts = alerts.len(), "stock scanned");

    if args.json {
        return print_json(&alerts);
    }

    for line in render_alerts(&alerts) {
        println!("{line}");
    }
    Ok(())
}

fn render_alerts(alerts: &[StockAlert]) -> Vec<String> {
    if alerts.is_empty() {
        return vec!["Stock alerts: none".to_string()];
    }

    let mut lines = vec!["Stock alerts".to_string()];
    for alert in alerts {
        lines.push(format!("- [{}] {}: {}", alert.kind.label(), alert.lot_id, alert.message));
    }
    lines
}
