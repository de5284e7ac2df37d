use std::fs;
use std::path::{Path, PathBuf};

use brokerage_reports_client::commands::run::{RunCommandOptions, run_with_options};
use brokerage_reports_client::contracts::envelope::failure_from_error;
use serde_json::Value;
use tempfile::tempdir;

const EAC_EXPORT: &str = "\
Date,Action,Symbol,Quantity,Amount,Shares,Type,SalePrice,VestFairMarketValue,PurchaseFairMarketValue,VestDate,PurchaseDate
06/15/2024,Sale,AAPL,60,\"$9,000.00\",,,,,,,
,Lot Sale,,,,60,RS,$150.00,$100.00,,01/02/2024,
05/01/2024,Dividend,AAPL,,$500.00,,,,,,,
,Tax Withholding,AAPL,,($75.00),,,,,,,
";

const INDIVIDUAL_EXPORT: &str = "\
\"Date\",\"Action\",\"Symbol\",\"Description\",\"Quantity\",\"Price\",\"Fees & Comm\",\"Amount\"
\"03/15/2024\",\"Reinvest Dividend\",\"MSFT\",\"MICROSOFT CORP\",\"\",\"\",\"\",\"$37.50\"
\"03/15/2024\",\"Reinvest Shares\",\"MSFT\",\"MICROSOFT CORP\",\"0.09\",\"$416.67\",\"\",\"-$37.50\"
\"01/31/2024 as of 01/30/2024\",\"Credit Interest\",\"\",\"SCHWAB1 INT\",\"\",\"\",\"\",\"$4.12\"
\"03/15/2024\",\"NRA Tax Adj\",\"MSFT\",\"MICROSOFT CORP\",\"\",\"\",\"\",\"($9.38)\"
\"Transactions Total\",\"\",\"\",\"\",\"\",\"\",\"\",\"-$5.26\"
";

const REALIZED_GAINS_EXPORT: &str = "\
Realized Gain/Loss for Individual XXXX-1234 as of 12/31/2024
\"Closed Date\",\"Symbol\",\"Quantity\",\"Proceeds\",\"Cost Basis (CB)\",\"Opened Date\"
\"05/15/2024\",\"NVDA\",\"10\",\"$9,000.00\",\"$5,000.00\",\"01/15/2023\"
\"07/01/2024\",\"NVDA\",\"20\",\"$2,500.00\",\"$2,000.00\",\"06/20/2024\"
";

struct Workspace {
    _dir: tempfile::TempDir,
    config_path: PathBuf,
    transactions_dir: PathBuf,
    reports_dir: PathBuf,
}

fn write_file(path: &Path, body: &str) {
    let result = fs::write(path, body);
    assert!(result.is_ok());
}

fn workspace(with_exports: bool) -> Option<Workspace> {
    let dir = tempdir().ok()?;
    let transactions_dir = dir.path().join("transactions");
    let reports_dir = dir.path().join("reports");
    assert!(fs::create_dir_all(&transactions_dir).is_ok());

    let config_path = dir.path().join("config.yaml");
    write_file(
        &config_path,
        &format!(
            "year: 2024\nstock_splits:\n  - date: \"2024-06-10\"\n    ratio: 10\n    symbol: NVDA\ndirectories:\n  transactions: \"{}\"\n  reports: \"{}\"\n",
            transactions_dir.display(),
            reports_dir.display()
        ),
    );

    if with_exports {
        write_file(&transactions_dir.join("EAC_transactions_2024.csv"), EAC_EXPORT);
        write_file(
            &transactions_dir.join("Individual_transactions_2024.csv"),
            INDIVIDUAL_EXPORT,
        );
        write_file(
            &transactions_dir.join("Individual_realized_gains_2024.csv"),
            REALIZED_GAINS_EXPORT,
        );
    }

    Some(Workspace {
        _dir: dir,
        config_path,
        transactions_dir,
        reports_dir,
    })
}

fn run(workspace: &Workspace, dry_run: bool) -> Option<Value> {
    let result = run_with_options(RunCommandOptions {
        config_path: Some(&workspace.config_path),
        dry_run,
        ..RunCommandOptions::default()
    });
    assert!(result.is_ok(), "{:?}", result.as_ref().err());
    result.ok().map(|envelope| envelope.data)
}

fn read_report(workspace: &Workspace, name: &str) -> String {
    let body = fs::read_to_string(workspace.reports_dir.join(name));
    assert!(body.is_ok(), "missing report {name}");
    body.unwrap_or_default()
}

fn source<'a>(data: &'a Value, name: &str) -> &'a Value {
    data["sources"]
        .as_array()
        .and_then(|sources| sources.iter().find(|source| source["source"] == name))
        .unwrap_or(&Value::Null)
}

#[test]
fn full_run_writes_all_four_reports() {
    let Some(workspace) = workspace(true) else {
        panic!("could not create workspace");
    };
    let Some(data) = run(&workspace, false) else {
        return;
    };

    assert_eq!(data["year"], 2024);
    assert_eq!(data["dry_run"], false);
    assert_eq!(data["files_written"].as_array().map(Vec::len), Some(4));

    assert_eq!(
        read_report(&workspace, "dividend_transactions.csv"),
        "Date,Action,Symbol,Amount\n\
         2024/03/15,Reinvest Dividend,MSFT,37.50\n\
         2024/05/01,Dividend,AAPL,500.00\n"
    );
    assert_eq!(
        read_report(&workspace, "interest_transactions.csv"),
        "Date,Action,Amount\n2024/01/31,Credit Interest,4.12\n"
    );
    assert_eq!(
        read_report(&workspace, "tax_deducted_transactions.csv"),
        "Date,Symbol,Amount\n\
         2024/03/15,MSFT,-9.38\n\
         2024/05/01,AAPL,-75.00\n"
    );
    assert_eq!(
        read_report(&workspace, "sale_transactions.csv"),
        "Date,Symbol,Quantity,Amount,Cost Basis,PurchaseDate\n\
         2024/05/15,NVDA,100,9000.00,5000.00,2023/01/15\n\
         2024/06/15,AAPL,60,9000.00,6000.00,2024/01/02\n\
         2024/07/01,NVDA,20,2500.00,2000.00,2024/06/20\n"
    );
}

#[test]
fn run_summary_accounts_for_every_row() {
    let Some(workspace) = workspace(true) else {
        panic!("could not create workspace");
    };
    let Some(data) = run(&workspace, false) else {
        return;
    };

    let summary = &data["summary"];
    assert_eq!(summary["rows_read"], 11);
    assert_eq!(summary["rows_normalized"], 10);
    assert_eq!(summary["rows_skipped"], 1);
    assert_eq!(summary["rows_invalid"], 0);
    assert_eq!(summary["split_adjusted"], 1);

    let bucketed = data["buckets"]
        .as_array()
        .map(|buckets| {
            buckets
                .iter()
                .filter_map(|bucket| bucket["rows"].as_i64())
                .sum::<i64>()
        })
        .unwrap_or_default();
    assert_eq!(bucketed, 10);

    let individual = source(&data, "individual_transactions");
    assert_eq!(individual["status"], "loaded");
    assert_eq!(individual["rows_read"], 5);
    assert_eq!(individual["rows_skipped"], 1);

    let misc = data["buckets"]
        .as_array()
        .and_then(|buckets| buckets.iter().find(|bucket| bucket["category"] == "misc"));
    assert!(misc.is_some());
    if let Some(bucket) = misc {
        assert_eq!(bucket["rows"], 2);
        assert!(bucket["file"].is_null());
    }
}

#[test]
fn second_run_produces_identical_reports() {
    let Some(workspace) = workspace(true) else {
        panic!("could not create workspace");
    };
    assert!(run(&workspace, false).is_some());
    let first = read_report(&workspace, "sale_transactions.csv");
    let first_dividends = read_report(&workspace, "dividend_transactions.csv");

    assert!(run(&workspace, false).is_some());
    assert_eq!(read_report(&workspace, "sale_transactions.csv"), first);
    assert_eq!(
        read_report(&workspace, "dividend_transactions.csv"),
        first_dividends
    );
}

#[test]
fn dry_run_reports_without_writing() {
    let Some(workspace) = workspace(true) else {
        panic!("could not create workspace");
    };
    let Some(data) = run(&workspace, true) else {
        return;
    };

    assert_eq!(data["dry_run"], true);
    assert_eq!(data["summary"]["rows_normalized"], 10);
    assert_eq!(data["files_written"].as_array().map(Vec::len), Some(0));
    assert!(!workspace.reports_dir.exists());
}

#[test]
fn missing_exports_still_produce_header_only_reports() {
    let Some(workspace) = workspace(false) else {
        panic!("could not create workspace");
    };
    let Some(data) = run(&workspace, false) else {
        return;
    };

    for name in [
        "eac_transactions",
        "individual_transactions",
        "individual_realized_gains",
    ] {
        assert_eq!(source(&data, name)["status"], "missing");
    }
    assert_eq!(data["summary"]["rows_read"], 0);
    assert_eq!(
        read_report(&workspace, "tax_deducted_transactions.csv"),
        "Date,Symbol,Amount\n"
    );
}

#[test]
fn unexpected_layout_skips_only_that_file() {
    let Some(workspace) = workspace(true) else {
        panic!("could not create workspace");
    };
    write_file(
        &workspace.transactions_dir.join("EAC_transactions_2024.csv"),
        "When,What\n06/15/2024,Dividend\n",
    );
    let Some(data) = run(&workspace, false) else {
        return;
    };

    let eac = source(&data, "eac_transactions");
    assert_eq!(eac["status"], "schema_mismatch");
    assert_eq!(eac["rows_invalid"], 1);
    assert!(
        eac["detail"]
            .as_str()
            .is_some_and(|detail| detail.contains("Date") && detail.contains("Amount"))
    );
    assert_eq!(source(&data, "individual_transactions")["status"], "loaded");
    assert_eq!(
        read_report(&workspace, "dividend_transactions.csv"),
        "Date,Action,Symbol,Amount\n2024/03/15,Reinvest Dividend,MSFT,37.50\n"
    );
}

#[test]
fn bad_rows_are_reported_and_left_out() {
    let Some(workspace) = workspace(true) else {
        panic!("could not create workspace");
    };
    write_file(
        &workspace.transactions_dir.join("Individual_transactions_2024.csv"),
        "Date,Action,Symbol,Amount\n\
         03/15/2024,Reinvest Dividend,MSFT,$37.50\n\
         03/16/2024,Reinvest Dividend,MSFT,thirty\n",
    );
    let Some(data) = run(&workspace, false) else {
        return;
    };

    let individual = source(&data, "individual_transactions");
    assert_eq!(individual["rows_read"], 2);
    assert_eq!(individual["rows_normalized"], 1);
    assert_eq!(individual["rows_invalid"], 1);
    assert_eq!(individual["issues"][0]["row"], 2);
    assert_eq!(individual["issues"][0]["code"], "invalid_amount");
    assert_eq!(individual["issues"][0]["received"], "thirty");
}

#[test]
fn quantity_too_large_to_split_is_a_row_issue() {
    let Some(workspace) = workspace(true) else {
        panic!("could not create workspace");
    };
    write_file(
        &workspace.transactions_dir.join("Individual_realized_gains_2024.csv"),
        "Realized Gain/Loss for Individual XXXX-1234 as of 12/31/2024
\"Closed Date\",\"Symbol\",\"Quantity\",\"Proceeds\",\"Cost Basis (CB)\",\"Opened Date\"
\"05/15/2024\",\"NVDA\",\"79228162514264337593543950335\",\"$1.00\",\"$1.00\",\"01/15/2023\"
\"07/01/2024\",\"NVDA\",\"20\",\"$2,500.00\",\"$2,000.00\",\"06/20/2024\"
",
    );
    let Some(data) = run(&workspace, false) else {
        return;
    };

    let gains = source(&data, "individual_realized_gains");
    assert_eq!(gains["rows_read"], 2);
    assert_eq!(gains["rows_normalized"], 1);
    assert_eq!(gains["rows_invalid"], 1);
    assert_eq!(gains["issues"][0]["row"], 1);
    assert_eq!(gains["issues"][0]["code"], "split_overflow");
    assert_eq!(
        read_report(&workspace, "sale_transactions.csv"),
        "Date,Symbol,Quantity,Amount,Cost Basis,PurchaseDate\n\
         2024/06/15,AAPL,60,9000.00,6000.00,2024/01/02\n\
         2024/07/01,NVDA,20,2500.00,2000.00,2024/06/20\n"
    );
}

#[test]
fn bucket_totals_are_exact_decimal_strings() {
    let Some(workspace) = workspace(true) else {
        panic!("could not create workspace");
    };
    let Some(data) = run(&workspace, true) else {
        return;
    };
    let dividend = data["buckets"]
        .as_array()
        .and_then(|buckets| buckets.iter().find(|bucket| bucket["category"] == "dividend"));
    assert!(dividend.is_some());
    if let Some(bucket) = dividend {
        assert_eq!(bucket["total"], "537.50");
    }
}

#[test]
fn year_override_changes_input_file_names() {
    let Some(workspace) = workspace(true) else {
        panic!("could not create workspace");
    };
    let result = run_with_options(RunCommandOptions {
        config_path: Some(&workspace.config_path),
        year: Some(2023),
        dry_run: true,
        ..RunCommandOptions::default()
    });
    assert!(result.is_ok());
    if let Ok(envelope) = result {
        assert_eq!(envelope.data["year"], 2023);
        let eac = source(&envelope.data, "eac_transactions");
        assert_eq!(eac["status"], "missing");
        assert!(
            eac["path"]
                .as_str()
                .is_some_and(|path| path.ends_with("EAC_transactions_2023.csv"))
        );
    }
}

#[test]
fn missing_config_is_a_structured_failure() {
    let dir = tempdir();
    assert!(dir.is_ok());
    if let Ok(dir) = dir {
        let config_path = dir.path().join("absent.yaml");
        let result = run_with_options(RunCommandOptions {
            config_path: Some(&config_path),
            ..RunCommandOptions::default()
        });
        assert!(result.is_err());
        if let Err(error) = result {
            let envelope = failure_from_error(&error);
            assert!(!envelope.ok);
            assert_eq!(envelope.error.code, "config_not_found");
            assert!(!envelope.error.recovery_steps.is_empty());
        }
    }
}
