//! Basic month-end reconciliation example

use chrono::NaiveDate;
use reconcile_core::utils::MemoryExtractor;
use reconcile_core::{
    write_outcomes_csv, ReconciliationConfig, ReconciliationSession, StatementDocument,
    StatusFilter,
};

const LEDGER_EXPORT: &str = "\
SAP Balance Export,,
Period 03/2024,,
BusA,Text,Tot.rpt.pr
1001,KBANK C/A 123-4-56789-0,\"152,300.00\"
1002,SCB S/A 222-3-33444-5,\"48,000.00\"
1003,KTB Current 555-0-12345-6,\"9,999.99\"
,Subtotal,*
";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🏦 Reconcile Core - Basic Reconciliation Example\n");

    let config = ReconciliationConfig::from_env()?;
    let mut session = ReconciliationSession::new(config);

    // 1. Load the ledger export
    println!("📊 Loading ledger export...");
    let loaded = session.load_ledger_csv(LEDGER_EXPORT.as_bytes())?;
    for record in session.ledger() {
        println!(
            "  ✓ {} [{}] {} = {}",
            record.id, record.account_class, record.narrative, record.balance
        );
    }
    println!("  {loaded} ledger record(s)\n");

    // 2. Extract statements. A real deployment plugs a document service in
    //    behind `StatementExtractor`; here the responses are canned.
    println!("📄 Extracting bank statements...");
    let today = NaiveDate::from_ymd_opt(2024, 4, 1).ok_or("invalid date")?;
    let extractor = MemoryExtractor::new(today)
        .with_response(
            "kbank_mar.pdf",
            r#"{"accountNumber":"123-4-56789-0","endingBalance":152300.00,"statementDate":"2024-03-31","bankName":"KBANK"}"#,
        )
        .with_response(
            "scb_mar.png",
            r#"{"accountNumber":"222-3-33444-5","endingBalance":"47,250.00","statementDate":"2024-03-31","bankName":"SCB"}"#,
        )
        .with_response(
            "gsb_mar.pdf",
            r#"{"accountNumber":"020-1-11111-2","endingBalance":3100,"statementDate":"2024-03-31","bankName":"GSB"}"#,
        )
        .with_failure("blurry_scan.jpg", "image too blurry to read");

    let documents = ["kbank_mar.pdf", "scb_mar.png", "gsb_mar.pdf", "blurry_scan.jpg"]
        .iter()
        .map(|name| {
            StatementDocument::new(
                name.to_string(),
                reconcile_core::guess_mime_type(name).to_string(),
                Vec::new(),
            )
        })
        .collect();

    let batch = session.add_statement_batch(&extractor, documents).await;
    for statement in &batch.statements {
        println!(
            "  ✓ {}: {} {} = {}",
            statement.source_name,
            statement.bank_label(),
            statement.account_number,
            statement.ending_balance
        );
    }
    if let Some(alert) = session.alert() {
        println!("  ⚠️  {}", alert.message);
    }
    println!();

    // 3. Reconcile
    println!("🔍 Reconciling...");
    let report = session.run()?;
    for outcome in &report.outcomes {
        println!(
            "  {:<20} {:<16} {:<8} variance {}",
            outcome.id,
            outcome.status.label(),
            outcome.detected_bank_name,
            outcome.variance_amount
        );
    }
    println!();

    // 4. Summary and issues
    let summary = &report.summary;
    println!("📈 Summary (run {})", report.run_id);
    println!("  Total:      {}", summary.total);
    println!("  Matched:    {}", summary.matched);
    println!("  Variance:   {} (abs total {})", summary.variance, summary.total_abs_variance);
    println!("  Unmatched:  {}", summary.unmatched());
    println!();

    println!("🚩 Issues needing review:");
    for outcome in report.view(StatusFilter::Issues, "") {
        println!("  - {} ({})", outcome.id, outcome.status.label());
    }
    println!();

    // 5. Export
    println!("💾 CSV export:");
    let mut buf = Vec::new();
    write_outcomes_csv(&mut buf, &report.outcomes)?;
    print!("{}", String::from_utf8(buf)?);

    Ok(())
}
