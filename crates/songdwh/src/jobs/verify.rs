//! Post-load verification: run the checks, let the core judge the rows.

use songdwh_core::verify::{self, Finding, Severity};
use songdwh_core::{QueryCatalog, VerificationReport};

use crate::session::WarehouseSession;

/// Runs every verification query. A query that fails to run counts as a
/// violation of its check.
pub async fn verify_warehouse<S>(session: &mut S, catalog: &QueryCatalog) -> VerificationReport
where
    S: WarehouseSession + ?Sized,
{
    let mut report = VerificationReport::default();

    for query in catalog.verification_queries() {
        let finding = match session.query_i64(&query.sql).await {
            Ok(rows) => verify::evaluate(query.check, &rows),
            Err(err) => Finding::new(query.check, Severity::Violation, err.to_string()),
        };

        match finding.severity {
            Severity::Ok => {
                tracing::info!(check = %finding.check, result = %finding.message, "Check passed")
            }
            Severity::Warning => {
                tracing::warn!(check = %finding.check, result = %finding.message, "Check warning")
            }
            Severity::Violation => {
                tracing::error!(check = %finding.check, result = %finding.message, "Check failed")
            }
        }

        report.push(finding);
    }

    report
}
