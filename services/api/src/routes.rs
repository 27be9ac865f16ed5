use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use fundraiser_payroll::config::{
    parse_decimal_separator, validate_report_year, InvalidRecordPolicy, ReportConfig,
};
use fundraiser_payroll::error::AppError;
use fundraiser_payroll::workflows::ledger::{LedgerImporter, RejectedRecord};
use fundraiser_payroll::workflows::report::{
    assemble, NumberFormat, ReportIssue, ReportRow, Roster,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;

#[derive(Debug, Deserialize)]
pub(crate) struct PayrollReportRequest {
    pub(crate) ledger_csv: String,
    #[serde(default)]
    pub(crate) roster: Option<Roster>,
    #[serde(default)]
    pub(crate) options: Option<ReportOptions>,
}

/// Per-request overrides of the configured report settings.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportOptions {
    #[serde(default)]
    pub(crate) decimal_separator: Option<String>,
    #[serde(default)]
    pub(crate) year: Option<i32>,
    #[serde(default)]
    pub(crate) invalid_records: Option<InvalidRecordPolicy>,
    #[serde(default)]
    pub(crate) legacy_team_fallback: Option<bool>,
}

impl ReportOptions {
    fn apply(self, mut config: ReportConfig) -> Result<ReportConfig, AppError> {
        if let Some(raw) = self.decimal_separator {
            config.decimal_separator = parse_decimal_separator(&raw)?;
        }
        if let Some(year) = self.year {
            config.year = validate_report_year(year)?;
        }
        if let Some(policy) = self.invalid_records {
            config.invalid_records = policy;
        }
        if let Some(fallback) = self.legacy_team_fallback {
            config.legacy_team_fallback = fallback;
        }
        Ok(config)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RenderedRow {
    #[serde(flatten)]
    pub(crate) row: ReportRow,
    pub(crate) columns: [String; 10],
}

#[derive(Debug, Serialize)]
pub(crate) struct ReportTotals {
    pub(crate) donations: usize,
    pub(crate) fundraiser_weeks: usize,
    pub(crate) payouts: usize,
    pub(crate) team_bonuses: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct PayrollReportResponse {
    pub(crate) totals: ReportTotals,
    pub(crate) rows: Vec<RenderedRow>,
    pub(crate) issues: Vec<ReportIssue>,
    pub(crate) rejected: Vec<RejectedRecord>,
}

pub(crate) fn payroll_routes() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/payroll/report",
            axum::routing::post(payroll_report_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn payroll_report_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<PayrollReportRequest>,
) -> Result<Json<PayrollReportResponse>, AppError> {
    let PayrollReportRequest {
        ledger_csv,
        roster,
        options,
    } = payload;

    let config = options
        .unwrap_or_default()
        .apply(state.report.as_ref().clone())?;
    let ledger = LedgerImporter::from_reader(Cursor::new(ledger_csv.into_bytes()), &config)?;
    let roster = roster.unwrap_or_default();
    let report = assemble(&ledger, &roster, &config);

    let format = NumberFormat::from_config(&config);
    let totals = ReportTotals {
        donations: report.count("detail"),
        fundraiser_weeks: report.count("subtotal"),
        payouts: report.count("payout"),
        team_bonuses: report.count("team_bonus"),
    };
    let rows = report
        .rows
        .into_iter()
        .map(|row| RenderedRow {
            columns: row.columns(&format),
            row,
        })
        .collect();

    Ok(Json(PayrollReportResponse {
        totals,
        rows,
        issues: report.issues,
        rejected: report.rejected,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    const LEDGER: &str = "Fundraiser ID;Fundraiser Name;Calendar week;Billing group;Public RefID;Age;Interval;Amount Yearly;status_agency\n\
2;Ben;18/2025;F2F;R1;35;monthly;360;approved\n\
1;Anna;18/2025;F2F;R2;45;monthly;360;approved\n\
;;;;R3;22;yearly;120;cancellation\n";

    fn state(ready: bool) -> AppState {
        let recorder = PrometheusBuilder::new().build_recorder();
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
            report: Arc::new(ReportConfig {
                year: 2025,
                ..ReportConfig::default()
            }),
        }
    }

    fn request(ledger_csv: &str) -> PayrollReportRequest {
        PayrollReportRequest {
            ledger_csv: ledger_csv.to_string(),
            roster: None,
            options: None,
        }
    }

    #[tokio::test]
    async fn report_endpoint_returns_rows_in_name_order() {
        let Json(body) = payroll_report_endpoint(Extension(state(true)), Json(request(LEDGER)))
            .await
            .expect("report builds");

        assert_eq!(body.totals.donations, 3);
        assert_eq!(body.totals.fundraiser_weeks, 2);
        assert_eq!(body.rows[0].columns[1], "Anna");
        assert_eq!(body.rows[2].columns[8], "Total: 4");
        assert_eq!(body.rows[3].columns[1], "Ben");
        assert!(body.issues.is_empty());
    }

    #[tokio::test]
    async fn report_endpoint_applies_roster_and_options() {
        let roster: Roster = serde_json::from_value(json!({
            "weeks": [{
                "week": 18,
                "working_days": { "Anna": 2, "Ben": 1 },
                "leaders": [{ "name": "Anna", "members": ["Ben"] }]
            }]
        }))
        .expect("valid roster");
        let payload = PayrollReportRequest {
            ledger_csv: LEDGER.to_string(),
            roster: Some(roster),
            options: Some(ReportOptions {
                decimal_separator: Some(".".to_string()),
                ..ReportOptions::default()
            }),
        };

        let Json(body) = payroll_report_endpoint(Extension(state(true)), Json(payload))
            .await
            .expect("report builds");

        assert_eq!(body.totals.payouts, 2);
        assert_eq!(body.totals.team_bonuses, 1);
        let payout = &body.rows[3];
        assert_eq!(payout.row.kind(), "payout");
        assert_eq!(payout.columns[8], "Payout: 40.00");
    }

    #[tokio::test]
    async fn invalid_options_are_rejected() {
        let payload = PayrollReportRequest {
            options: Some(ReportOptions {
                decimal_separator: Some(";".to_string()),
                ..ReportOptions::default()
            }),
            ..request(LEDGER)
        };

        let error = payroll_report_endpoint(Extension(state(true)), Json(payload))
            .await
            .err()
            .expect("semicolon separator rejected");
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn out_of_range_year_is_rejected() {
        let payload = PayrollReportRequest {
            options: Some(ReportOptions {
                year: Some(-5),
                ..ReportOptions::default()
            }),
            ..request(LEDGER)
        };

        let error = payroll_report_endpoint(Extension(state(true)), Json(payload))
            .await
            .err()
            .expect("negative year rejected");
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_ledger_is_a_bad_request() {
        let error = payroll_report_endpoint(
            Extension(state(true)),
            Json(request("Fundraiser ID;Age\n1;30\n")),
        )
        .await
        .err()
        .expect("missing columns rejected");
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn router_serves_health_and_readiness() {
        let app = payroll_routes().layer(Extension(state(false)));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("health responds");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("ready responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn router_accepts_json_report_requests() {
        let app = payroll_routes().layer(Extension(state(true)));
        let body = json!({ "ledger_csv": LEDGER }).to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/payroll/report")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .expect("request builds"),
            )
            .await
            .expect("report responds");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(json["rows"][0]["kind"], "detail");
        assert_eq!(json["rows"][0]["fundraiser_name"], "Anna");
        assert_eq!(json["totals"]["donations"], 3);
    }
}
