use chrono::{DateTime, Utc};
use vigil_api::models::RawReport;

use super::{duration_label, first_present, parse_clock, parse_timestamp, required};
use crate::error::ShapeError;
use crate::model::Report;

const DOMAIN: &str = "reports";
const EXCERPT_CHARS: usize = 160;

/// Normalize one generated report. A report without any body text is
/// rejected.
pub fn normalize_report(raw: &RawReport, now: DateTime<Utc>) -> Result<Report, ShapeError> {
    let content = required(
        first_present([
            raw.content.as_deref(),
            raw.summary.as_deref(),
            raw.report.as_deref(),
        ]),
        DOMAIN,
        "content",
    )?;

    let title = first_present([raw.title.as_deref(), raw.name.as_deref()]).unwrap_or("Untitled Report");
    let kind = first_present([raw.kind.as_deref(), raw.report_type.as_deref()]).unwrap_or("general");
    let status = first_present([raw.status.as_deref()]).unwrap_or("completed");

    let created_raw = first_present([raw.created_at.as_deref(), raw.generated_at.as_deref()]);
    let created_at = created_raw.and_then(parse_timestamp);
    let updated_at = raw.updated_at.as_deref().and_then(parse_timestamp);

    let period = raw.period.as_ref();
    let period_from = first_present([period.and_then(|p| p.from.as_deref()), raw.from.as_deref()])
        .and_then(parse_timestamp);
    let period_to = first_present([period.and_then(|p| p.to.as_deref()), raw.to.as_deref()])
        .and_then(parse_timestamp);

    let id = first_present([raw.id.as_deref(), raw.report_id.as_deref()]).map_or_else(
        || format!("{kind}|{}|{title}", created_raw.unwrap_or_default()),
        str::to_owned,
    );

    Ok(Report {
        id,
        title: title.to_owned(),
        kind: kind.to_owned(),
        status: status.to_owned(),
        content: content.to_owned(),
        excerpt: excerpt(content),
        created_at,
        updated_at,
        clock: raw.clock.as_deref().and_then(parse_clock),
        period_from,
        period_to,
        age: created_at
            .or(updated_at)
            .map(|t| duration_label(now - t))
            .unwrap_or_default(),
    })
}

fn excerpt(content: &str) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= EXCERPT_CHARS {
        return flat;
    }
    let mut cut: String = flat.chars().take(EXCERPT_CHARS).collect();
    cut.truncate(cut.trim_end().len());
    cut.push('…');
    cut
}
