//! Plain text rendering of the dashboard.
//!
//! Every value coming from the backend passes through [`escape`] before it
//! reaches the terminal.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use std::fmt::Write as _;
use std::str::FromStr;

use crate::models::{Appointment, AppointmentStatus};
use crate::state::{BannerKind, DashboardState};

pub const DEFAULT_DOCTOR: &str = "Dr. Achol Dut Amol";
const MISSING: &str = "-";
const MAX_CELL: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    All,
    Feedback,
    Predictions,
    Appointments,
    Profiles,
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "dashboard" => Ok(Section::All),
            "feedback" => Ok(Section::Feedback),
            "predictions" => Ok(Section::Predictions),
            "appointments" => Ok(Section::Appointments),
            "profiles" => Ok(Section::Profiles),
            other => Err(format!("unknown section '{}'", other)),
        }
    }
}

/// Which appointments are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(AppointmentStatus),
}

impl StatusFilter {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => appointment.status == *status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    Approve,
    Reject,
    Cancel,
    Join(String),
    Remove,
}

/// Actions offered for an appointment row, in display order.
pub fn row_actions(appointment: &Appointment) -> Vec<RowAction> {
    let join = appointment
        .meet_link
        .as_deref()
        .filter(|link| !link.is_empty())
        .map(|link| RowAction::Join(link.to_string()));

    let mut actions = match appointment.status {
        AppointmentStatus::Pending => vec![RowAction::Approve, RowAction::Reject, RowAction::Cancel],
        AppointmentStatus::Approved => join.into_iter().chain([RowAction::Cancel]).collect(),
        _ => join.into_iter().collect(),
    };
    actions.push(RowAction::Remove);
    actions
}

fn describe_actions(actions: &[RowAction]) -> String {
    actions
        .iter()
        .map(|action| match action {
            RowAction::Approve => "approve".to_string(),
            RowAction::Reject => "reject".to_string(),
            RowAction::Cancel => "cancel".to_string(),
            RowAction::Join(link) => format!("join {}", escape_url(link)),
            RowAction::Remove => "remove".to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Makes an untrusted value safe for a table cell: control characters are
/// dropped, whitespace runs collapse, the column separator is replaced and
/// the result is truncated.
pub fn escape(raw: &str) -> String {
    let collapsed = sanitize(raw);
    if collapsed.chars().count() > MAX_CELL {
        let mut truncated: String = collapsed.chars().take(MAX_CELL - 1).collect();
        truncated.push('…');
        truncated
    } else {
        collapsed
    }
}

fn sanitize(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| match c {
            '|' => '/',
            c if c.is_whitespace() => ' ',
            c => c,
        })
        .filter(|c| !c.is_control())
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Like [`escape`] for links the operator has to open: never truncated,
/// whitespace and control characters removed, `|` percent-encoded.
pub fn escape_url(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_control() && !c.is_whitespace())
        .map(|c| match c {
            '|' => "%7C".to_string(),
            c => c.to_string(),
        })
        .collect()
}

fn optional(value: Option<&str>) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => escape(v),
        None => MISSING.to_string(),
    }
}

/// `confidence` (0..1) as a percentage with two decimals.
pub fn percent(confidence: f64) -> String {
    format!("{:.2}%", confidence * 100.0)
}

/// Timestamp rendering in the configured display zone.
#[derive(Debug, Clone, Copy)]
pub struct TimeDisplay {
    zone: Tz,
}

impl Default for TimeDisplay {
    fn default() -> Self {
        Self { zone: Tz::UTC }
    }
}

impl TimeDisplay {
    /// Unknown zone names fall back to UTC.
    pub fn new(zone: Option<&str>) -> Self {
        let zone = zone.and_then(|z| Tz::from_str(z).ok()).unwrap_or(Tz::UTC);
        Self { zone }
    }

    /// Accepts RFC 3339 and naive ISO timestamps (read as UTC).
    fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn datetime(&self, raw: &str) -> String {
        match Self::parse(raw) {
            Some(dt) => dt.with_timezone(&self.zone).format("%Y-%m-%d %H:%M").to_string(),
            None => optional(Some(raw)),
        }
    }

    pub fn date(&self, raw: &str) -> String {
        if let Some(dt) = Self::parse(raw) {
            return dt.with_timezone(&self.zone).format("%Y-%m-%d").to_string();
        }
        match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) => date.to_string(),
            Err(_) => optional(Some(raw)),
        }
    }
}

/// Rendering options chosen by the operator.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub section: Section,
    pub filter: StatusFilter,
    pub time: TimeDisplay,
    /// Prefix for relative profile image paths.
    pub base_url: String,
}

fn table(out: &mut String, title: &str, headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let _ = writeln!(out, "== {} ({}) ==", title, rows.len());
    let _ = writeln!(out, "{}", line(headers.iter().map(|h| h.to_string()).collect()));
    let _ = writeln!(
        out,
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    if rows.is_empty() {
        let _ = writeln!(out, "(none)");
    }
    for row in rows {
        let _ = writeln!(out, "{}", line(row));
    }
    out.push('\n');
}

pub fn render(state: &DashboardState, options: &RenderOptions) -> String {
    let mut out = String::new();

    if let Some(banner) = state.banner() {
        let tag = match banner.kind {
            BannerKind::Success => "OK",
            BannerKind::Warning => "WARN",
            BannerKind::Info => "INFO",
            BannerKind::Error => "ERROR",
        };
        let _ = writeln!(out, "[{}] {} {}\n", tag, banner.title, escape(&banner.message));
    }

    let stats = state.stats();
    let _ = writeln!(
        out,
        "Feedback: {}  Predictions: {}  Appointments: {}  Pending: {}  Profiles: {}",
        stats.total_feedback,
        stats.total_predictions,
        stats.total_appointments,
        stats.pending_appointments,
        stats.total_profiles
    );
    if let Some(at) = state.last_refresh {
        let _ = writeln!(out, "Last refresh: {}", options.time.datetime(&at.to_rfc3339()));
    }
    out.push('\n');

    let show = |section: Section| options.section == Section::All || options.section == section;

    if show(Section::Feedback) {
        let rows = state
            .feedback
            .iter()
            .map(|f| {
                vec![
                    f.id.to_string(),
                    escape(&f.user_id),
                    escape(&f.message),
                    options.time.datetime(&f.timestamp),
                ]
            })
            .collect();
        table(&mut out, "Feedback", &["ID", "User", "Message", "Time"], rows);
    }

    if show(Section::Predictions) {
        let rows = state
            .predictions
            .iter()
            .map(|p| {
                vec![
                    p.id.to_string(),
                    escape(&p.user_id),
                    escape(&p.prediction_result),
                    percent(p.confidence),
                    options.time.datetime(&p.timestamp),
                ]
            })
            .collect();
        table(
            &mut out,
            "Predictions",
            &["ID", "User", "Result", "Confidence", "Time"],
            rows,
        );
    }

    if show(Section::Appointments) {
        let rows = state
            .appointments
            .iter()
            .filter(|a| options.filter.matches(a))
            .map(|a| {
                let marker = match state.highlighted {
                    Some(h) if h.appointment_id == a.id => "*",
                    _ => "",
                };
                let when = match a.time.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                    Some(time) => format!("{} {}", escape(&a.date), escape(time)),
                    None => escape(&a.date),
                };
                vec![
                    format!("{}{}", marker, a.id),
                    escape(&a.name),
                    escape(&a.email),
                    a.doctor
                        .as_deref()
                        .filter(|d| !d.trim().is_empty())
                        .map(escape)
                        .unwrap_or_else(|| DEFAULT_DOCTOR.to_string()),
                    when,
                    escape(&a.reason),
                    a.status.as_str().to_uppercase(),
                    describe_actions(&row_actions(a)),
                ]
            })
            .collect();
        table(
            &mut out,
            "Appointments",
            &["ID", "Name", "Email", "Doctor", "Date", "Reason", "Status", "Actions"],
            rows,
        );
    }

    if show(Section::Profiles) {
        let rows = state
            .profiles
            .iter()
            .map(|p| {
                let image = match p.profile_image_url.as_deref().map(str::trim) {
                    Some(path) if !path.is_empty() => escape_url(&format!(
                        "{}/{}",
                        options.base_url,
                        path.trim_start_matches('/')
                    )),
                    _ => MISSING.to_string(),
                };
                vec![
                    p.id.to_string(),
                    escape(&p.user_id),
                    optional(p.name.as_deref()),
                    optional(p.email.as_deref()),
                    optional(p.phone.as_deref()),
                    optional(p.state.as_deref()),
                    image,
                    options.time.date(&p.created_at),
                ]
            })
            .collect();
        table(
            &mut out,
            "Profiles",
            &["ID", "User", "Name", "Email", "Phone", "State", "Image", "Joined"],
            rows,
        );
    }

    out
}
