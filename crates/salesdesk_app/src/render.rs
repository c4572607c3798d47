use std::fmt::Write;

use salesdesk_core::{
    AppViewModel, CallPhase, NoticeLevel, PanelMode, QueueMarker, Segment, SortDirection,
    SortKey,
};

const NAME_WIDTH: usize = 24;
const COMPANY_WIDTH: usize = 20;

/// Renders the whole console as plain text.
pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    render_header(&mut out, view);
    render_rows(&mut out, view);
    render_detail(&mut out, view);
    render_assign(&mut out, view);
    render_call(&mut out, view);
    render_notices(&mut out, view);
    out
}

fn render_header(out: &mut String, view: &AppViewModel) {
    let mut flags = Vec::new();
    if view.loading {
        flags.push("loading");
    }
    if view.busy {
        flags.push("busy");
    }
    if view.session_expired {
        flags.push("SESSION EXPIRED");
    }
    let _ = writeln!(
        out,
        "== {} of {} records (snapshot v{}) {}",
        view.filtered_count,
        view.total_records,
        view.snapshot_version,
        flags.join(" ")
    );

    let filter = &view.filter;
    let mut active = Vec::new();
    if !filter.query.trim().is_empty() {
        active.push(format!("search={:?}", filter.query.trim()));
    }
    for (label, value) in [
        ("territory", &filter.territory),
        ("industry", &filter.industry),
        ("owner", &filter.owner),
    ] {
        if let Some(value) = value {
            active.push(format!("{label}={value}"));
        }
    }
    let _ = writeln!(
        out,
        "   segment={} sort={}{} {}",
        segment_label(filter.segment),
        sort_key_label(view.sort.key),
        match view.sort.direction {
            SortDirection::Ascending => "",
            SortDirection::Descending => " desc",
        },
        active.join(" ")
    );

    let counts: Vec<String> = view
        .segment_counts
        .iter()
        .filter(|entry| entry.count > 0 || entry.segment == Segment::All)
        .map(|entry| format!("{}:{}", segment_label(entry.segment), entry.count))
        .collect();
    let _ = writeln!(out, "   {}", counts.join("  "));

    if view.selection.bulk_mode {
        let _ = writeln!(
            out,
            "   bulk: {} selected{}",
            view.selection.ids.len(),
            if view.selection.all_visible_selected {
                " (all visible)"
            } else {
                ""
            }
        );
    }
}

fn render_rows(out: &mut String, view: &AppViewModel) {
    if view.rows.is_empty() {
        let _ = writeln!(out, "   (no records)");
        return;
    }
    for row in &view.rows {
        let mark = match (view.selection.bulk_mode, row.selected) {
            (false, _) => "   ",
            (true, true) => "[x]",
            (true, false) => "[ ]",
        };
        let _ = writeln!(
            out,
            "{mark} {:<9} {:<nw$} {:<cw$} {:<12} {:<3} {}",
            row.id,
            clip(&row.name, NAME_WIDTH),
            clip(row.company.as_deref().unwrap_or("-"), COMPANY_WIDTH),
            row.status,
            queue_badge(row.queue),
            row.owner.as_deref().unwrap_or(""),
            nw = NAME_WIDTH,
            cw = COMPANY_WIDTH,
        );
    }
    if view.has_more {
        let _ = writeln!(
            out,
            "   ... showing {} of {} (type `more`)",
            view.rows.len(),
            view.filtered_count
        );
    }
}

fn render_detail(out: &mut String, view: &AppViewModel) {
    let Some(detail) = &view.detail else {
        return;
    };
    let record = &detail.record;
    let mode = match detail.mode {
        PanelMode::Popup => "popup",
        PanelMode::Split => "split",
    };
    let _ = writeln!(out, "-- {} [{mode}]", record.name);
    for (label, value) in [
        ("company", record.company.as_deref()),
        ("email", record.email.as_deref()),
        ("phone", record.phone.as_deref()),
        ("territory", record.territory.as_deref()),
        ("industry", record.industry.as_deref()),
        ("owner", record.owner.as_deref()),
    ] {
        if let Some(value) = value {
            let _ = writeln!(out, "   {label:<10} {value}");
        }
    }
    let _ = writeln!(out, "   {:<10} {}", "status", record.status);
}

fn render_assign(out: &mut String, view: &AppViewModel) {
    let Some(assign) = &view.assign else {
        return;
    };
    let _ = writeln!(out, "-- assign {} record(s)", assign.target_count);
    if assign.loading {
        let _ = writeln!(out, "   loading users...");
        return;
    }
    if !assign.query.is_empty() {
        let _ = writeln!(out, "   users matching {:?}", assign.query);
    }
    for user in &assign.users {
        let _ = writeln!(out, "   {:<10} {}", user.id, user.name);
    }
}

fn render_call(out: &mut String, view: &AppViewModel) {
    let call = &view.call;
    let Some(session) = &call.session else {
        return;
    };
    let clock = format!("{:02}:{:02}", call.elapsed_secs / 60, call.elapsed_secs % 60);
    match call.phase {
        CallPhase::Active => {
            let _ = writeln!(
                out,
                "** on call with {} ({}) {clock}",
                session.display_name, session.phone
            );
        }
        _ if call.outcome_visible => {
            let _ = writeln!(
                out,
                "** outcome for {} {clock}{}: type `outcome <category> <notes>`",
                session.display_name,
                if call.saving { " saving..." } else { "" }
            );
        }
        _ => {
            let _ = writeln!(
                out,
                "** outcome pending for {} {clock} (type `reopen`)",
                session.display_name
            );
        }
    }
}

fn render_notices(out: &mut String, view: &AppViewModel) {
    for (index, notice) in view.notices.iter().enumerate() {
        let level = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warn",
            NoticeLevel::Error => "error",
        };
        let _ = writeln!(out, "!{index} {level}: {}", notice.message);
    }
}

fn segment_label(segment: Segment) -> String {
    match segment {
        Segment::All => "all".to_string(),
        Segment::ActionDue => "due".to_string(),
        Segment::Scheduled => "scheduled".to_string(),
        Segment::Status(status) => status.to_string(),
    }
}

fn sort_key_label(key: SortKey) -> &'static str {
    match key {
        SortKey::Priority => "priority",
        SortKey::Name => "name",
        SortKey::Status => "status",
    }
}

fn queue_badge(queue: QueueMarker) -> &'static str {
    match queue {
        QueueMarker::Overdue => "!!",
        QueueMarker::DueToday => "!",
        QueueMarker::Scheduled => "~",
        QueueMarker::None => "",
    }
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
    clipped.push('~');
    clipped
}
