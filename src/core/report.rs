//! Projection of a [`CleanupSummary`] into the stable `jobReportV1` shape.
//!
//! This is a pure function of the frozen summary: no I/O, no clock. The UI
//! renders task cards from here and never inspects the raw summary directly.

use crate::models::report::{
    Fact, Issue, JobReport, Section, Severity, TaskCard, TaskStatus, REPORT_TEMPLATE,
    REPORT_VERSION,
};
use crate::models::summary::CleanupSummary;

/// Item lists on task cards are capped; the full list stays in `raw`.
const ITEM_CAP: usize = 200;

/// Stage applicability per run mode. A stage that a mode never performs is
/// reported as skipped, not failed.
fn applicable(task: &str, mode: &str) -> bool {
    match task {
        "duplicates" => matches!(mode, "full_sweep" | "movie" | "show"),
        "radarr" => matches!(mode, "full_sweep" | "movie"),
        "sonarr" => matches!(mode, "full_sweep" | "show" | "season" | "episode"),
        "watchlist" => matches!(mode, "full_sweep" | "movie" | "show" | "season"),
        _ => false,
    }
}

/// Build the versioned report for one finished run.
pub fn build_report(job_id: &str, summary: &CleanupSummary) -> JobReport {
    let dry = summary.dry_run;
    let mut tasks = Vec::new();
    let mut issues: Vec<Issue> = Vec::new();

    // Connectivity noise from the monitoring backends stays on the card and
    // in `raw` but never becomes a top-level issue.
    for warning in &summary.warnings {
        if warning.starts_with("radarr:") || warning.starts_with("sonarr:") {
            continue;
        }
        issues.push(Issue {
            severity: Severity::Warn,
            message: warning.clone(),
        });
    }

    let status_of = |executed: bool, disabled: bool, task: &str| -> TaskStatus {
        if summary.skipped || disabled || !applicable(task, &summary.mode) {
            TaskStatus::Skipped
        } else if executed {
            TaskStatus::Success
        } else {
            TaskStatus::Failed
        }
    };

    // Duplicates card.
    {
        let d = &summary.duplicates;
        let status = status_of(d.executed, d.skipped_disabled, "duplicates");
        let mut facts = vec![
            Fact::new("movie groups", d.movies.groups_found),
            Fact::new("episode groups", d.episodes.groups_found),
            Fact::new(
                verb(dry, "entries deleted", "entries would be deleted"),
                if dry {
                    d.movies.would_delete_metadata + d.episodes.would_delete_metadata
                } else {
                    d.movies.metadata_deleted + d.episodes.metadata_deleted
                },
            ),
            Fact::new(
                verb(dry, "variants deleted", "variants would be deleted"),
                if dry {
                    d.movies.would_delete_variants + d.episodes.would_delete_variants
                } else {
                    d.movies.variants_deleted + d.episodes.variants_deleted
                },
            ),
        ];
        let mismatches = d.movies.verify_mismatches + d.episodes.verify_mismatches;
        if mismatches > 0 {
            facts.push(Fact::new("verification mismatches", mismatches));
        }
        if !d.items.is_empty() {
            let shown: Vec<_> = d.items.iter().take(ITEM_CAP).cloned().collect();
            if d.items.len() > ITEM_CAP {
                facts.push(Fact::new("items truncated", true));
            }
            facts.push(Fact::new("items", shown));
        }
        tasks.push(card(
            "duplicates",
            "Duplicate cleanup",
            status,
            facts,
            d.movies.failures + d.episodes.failures,
            &mut issues,
        ));
    }

    // Radarr card.
    {
        let r = &summary.radarr;
        let status = status_of(r.executed, r.skipped_disabled, "radarr");
        let facts = vec![
            Fact::new("connected", r.connected),
            Fact::new(
                verb(dry, "unmonitored", "would unmonitor"),
                if dry { r.would_unmonitor } else { r.unmonitored },
            ),
            Fact::new("already unmonitored", r.already_unmonitored),
            Fact::new("not found", r.not_found),
        ];
        tasks.push(card(
            "radarr",
            "Radarr monitor sync",
            status,
            facts,
            r.failures,
            &mut issues,
        ));
    }

    // Sonarr card.
    {
        let s = &summary.sonarr;
        let status = status_of(s.executed, s.skipped_disabled, "sonarr");
        let mut facts = vec![
            Fact::new("connected", s.connected),
            Fact::new(
                verb(dry, "episodes unmonitored", "episodes would be unmonitored"),
                if dry { s.would_unmonitor } else { s.unmonitored },
            ),
            Fact::new(
                verb(dry, "episodes re-monitored", "episodes would be re-monitored"),
                if dry { s.would_monitor } else { s.monitored },
            ),
            Fact::new(
                verb(dry, "series unmonitored", "series would be unmonitored"),
                if dry {
                    s.would_unmonitor_series
                } else {
                    s.series_unmonitored
                },
            ),
            Fact::new(
                verb(dry, "seasons unmonitored", "seasons would be unmonitored"),
                if dry {
                    s.would_unmonitor_seasons
                } else {
                    s.seasons_unmonitored
                },
            ),
            Fact::new("already unmonitored", s.already_unmonitored),
            Fact::new("not found", s.not_found),
        ];
        if s.seasons_complete + s.seasons_incomplete > 0 {
            facts.push(Fact::new("seasons complete", s.seasons_complete));
            facts.push(Fact::new("seasons incomplete", s.seasons_incomplete));
        }
        if s.missing_episodes > 0 {
            facts.push(Fact::new("missing episodes", s.missing_episodes));
        }
        tasks.push(card(
            "sonarr",
            "Sonarr monitor sync",
            status,
            facts,
            s.failures,
            &mut issues,
        ));
    }

    // Watchlist card.
    {
        let w = &summary.watchlist;
        let status = status_of(w.executed, w.skipped_disabled, "watchlist");
        let facts = vec![
            Fact::new("movies checked", w.movies_checked),
            Fact::new("shows checked", w.shows_checked),
            Fact::new(
                verb(dry, "removed", "would remove"),
                if dry { w.would_remove } else { w.removed },
            ),
            Fact::new("not in library", w.not_found),
            Fact::new("incomplete shows kept", w.incomplete_shows),
        ];
        tasks.push(card(
            "watchlist",
            "Watchlist reconciliation",
            status,
            facts,
            w.failures,
            &mut issues,
        ));
    }

    let sections = vec![Section {
        id: "cleanup".to_string(),
        title: "Cleanup".to_string(),
        task_ids: tasks.iter().map(|t| t.id.clone()).collect(),
    }];

    JobReport {
        template: REPORT_TEMPLATE.to_string(),
        version: REPORT_VERSION,
        job_id: job_id.to_string(),
        dry_run: dry,
        trigger: summary.trigger.to_string(),
        headline: headline(summary),
        sections,
        tasks,
        issues,
        raw: serde_json::to_value(summary).unwrap_or(serde_json::Value::Null),
    }
}

fn verb(dry: bool, actual: &'static str, would: &'static str) -> &'static str {
    if dry {
        would
    } else {
        actual
    }
}

/// Assemble one task card; an applicable-but-never-executed stage fails with
/// a synthetic error issue so silent no-ops cannot look healthy.
fn card(
    id: &str,
    title: &str,
    status: TaskStatus,
    facts: Vec<Fact>,
    failures: u32,
    issues: &mut Vec<Issue>,
) -> TaskCard {
    let mut card_issues = Vec::new();
    if status == TaskStatus::Failed {
        let issue = Issue {
            severity: Severity::Error,
            message: format!("{} did not run", title),
        };
        issues.push(issue.clone());
        card_issues.push(issue);
    }
    if failures > 0 {
        card_issues.push(Issue {
            severity: Severity::Warn,
            message: format!("{} item-level failures", failures),
        });
    }
    TaskCard {
        id: id.to_string(),
        title: title.to_string(),
        status,
        facts,
        issues: card_issues,
    }
}

fn headline(summary: &CleanupSummary) -> String {
    if summary.skipped {
        return match summary.skip_reason.as_deref() {
            Some(reason) => format!("Skipped: {}", reason),
            None => "Skipped".to_string(),
        };
    }

    let dry = summary.dry_run;
    let d = &summary.duplicates;
    let entries = if dry {
        d.movies.would_delete_metadata + d.episodes.would_delete_metadata
    } else {
        d.movies.metadata_deleted + d.episodes.metadata_deleted
    };
    let unmonitored = if dry {
        summary.radarr.would_unmonitor
            + summary.sonarr.would_unmonitor
            + summary.sonarr.would_unmonitor_series
    } else {
        summary.radarr.unmonitored + summary.sonarr.unmonitored + summary.sonarr.series_unmonitored
    };
    let watchlist = if dry {
        summary.watchlist.would_remove
    } else {
        summary.watchlist.removed
    };

    let mut line = format!(
        "{} cleanup: {} duplicate entr{} {}, {} unmonitored, {} watchlist removal{}",
        summary.mode,
        entries,
        if entries == 1 { "y" } else { "ies" },
        if dry { "flagged" } else { "removed" },
        unmonitored,
        watchlist,
        if watchlist == 1 { "" } else { "s" },
    );
    let failures = summary.total_failures();
    if failures > 0 {
        line.push_str(&format!(", {} failure{}", failures, if failures == 1 { "" } else { "s" }));
    }
    if dry {
        line.push_str(" (dry run)");
    }
    line
}
