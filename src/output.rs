use std::io::{self, Write};

use faq_dedup::{CheckOutcome, CheckStatus, ClusterId, ClusterSummary, DedupError, Result, SimilarityScore};
use serde::Serialize;

/// Result of one CLI command, ready to render.
pub enum Report {
    Check(CheckOutcome),
    Drafted { cluster_id: ClusterId },
    Similarities(Vec<SimilarityScore>),
    Clusters(Vec<ClusterSummary>),
    Reset,
}

pub fn print_report(format: &str, report: &Report) -> Result<()> {
    match format {
        "text" => print_text(&mut io::stdout().lock(), report),
        "json" => print_json(report),
        other => Err(DedupError::InvalidArg(format!(
            "Unknown output format: {other}"
        ))),
    }
}

fn print_text(out: &mut impl Write, report: &Report) -> Result<()> {
    match report {
        Report::Check(outcome) => match outcome.status {
            CheckStatus::New => writeln!(out, "Status: new (stored standalone)")?,
            CheckStatus::Matched => {
                writeln!(out, "Status: matched")?;
                if let Some(id) = outcome.cluster_id {
                    writeln!(out, "Cluster: {id} ({} questions)", outcome.cluster_count)?;
                }
                writeln!(out, "FAQ drafted: {}", yes_no(outcome.faq_drafted))?;
                writeln!(out)?;
                for q in &outcome.similar_questions {
                    writeln!(out, "  - {q}")?;
                }
            }
        },
        Report::Drafted { cluster_id } => {
            writeln!(out, "Cluster {cluster_id} marked as FAQ drafted")?;
        }
        Report::Similarities(scores) => {
            if scores.is_empty() {
                writeln!(out, "No stored questions")?;
            }
            for s in scores {
                writeln!(out, "{:>7.4}  #{:<5} {}", s.similarity, s.id, s.text)?;
            }
        }
        Report::Clusters(clusters) => {
            if clusters.is_empty() {
                writeln!(out, "No clusters")?;
            }
            for c in clusters {
                writeln!(
                    out,
                    "Cluster {} [{}] count={} drafted={}",
                    c.cluster_id,
                    c.topic.as_deref().unwrap_or("-"),
                    c.count,
                    yes_no(c.faq_drafted)
                )?;
                for q in &c.questions {
                    writeln!(out, "  {}  {}", q.created_at.format("%Y-%m-%d %H:%M:%S"), q.text)?;
                }
            }
        }
        Report::Reset => writeln!(out, "All questions and clusters cleared")?,
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cluster_id: Option<ClusterId>,
}

fn print_json(report: &Report) -> Result<()> {
    let out = match report {
        Report::Check(outcome) => serde_json::to_string_pretty(outcome)?,
        Report::Drafted { cluster_id } => serde_json::to_string_pretty(&JsonStatus {
            status: "ok",
            cluster_id: Some(*cluster_id),
        })?,
        Report::Similarities(scores) => serde_json::to_string_pretty(scores)?,
        Report::Clusters(clusters) => serde_json::to_string_pretty(clusters)?,
        Report::Reset => serde_json::to_string_pretty(&JsonStatus {
            status: "cleared",
            cluster_id: None,
        })?,
    };
    println!("{out}");
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
