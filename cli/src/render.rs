use owo_colors::OwoColorize;
use owo_colors::Style;
use truthbot_core::HistoryEntry;
use truthbot_core::TurnRecord;
use truthbot_core::Winner;

fn paint(text: &str, style: Style, color: bool) -> String {
    if color {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

fn percent(confidence: f64) -> u32 {
    (confidence * 100.0).round() as u32
}

fn winner_label(winner: Winner) -> &'static str {
    match winner {
        Winner::First => "participant A",
        Winner::Second => "participant B",
        Winner::Tie => "tie",
    }
}

/// Text block for one completed turn.
pub(crate) fn render_turn(record: &TurnRecord, color: bool) -> String {
    let heading = Style::new().bold();
    let best = Style::new().green().bold();
    let reason = Style::new().yellow();

    let mut out = String::new();
    out.push_str(&paint(&format!("Query: {}", record.query), heading, color));
    out.push('\n');
    out.push_str(&paint(
        &format!(
            "BEST ({}% confidence, {})",
            percent(record.confidence),
            winner_label(record.winner)
        ),
        best,
        color,
    ));
    out.push('\n');
    out.push_str(&record.winning_response);
    out.push_str("\n\n");
    out.push_str(&paint("COMPARISON", heading, color));
    out.push('\n');
    out.push_str(&paint("Participant A:", heading, color));
    out.push('\n');
    out.push_str(&record.response_a);
    out.push('\n');
    out.push_str(&paint("Participant B:", heading, color));
    out.push('\n');
    out.push_str(&record.response_b);
    out.push_str("\n\n");
    out.push_str(&paint(
        &format!("Judge reasoning: {}", record.judge_reason),
        reason,
        color,
    ));
    out
}

/// One line per stored turn, newest first as the service returns them.
pub(crate) fn render_history(entries: &[HistoryEntry], color: bool) -> String {
    if entries.is_empty() {
        return "No turns recorded for this session.".to_string();
    }
    let dim = Style::new().dimmed();
    entries
        .iter()
        .map(|entry| {
            let when = entry.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
            format!(
                "{}  {:<6} {:>3}%  {}",
                paint(&when, dim, color),
                entry.winner,
                percent(entry.confidence),
                entry.query
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
