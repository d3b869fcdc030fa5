//! Plain-text rendering of controller views.

use client_core::{presets::RECOMMENDED_PLOT_CHARS, DraftStats, ExamplePlot, Outcome};
use shared::domain::{Message, Role};

pub fn turn(message: &Message) -> String {
    let speaker = match message.role() {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    format!("{speaker}> {}", message.content())
}

pub fn draft_stats(stats: &DraftStats) -> String {
    let hint = if stats.in_recommended_range {
        ""
    } else {
        " (outside the recommended range)"
    };
    format!(
        "{} characters, {}-{} recommended{hint}",
        stats.chars,
        RECOMMENDED_PLOT_CHARS.start(),
        RECOMMENDED_PLOT_CHARS.end()
    )
}

pub fn outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Result(prediction) => {
            let genres = prediction.genres();
            if genres.len() > 1 {
                format!("Predicted genres: {}", genres.join(", "))
            } else {
                format!("Predicted genre: {}", prediction.label())
            }
        }
        Outcome::Error(message) => format!("Error: {message}"),
        Outcome::Empty => "No result.".to_string(),
    }
}

pub fn example(example: ExamplePlot) -> String {
    format!(
        "{} ({} chars)\n  {}\n",
        example.name(),
        example.text().chars().count(),
        example.text()
    )
}
