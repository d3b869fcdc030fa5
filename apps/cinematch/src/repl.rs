use std::io::Write;

use anyhow::Result;
use client_core::{ConversationController, QuickQuestion, Rejection};
use shared::domain::Role;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::render;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Quit,
    NewConversation,
    Quick(QuickQuestion),
    /// Blank line: send whatever is in the draft.
    SendDraft,
    Text(String),
}

impl Input {
    fn parse(line: &str) -> Self {
        match line.trim() {
            "/quit" | "/exit" => Self::Quit,
            "/new" => Self::NewConversation,
            "/q1" => Self::Quick(QuickQuestion::HowToUse),
            "/q2" => Self::Quick(QuickQuestion::TechStack),
            "" => Self::SendDraft,
            _ => Self::Text(line.to_string()),
        }
    }
}

fn prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}

pub async fn run(chat: &ConversationController) -> Result<()> {
    println!("Cinematch assistant. /q1 and /q2 load quick questions, /new starts over, /quit exits.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shown = 0;

    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match Input::parse(&line) {
            Input::Quit => break,
            Input::NewConversation => {
                chat.reset();
                shown = 0;
                println!("(new conversation)");
                continue;
            }
            Input::Quick(question) => {
                chat.use_quick_question(question);
                println!("draft: {} (press Enter to send)", question.text());
                continue;
            }
            Input::SendDraft => {}
            Input::Text(text) => chat.set_draft(text),
        }

        match chat.begin_submit() {
            Ok(pending) => {
                println!("Thinking...");
                let settlement = pending.run().await;
                debug!(?settlement, "chat turn settled");
            }
            Err(Rejection::EmptyDraft) => {
                if let Some(notice) = chat.view().notice {
                    println!("{notice}");
                }
                continue;
            }
            Err(Rejection::InFlight) => continue,
        }

        let history = chat.view().history;
        for message in history.iter().skip(shown) {
            if message.role() == Role::Assistant {
                println!("{}", render::turn(message));
            }
        }
        shown = history.len();
    }
    Ok(())
}
