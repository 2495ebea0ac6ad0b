//! `tpmr sms`: inbox listing and sending.

use tabled::Tabled;
use tpmr_api::{RouterClient, SmsMessage};

use crate::cli::{GlobalOpts, SmsArgs, SmsCommand};
use crate::error::CliError;
use crate::output;

/// Message previews are cut to this many characters in the table.
const PREVIEW_CHARS: usize = 60;

#[derive(Tabled)]
struct SmsRow {
    #[tabled(rename = "#")]
    index: u32,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "Received")]
    received: String,
    #[tabled(rename = "")]
    unread: String,
    #[tabled(rename = "Message")]
    preview: String,
}

impl From<&SmsMessage> for SmsRow {
    fn from(m: &SmsMessage) -> Self {
        Self {
            index: m.index,
            from: m.from.clone(),
            received: m
                .received_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            unread: if m.unread { "new" } else { "" }.into(),
            preview: preview(&m.content),
        }
    }
}

fn preview(content: &str) -> String {
    let flat = content.replace(['\r', '\n'], " ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(PREVIEW_CHARS - 1).collect();
    format!("{cut}…")
}

pub async fn handle(
    client: &mut RouterClient,
    args: SmsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SmsCommand::List { unread } => {
            let mut messages = client.get_sms().await?;
            if unread {
                messages.retain(|m| m.unread);
            }
            let out = output::render_list(global.output, &messages, |m| SmsRow::from(m), |m| {
                m.index.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        SmsCommand::Send { number, text } => {
            client.send_sms(&number, &text).await?;
            if !global.quiet {
                eprintln!("✓ Message sent to {number}");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_messages_are_cut_and_flattened() {
        let text = format!("line one\n{}", "x".repeat(100));
        let p = preview(&text);
        assert_eq!(p.chars().count(), PREVIEW_CHARS);
        assert!(p.starts_with("line one x"));
        assert!(p.ends_with('…'));
        assert_eq!(preview("short"), "short");
    }
}
