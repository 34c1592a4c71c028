use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use vlpctl_session::Session;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ChannelOutput {
    id: usize,
    intensity: u8,
    state: &'static str,
}

#[derive(Serialize)]
struct StatusOutput {
    controller: Option<String>,
    channels: Vec<ChannelOutput>,
}

/// A frame encoded offline by the `frame` command.
#[derive(Debug, Serialize)]
pub struct FrameOutput {
    pub channel: usize,
    pub index: u8,
    pub body: String,
    pub checksum: String,
    pub checksum_modulus: u32,
    #[serde(skip)]
    pub wire: Vec<u8>,
}

impl FrameOutput {
    fn escaped(&self) -> String {
        self.wire.escape_ascii().to_string()
    }
}

fn status_output(session: &Session) -> StatusOutput {
    StatusOutput {
        controller: session.address().map(ToString::to_string),
        channels: session
            .channels()
            .iter()
            .enumerate()
            .map(|(index, channel)| ChannelOutput {
                id: index + 1,
                intensity: channel.intensity(),
                state: channel.state().as_str(),
            })
            .collect(),
    }
}

pub fn print_status(session: &Session, format: OutputFormat) {
    println!("{}", render_status(&status_output(session), format));
}

fn render_status(out: &StatusOutput, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string()),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHANNEL", "STATE", "INTENSITY"]);
            for channel in &out.channels {
                table.add_row(vec![
                    channel.id.to_string(),
                    channel.state.to_string(),
                    channel.intensity.to_string(),
                ]);
            }
            table.to_string()
        }
        OutputFormat::Pretty => out
            .channels
            .iter()
            .map(|c| format!("channel={} state={} intensity={}", c.id, c.state, c.intensity))
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Raw => out
            .channels
            .iter()
            .map(|c| c.intensity.to_string())
            .collect::<Vec<_>>()
            .join(" "),
    }
}

pub fn print_frame(out: &FrameOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let mut value = serde_json::to_value(out).unwrap_or(serde_json::Value::Null);
            if let Some(map) = value.as_object_mut() {
                map.insert("frame".into(), out.escaped().into());
            }
            println!("{value}");
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHANNEL", "BODY", "CHECKSUM", "FRAME"])
                .add_row(vec![
                    out.channel.to_string(),
                    out.body.clone(),
                    out.checksum.clone(),
                    out.escaped(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "channel={} body={} checksum={} frame={}",
                out.channel,
                out.body,
                out.checksum,
                out.escaped()
            );
        }
        OutputFormat::Raw => {
            let mut stdout = std::io::stdout();
            let _ = stdout.write_all(&out.wire);
            let _ = stdout.flush();
        }
    }
}
