use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use crcframe_frame::{checksum, Message};
use serde::Serialize;

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
struct MessageOutput {
    index: usize,
    code: u16,
    payload_size: usize,
    checksum: String,
    payload: String,
}

impl MessageOutput {
    fn new(message: &Message, index: usize) -> Self {
        Self {
            index,
            code: message.code,
            payload_size: message.payload.len(),
            checksum: format!("{:#010x}", checksum(&message.payload)),
            payload: payload_preview(&message.payload),
        }
    }
}

#[derive(Serialize)]
struct EncodedOutput {
    code: u16,
    payload_size: usize,
    frame_size: usize,
    frame: String,
}

/// Print one decoded message.
pub fn print_message(message: &Message, index: usize, format: OutputFormat) {
    let out = MessageOutput::new(message, index);
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "CODE", "SIZE", "CRC-32", "PAYLOAD"])
                .add_row(vec![
                    out.index.to_string(),
                    out.code.to_string(),
                    out.payload_size.to_string(),
                    out.checksum,
                    out.payload,
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "#{} code={} size={} crc={} payload={}",
                out.index, out.code, out.payload_size, out.checksum, out.payload
            );
        }
        OutputFormat::Raw => print_raw(&message.payload),
    }
}

/// Print a freshly encoded frame. Pretty prints the wire bytes as hex.
pub fn print_encoded(code: u16, payload_size: usize, wire: &[u8], format: OutputFormat) {
    let out = EncodedOutput {
        code,
        payload_size,
        frame_size: wire.len(),
        frame: hex::encode(wire),
    };
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CODE", "PAYLOAD SIZE", "FRAME SIZE", "FRAME"])
                .add_row(vec![
                    out.code.to_string(),
                    out.payload_size.to_string(),
                    out.frame_size.to_string(),
                    out.frame,
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", out.frame),
        OutputFormat::Raw => print_raw(wire),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}
