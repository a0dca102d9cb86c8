use std::fs::{self, File};
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

use crcframe_frame::{FrameConfig, FrameReader};
use tracing::debug;

use crate::cmd::encode::parse_hex;
use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let source = open_input(args.input.as_deref(), args.hex)?;
    let config = FrameConfig {
        max_payload_size: args.max_payload,
        ..FrameConfig::default()
    };
    let mut reader = FrameReader::with_config(source, config);

    let limit = args.count.unwrap_or(usize::MAX);
    let mut decoded = 0usize;
    for result in reader.messages().take(limit) {
        let message =
            result.map_err(|err| frame_error(&format!("frame {decoded} rejected"), err))?;
        print_message(&message, decoded, format);
        decoded = decoded.saturating_add(1);
    }

    debug!(frames = decoded, "decode finished");
    Ok(SUCCESS)
}

fn open_input(path: Option<&Path>, hex: bool) -> CliResult<Box<dyn Read>> {
    let path = path.filter(|p| p.as_os_str() != "-");

    if hex {
        let text = match path {
            Some(path) => fs::read_to_string(path)
                .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?,
            None => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .map_err(|err| io_error("failed reading stdin", err))?;
                text
            }
        };
        return Ok(Box::new(Cursor::new(parse_hex(&text)?)));
    }

    match path {
        Some(path) => {
            let file = File::open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(std::io::stdin())),
    }
}
