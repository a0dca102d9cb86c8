use std::fs::{self, OpenOptions};

use crcframe_frame::{encode, FrameWriter};
use tracing::debug;

use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_encoded, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;

    if let Some(path) = &args.output {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(args.append)
            .truncate(!args.append)
            .open(path)
            .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;

        let mut writer = FrameWriter::new(file);
        writer
            .send(args.code, &payload)
            .map_err(|err| frame_error("encode failed", err))?;
        debug!(
            code = args.code,
            payload_size = payload.len(),
            path = %path.display(),
            "frame written"
        );
        return Ok(SUCCESS);
    }

    let wire = encode(args.code, &payload).map_err(|err| frame_error("encode failed", err))?;
    debug!(code = args.code, frame_size = wire.len(), "frame encoded");
    print_encoded(args.code, payload.len(), &wire, format);

    Ok(SUCCESS)
}

fn resolve_payload(args: &EncodeArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(text) = &args.hex {
        return parse_hex(text);
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Ok(Vec::new())
}

pub(crate) fn parse_hex(text: &str) -> CliResult<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&compact).map_err(|err| CliError::new(USAGE, format!("invalid hex input: {err}")))
}
