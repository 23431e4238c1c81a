use std::io::Write;

use anyhow::{Context, anyhow};
use idgen::{Id, SnowflakeId};
use serde_json::json;

use super::config::{InputFormat, OutputFormat};

/// Writes `count` IDs pulled from `next`, one per line.
pub fn generate<W, F>(
    out: &mut W,
    count: usize,
    format: OutputFormat,
    mut next: F,
) -> anyhow::Result<()>
where
    W: Write,
    F: FnMut() -> anyhow::Result<Id>,
{
    for _ in 0..count {
        let id = next()?;
        let sf = *id
            .raw::<SnowflakeId>()
            .ok_or_else(|| anyhow!("generator did not produce a snowflake ID: {id}"))?;

        match format {
            OutputFormat::Decimal => writeln!(out, "{sf}")?,
            OutputFormat::Padded => writeln!(out, "{}", sf.to_padded_string())?,
            OutputFormat::Base2 => writeln!(out, "{}", sf.to_base2())?,
            OutputFormat::Base32 => writeln!(out, "{}", sf.encode_base32())?,
            OutputFormat::Base36 => writeln!(out, "{}", sf.to_base36())?,
            OutputFormat::Base58 => writeln!(out, "{}", sf.encode_base58())?,
            OutputFormat::Base64 => writeln!(out, "{}", sf.to_base64())?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, &describe(sf))?;
                writeln!(out)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// Parses `input` in the given text form and writes its decoded fields as
/// pretty JSON.
pub fn decode<W>(out: &mut W, input: &str, format: InputFormat) -> anyhow::Result<()>
where
    W: Write,
{
    let input = input.trim();
    let id = match format {
        InputFormat::Decimal => input.parse::<SnowflakeId>()?,
        InputFormat::Base32 => SnowflakeId::decode_base32(input)?,
        InputFormat::Base36 => SnowflakeId::decode_base36(input)?,
        InputFormat::Base58 => SnowflakeId::decode_base58(input)?,
        InputFormat::Base64 => SnowflakeId::decode_base64(input)?,
    };
    tracing::debug!(?id, "decoded");

    serde_json::to_writer_pretty(&mut *out, &describe(id)).context("writing decoded ID")?;
    writeln!(out)?;
    Ok(())
}

fn describe(id: SnowflakeId) -> serde_json::Value {
    json!({
        "id": id,
        "base32": id.encode_base32(),
        "base58": id.encode_base58(),
        "timestamp": id.timestamp(),
        "unix_millis": id.unix_millis(),
        "node_id": id.node_id(),
        "sequence": id.sequence(),
    })
}
