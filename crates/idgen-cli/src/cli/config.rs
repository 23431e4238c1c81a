use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use idgen::NodeId;

/// Upper bound on `generate --count`, so a typo cannot pin a core for
/// minutes.
pub const MAX_COUNT: usize = 10_000_000;

/// Command-line arguments for the `idgen` binary.
///
/// Global options may also come from the environment (or a `.env` file in the
/// working directory).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "idgen",
    version,
    about = "Generate and decode Snowflake-style 64-bit IDs"
)]
pub struct CliArgs {
    /// Node ID encoded into every generated ID, in `[0, 1023]`.
    ///
    /// Each process generating IDs concurrently must use a distinct node ID.
    ///
    /// Environment variable: `IDGEN_NODE_ID`
    #[arg(long, global = true, env = "IDGEN_NODE_ID", default_value_t = 1, allow_negative_numbers = true)]
    pub node_id: i64,

    /// Generator implementation.
    ///
    /// Environment variable: `IDGEN_STRATEGY`
    #[arg(long, global = true, env = "IDGEN_STRATEGY", value_enum, default_value_t = Strategy::Lock)]
    pub strategy: Strategy,

    /// Log output format. Logs go to stderr; filter with `RUST_LOG`.
    ///
    /// Environment variable: `IDGEN_LOG_FORMAT`
    #[arg(long, global = true, env = "IDGEN_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Generate new IDs, one per line.
    Generate {
        /// How many IDs to generate.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Output form of each ID.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Decimal)]
        format: OutputFormat,
    },
    /// Decode an existing ID into its timestamp, node and sequence.
    Decode {
        /// The ID to decode.
        id: String,

        /// Text form of the ID argument.
        #[arg(short, long, value_enum, default_value_t = InputFormat::Decimal)]
        format: InputFormat,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Mutex around the generator state.
    Lock,
    /// Compare-and-swap on a single atomic word.
    Atomic,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Decimal,
    /// 20-digit zero-padded decimal.
    Padded,
    /// 64-character binary.
    Base2,
    /// 13-character Crockford base32.
    Base32,
    /// Lower-case base36.
    Base36,
    Base58,
    /// Standard base64 over the decimal digits.
    Base64,
    /// One JSON object per line with the decoded fields.
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Decimal,
    Base32,
    Base36,
    Base58,
    Base64,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub node_id: NodeId,
    pub strategy: Strategy,
    pub log_format: LogFormat,
    pub command: Command,
}

impl TryFrom<CliArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let node_id = NodeId::new(args.node_id).context("IDGEN_NODE_ID is invalid")?;

        if let Command::Generate { count, .. } = args.command {
            if count == 0 {
                bail!("--count must be greater than 0");
            }
            if count > MAX_COUNT {
                bail!("--count ({count}) exceeds the maximum of {MAX_COUNT}");
            }
        }

        Ok(Self {
            node_id,
            strategy: args.strategy,
            log_format: args.log_format,
            command: args.command,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<AppConfig> {
        let args = CliArgs::try_parse_from(args)?;
        AppConfig::try_from(args)
    }

    #[test]
    fn defaults() {
        let config = parse(&["idgen", "generate"]).unwrap();
        assert_eq!(config.node_id.get(), 1);
        assert_eq!(config.strategy, Strategy::Lock);
        assert_eq!(
            config.command,
            Command::Generate {
                count: 1,
                format: OutputFormat::Decimal
            }
        );
    }

    #[test]
    fn global_options_after_subcommand() {
        let config = parse(&[
            "idgen",
            "generate",
            "-n",
            "5",
            "--format",
            "base32",
            "--node-id",
            "1023",
            "--strategy",
            "atomic",
        ])
        .unwrap();
        assert_eq!(config.node_id.get(), 1023);
        assert_eq!(config.strategy, Strategy::Atomic);
        assert_eq!(
            config.command,
            Command::Generate {
                count: 5,
                format: OutputFormat::Base32
            }
        );
    }

    #[test]
    fn rejects_out_of_range_node_id() {
        for node_id in ["1024", "-1"] {
            let err = parse(&["idgen", "--node-id", node_id, "generate"]).unwrap_err();
            assert!(
                format!("{err:#}").contains("out of range"),
                "unexpected error: {err:#}"
            );
        }
    }

    #[test]
    fn rejects_zero_and_huge_counts() {
        assert!(parse(&["idgen", "generate", "--count", "0"]).is_err());
        let too_many = (MAX_COUNT + 1).to_string();
        assert!(parse(&["idgen", "generate", "--count", &too_many]).is_err());
    }

    #[test]
    fn decode_takes_a_positional_id() {
        let config = parse(&["idgen", "decode", "23953MG16DJDJ", "-f", "base32"]).unwrap();
        assert_eq!(
            config.command,
            Command::Decode {
                id: "23953MG16DJDJ".to_owned(),
                format: InputFormat::Base32
            }
        );

        let config = parse(&["idgen", "decode", "MTIzNDU2Nzg5MA==", "-f", "base64"]).unwrap();
        assert_eq!(
            config.command,
            Command::Decode {
                id: "MTIzNDU2Nzg5MA==".to_owned(),
                format: InputFormat::Base64
            }
        );
    }
}
