use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fieldguard")]
#[command(
    author,
    version,
    about = "Mask, tokenize, and encrypt fields of JSON-lines records"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply a pipeline to JSON-lines records
    Apply {
        /// Pipeline file (YAML)
        #[arg(short, long)]
        pipeline: PathBuf,

        /// Input file; stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Audit configuration file (YAML)
        #[arg(short, long)]
        audit: Option<PathBuf>,

        /// Comma-separated audit channels, overriding the audit file
        #[arg(long)]
        audit_channels: Option<String>,
    },

    /// List registered actions
    Actions,

    /// Print a pipeline's action tree as JSON
    Describe {
        /// Pipeline file (YAML)
        #[arg(short, long)]
        pipeline: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_apply() {
        let cli = Cli::try_parse_from([
            "fieldguard",
            "apply",
            "--pipeline",
            "pipeline.yaml",
            "--audit-channels",
            "console,database",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Apply {
                pipeline,
                input,
                audit_channels,
                ..
            } => {
                assert_eq!(pipeline, PathBuf::from("pipeline.yaml"));
                assert_eq!(input, None);
                assert_eq!(audit_channels.as_deref(), Some("console,database"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_describe_requires_pipeline() {
        assert!(Cli::try_parse_from(["fieldguard", "describe"]).is_err());
    }
}
