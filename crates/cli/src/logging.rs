use avaproof_config::{LogFormat, LogLevel, LoggingConfig};
use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DebugSection {
    /// Proof and delegation construction
    Build,
    /// Verification rules
    Verify,
    /// Peer registry and admission
    Peer,
    /// Startup and query handling
    Node,
}

impl DebugSection {
    fn target(&self) -> &'static str {
        match self {
            DebugSection::Build => "avaproof_core_types",
            DebugSection::Verify => "avaproof_validation",
            DebugSection::Peer => "avaproof_peer",
            DebugSection::Node => "avaproof_node",
        }
    }
}

/// Install the global subscriber. Logs go to stderr, leaving stdout to command output.
///
/// `RUST_LOG`, when set, takes precedence over the configured level and debug sections.
pub fn init(config: LoggingConfig, debug_sections: &[DebugSection]) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives(config.log_level, debug_sections)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match config.log_format {
        LogFormat::Plain => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn directives(level: LogLevel, debug_sections: &[DebugSection]) -> String {
    let mut directive = level.as_str().to_string();

    for section in debug_sections {
        directive.push(',');
        directive.push_str(section.target());
        directive.push_str("=debug");
    }

    directive
}
