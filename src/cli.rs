use crate::responder::Mode;
use clap::Parser;

#[derive(Parser)]
#[command(name = "ask-jojo")]
#[command(version = "0.3.0")]
#[command(about = "Exam-tutoring chat core: question viewer + Jojo tutor engine")]
pub struct Args {
    /// Resolution strategy: canned (demo keyword table) or remote (LLM API)
    #[arg(long, value_enum, default_value = "canned")]
    pub mode: Mode,

    /// Model name for the remote completion service
    #[arg(long, default_value = "gpt-4")]
    pub model: String,

    /// Path to a TOML config file (missing file = defaults)
    #[arg(long, default_value = "jojo.toml")]
    pub config: String,

    /// Seconds to wait for a response before the fallback reply
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Launch the web chat UI on localhost instead of the terminal REPL
    #[arg(long)]
    pub web: bool,

    /// Port for the web UI server
    #[arg(long, default_value = "8888")]
    pub port: u16,
}

/// Pick the effective model: an explicit `--model` wins, otherwise the
/// config file's choice (the CLI default doubles as the "not set" marker).
pub fn resolve_model(cli_model: &str, config_model: &str) -> String {
    if cli_model == "gpt-4" {
        config_model.to_string()
    } else {
        cli_model.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_model_default_defers_to_config() {
        assert_eq!(resolve_model("gpt-4", "gpt-3.5-turbo"), "gpt-3.5-turbo");
    }

    #[test]
    fn test_resolve_model_explicit_cli_wins() {
        assert_eq!(resolve_model("gpt-4o-mini", "gpt-3.5-turbo"), "gpt-4o-mini");
    }

    #[test]
    fn test_resolve_model_both_default() {
        assert_eq!(resolve_model("gpt-4", "gpt-4"), "gpt-4");
    }

    #[test]
    fn test_args_parse_minimal() {
        let args = Args::parse_from(["ask-jojo"]);
        assert_eq!(args.mode, Mode::Canned);
        assert_eq!(args.model, "gpt-4");
        assert_eq!(args.config, "jojo.toml");
        assert!(args.timeout.is_none());
        assert!(!args.web);
        assert_eq!(args.port, 8888);
    }

    #[test]
    fn test_args_parse_full() {
        let args = Args::parse_from([
            "ask-jojo",
            "--mode",
            "remote",
            "--model",
            "gpt-4o",
            "--config",
            "custom.toml",
            "--timeout",
            "30",
            "--web",
            "--port",
            "9000",
        ]);
        assert_eq!(args.mode, Mode::Remote);
        assert_eq!(args.model, "gpt-4o");
        assert_eq!(args.config, "custom.toml");
        assert_eq!(args.timeout, Some(30));
        assert!(args.web);
        assert_eq!(args.port, 9000);
    }

    #[test]
    fn test_args_parse_mode_canned() {
        let args = Args::parse_from(["ask-jojo", "--mode", "canned"]);
        assert_eq!(args.mode, Mode::Canned);
    }

    #[test]
    fn test_args_parse_mode_remote() {
        let args = Args::parse_from(["ask-jojo", "--mode", "remote"]);
        assert_eq!(args.mode, Mode::Remote);
    }

    #[test]
    fn test_args_parse_invalid_mode_rejected() {
        assert!(Args::try_parse_from(["ask-jojo", "--mode", "oracle"]).is_err());
    }

    #[test]
    fn test_args_default_port() {
        let args = Args::parse_from(["ask-jojo"]);
        assert_eq!(args.port, 8888);
    }

    #[test]
    fn test_args_custom_port() {
        let args = Args::parse_from(["ask-jojo", "--port", "3000"]);
        assert_eq!(args.port, 3000);
    }

    #[test]
    fn test_args_web_flag_default_false() {
        let args = Args::parse_from(["ask-jojo"]);
        assert!(!args.web);
    }

    #[test]
    fn test_args_timeout_parses() {
        let args = Args::parse_from(["ask-jojo", "--timeout", "5"]);
        assert_eq!(args.timeout, Some(5));
    }

    #[test]
    fn test_args_config_path_custom() {
        let args = Args::parse_from(["ask-jojo", "--config", "/etc/jojo.toml"]);
        assert_eq!(args.config, "/etc/jojo.toml");
    }
}
