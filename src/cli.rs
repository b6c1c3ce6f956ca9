use clap::{ArgGroup, Parser};

#[derive(Parser, Debug)]
#[command(version, about = "Generate Xray client config files from VLESS share links", long_about = None)]
#[command(group(ArgGroup::new("source").required(true).args(["link", "generator"])))]
pub struct Args {
    #[arg(short, long, help = "VLESS share link, plain or Base64-wrapped")]
    pub link: Option<String>,

    #[arg(short, long, help = "Generator config, accept file path or URL")]
    pub generator: Option<String>,

    #[arg(
        short,
        long,
        default_value_t = 1080,
        help = "Local SOCKS port used with --link"
    )]
    pub inbound_port: u16,

    #[arg(short, long, help = "Config output path")]
    pub output: Option<String>,

    #[arg(short, long, help = "Emit debug log")]
    pub verbose: bool,
}

/// Output path used with `--link` when `--output` is not given
pub const DEFAULT_LINK_OUTPUT: &str = "config.json";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_args() {
        let args = Args::try_parse_from(["raylink", "--link", "vless://id@host:443"]).unwrap();
        assert_eq!(args.link.as_deref(), Some("vless://id@host:443"));
        assert_eq!(args.inbound_port, 1080);
        assert!(args.output.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_generator_args() {
        let args =
            Args::try_parse_from(["raylink", "-g", "gen.toml", "-o", "out.json", "-v"]).unwrap();
        assert_eq!(args.generator.as_deref(), Some("gen.toml"));
        assert_eq!(args.output.as_deref(), Some("out.json"));
        assert!(args.verbose);
    }

    #[test]
    fn test_source_is_required() {
        assert!(Args::try_parse_from(["raylink"]).is_err());
    }

    #[test]
    fn test_sources_are_exclusive() {
        assert!(
            Args::try_parse_from(["raylink", "-l", "vless://id@host:443", "-g", "gen.toml"])
                .is_err()
        );
    }
}
