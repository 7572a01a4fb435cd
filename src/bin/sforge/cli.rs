use clap::Parser;

/// The molecule and output path are fixed; only `--help` and `--version`
/// are accepted.
#[derive(Parser)]
#[command(
    name = "sforge",
    about = "Generate a relaxed 3D structure for aspirin and save it as molecule.mol",
    version,
    author
)]
pub struct Cli {}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_arguments_are_accepted() {
        assert!(Cli::try_parse_from(["sforge"]).is_ok());
    }

    #[test]
    fn tuning_flags_and_positionals_are_rejected() {
        assert!(Cli::try_parse_from(["sforge", "CCO"]).is_err());
        assert!(Cli::try_parse_from(["sforge", "--seed", "7"]).is_err());
        assert!(Cli::try_parse_from(["sforge", "-v"]).is_err());
    }
}
