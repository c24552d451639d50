use std::path::PathBuf;

use crate::error::AppError;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Cli {
    pub help: bool,
    pub fen: Option<String>,
    pub pgn: Option<PathBuf>,
    pub assets: Option<PathBuf>,
    pub settings: Option<PathBuf>,
}

pub fn print_help() {
    println!(
        r#"Chessboard

Usage:
  chessboard [--fen FEN | --pgn PATH] [--assets DIR] [--settings PATH]

Flags:
  --fen FEN         Start from this position instead of the standard one.
  --pgn PATH        Load a game and start at its final position.
  --assets DIR      Directory with piece sprites named wP.png .. bK.png.
                    Missing sprites are drawn as lettered discs.
  --settings PATH   Settings file (default: $CHESSBOARD_SETTINGS_PATH or
                    $XDG_CONFIG_HOME/chessboard/settings.json).
  --help, -h        Show this help.

Keys:
  Drag a piece with the left mouse button to move it.
  Left/Right: take back / replay a move     R: reset
  E: export PGN     L: import PGN
  F: toggle fullscreen     M: minimize     Esc: quit
"#
    );
}

/// Parses arguments (without the program name).
pub fn parse_args<I>(args: I) -> Result<Cli, AppError>
where
    I: IntoIterator<Item = String>,
{
    let mut cli = Cli::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .ok_or_else(|| AppError::Cli(format!("{flag} requires a value")))
        };
        match arg.as_str() {
            "--help" | "-h" => cli.help = true,
            "--fen" => cli.fen = Some(value("--fen")?),
            "--pgn" => cli.pgn = Some(PathBuf::from(value("--pgn")?)),
            "--assets" => cli.assets = Some(PathBuf::from(value("--assets")?)),
            "--settings" => cli.settings = Some(PathBuf::from(value("--settings")?)),
            other => return Err(AppError::Cli(format!("unknown argument: {other}"))),
        }
    }

    if cli.fen.is_some() && cli.pgn.is_some() {
        return Err(AppError::Cli("cannot combine --fen and --pgn".to_string()));
    }
    Ok(cli)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_every_flag() {
        let cli = parse_args(args(&["--fen", "8/8/8/8/8/8/8/K6k w - - 0 1", "--assets", "sprites"]))
            .expect("valid args");
        assert_eq!(cli.fen.as_deref(), Some("8/8/8/8/8/8/8/K6k w - - 0 1"));
        assert_eq!(cli.assets, Some(PathBuf::from("sprites")));
        assert!(!cli.help);
    }

    #[test]
    fn missing_value_is_an_error() {
        assert!(matches!(parse_args(args(&["--pgn"])), Err(AppError::Cli(_))));
    }

    #[test]
    fn fen_and_pgn_are_exclusive() {
        let err = parse_args(args(&["--fen", "x", "--pgn", "y"])).unwrap_err();
        assert!(err.to_string().contains("cannot combine"));
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(parse_args(args(&["--frobnicate"])).is_err());
    }
}
