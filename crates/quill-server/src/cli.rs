use clap::{Arg, ArgAction, Command};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Serve,
    InitDb,
}

pub fn new() -> Command {
    Command::new("quill")
        .about("Minimal multi-user blog")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(Command::new("serve").about("Run the HTTP server (default)"))
        .subcommand(Command::new("init-db").about("Clear existing data and create new tables"))
        .arg(
            Arg::new("database")
                .short('d')
                .long("database")
                .help("Path to the SQLite database file")
                .env("QUILL_DATABASE")
                .global(true)
                .action(ArgAction::Set),
        )
}

pub fn dispatch(matches: &clap::ArgMatches) -> Action {
    match matches.subcommand_name() {
        Some("init-db") => Action::InitDb,
        _ => Action::Serve,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default() {
        let matches = new().try_get_matches_from(["quill"]).unwrap();
        assert_eq!(dispatch(&matches), Action::Serve);
    }

    #[test]
    fn init_db_subcommand() {
        let matches = new().try_get_matches_from(["quill", "init-db"]).unwrap();
        assert_eq!(dispatch(&matches), Action::InitDb);
    }

    #[test]
    fn database_flag_after_subcommand() {
        let matches = new()
            .try_get_matches_from(["quill", "init-db", "--database", "/tmp/x.sqlite"])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>("database").map(String::as_str),
            Some("/tmp/x.sqlite")
        );
    }
}
