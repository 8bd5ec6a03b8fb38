use clap::{Arg, Command};

fn main() {
    let matches = Command::new("rafmath")
        .about("An interactive arithmetic, boolean and trigonometric expression calculator")
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress the startup banner")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    rafmath::start_repl(matches.get_flag("quiet"));
}
