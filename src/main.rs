use clap::{Arg, ArgAction, Command};
use musrank::configuration::{create_config, ConfigFolder};
use musrank::startup::{self, Mode};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Command::new("musrank")
        .about("🎵 Enrich your music library with catalogue ratings 🎵")
        .arg(
            Arg::new("debug")
                .long("debug")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log every request and pacing delay"),
        )
        .subcommand(
            Command::new("run").about("🚀 Crawl ratings in the background and serve them over HTTP"),
        )
        .subcommand(Command::new("crawl").about("🕷️ Crawl ratings for the whole library, then exit"))
        .subcommand(Command::new("serve").about("🌐 Serve already crawled ratings over HTTP"))
        .subcommand(
            Command::new("lookup")
                .about("🔎 Print the rating of one album")
                .arg(Arg::new("album").required(true).help("Album slug, e.g. whats-your-pleasure")),
        )
        .subcommand(Command::new("config").about("🛠️ Create the configuration file for musrank"))
        .get_matches();

    init_logging(args.get_flag("debug"));
    let cfg_folder = ConfigFolder::new()?;

    match args.subcommand() {
        Some(("run", _)) => startup::run(cfg_folder, Mode::Run).await,
        Some(("crawl", _)) => startup::run(cfg_folder, Mode::Crawl).await,
        Some(("serve", _)) => startup::run(cfg_folder, Mode::Serve).await,
        Some(("lookup", sub)) => {
            let album = sub
                .get_one::<String>("album")
                .map(String::as_str)
                .unwrap_or_default();
            match startup::lookup(&cfg_folder, album)? {
                Some(rating) => println!(
                    "{} has a rating of {} with {} reviews",
                    album, rating.rating, rating.review_count
                ),
                None => println!("\x1b[33mCould not find album {} in cache\x1b[0m", album),
            }
            Ok(())
        }
        Some(("config", _)) => {
            println!("\x1b[1m\x1b[34mConfiguring musrank...\x1b[0m");
            Ok(create_config(&cfg_folder)?)
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn init_logging(debug: bool) {
    let log_level = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("{},sled=warn", log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn print_usage() {
    println!("\x1b[1m\x1b[31mInvalid command!\x1b[0m\n");
    println!("📖 Available Commands:");
    println!("  \x1b[1m\x1b[32mmusrank run\x1b[0m            - 🚀 Crawl and serve ratings");
    println!("  \x1b[1m\x1b[32mmusrank crawl\x1b[0m          - 🕷️  Crawl ratings, then exit");
    println!("  \x1b[1m\x1b[32mmusrank serve\x1b[0m          - 🌐 Serve crawled ratings");
    println!("  \x1b[1m\x1b[32mmusrank lookup <album>\x1b[0m - 🔎 Print one album's rating");
    println!("  \x1b[1m\x1b[32mmusrank config\x1b[0m         - 🛠️  Create the configuration file");
}
