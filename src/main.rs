//! Command-line front end for moodlog.

use std::io::{self, BufRead, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use moodlog::infrastructure::paths::CONFIG_FILENAME;
use moodlog::observability::init_tracing;
use moodlog::{initialize, App, Config, JournalEntry, JournalQuery, MoodDimension, SortKey};

#[derive(Parser)]
#[command(name = "moodlog", version)]
#[command(about = "moodlog: a journal that scores the mood of every entry")]
struct Cli {
    /// Directory holding accounts, entries, and the session.
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Config file (default: <data dir>/config.toml).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also print log events to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Create an account and sign in.
    Register {
        name: String,
        email: String,
        /// Password; read from stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign in to an existing account.
    Login {
        email: String,
        /// Password; read from stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out.
    Logout,
    /// Show the signed-in account.
    Whoami,
    /// Write an entry; its mood is scored before it is saved.
    Add {
        title: String,
        /// Entry text; read from stdin when omitted.
        body: Option<String>,
    },
    /// List entries, newest first unless sorted by a mood.
    List {
        /// Keep entries whose title or content contains this text.
        #[arg(long, default_value = "")]
        search: String,
        /// Keep entries scoring at least --min on this mood.
        #[arg(long, value_name = "MOOD")]
        mood: Option<MoodDimension>,
        /// Threshold for --mood.
        #[arg(long, default_value_t = moodlog::app::query::DEFAULT_THRESHOLD)]
        min: i32,
        /// `date` or a mood name.
        #[arg(long, default_value_t = SortKey::Recency)]
        sort: SortKey,
    },
    /// Show one entry with all of its mood scores.
    Show { id: String },
    /// Delete an entry.
    Remove { id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> moodlog::Result<()> {
    let config = load_config(&cli)?;
    let data_dir = config.data_dir()?;
    init_tracing(&config, &data_dir, cli.verbose);

    let mut app = initialize(&config).await?;

    match cli.command {
        Commands::Register { name, email, password } => {
            let password = password_or_stdin(password)?;
            let profile = app.sign_up(&name, &email, &password).await?;
            println!("Registered and signed in as {} <{}>", profile.name, profile.email);
        }
        Commands::Login { email, password } => {
            let password = password_or_stdin(password)?;
            let profile = app.sign_in(&email, &password).await?;
            println!("Signed in as {} <{}>", profile.name, profile.email);
        }
        Commands::Logout => {
            app.sign_out().await?;
            println!("Signed out");
        }
        Commands::Whoami => match app.session().account() {
            Some(profile) => println!("{} <{}>", profile.name, profile.email),
            None => println!("Not signed in"),
        },
        Commands::Add { title, body } => {
            let body = match body {
                Some(body) => body,
                None => {
                    let mut text = String::new();
                    io::stdin().read_to_string(&mut text)?;
                    text
                }
            };
            let entry = app.add_entry(&title, &body).await?;
            println!("Saved {}", entry.id);
            print_moods(&entry);
        }
        Commands::List { search, mood, min, sort } => {
            list(&app, search, mood, min, sort).await?;
        }
        Commands::Show { id } => match app.entry(&id).await? {
            Some(entry) => {
                println!("{}", entry.title);
                println!("{} ({})", entry.date.format("%Y-%m-%d %H:%M"), entry.age(Utc::now()));
                println!();
                println!("{}", entry.content);
                println!();
                print_moods(&entry);
            }
            None => println!("No entry {id}"),
        },
        Commands::Remove { id } => {
            if app.delete_entry(&id).await? {
                println!("Removed {id}");
            } else {
                println!("No entry {id}");
            }
        }
    }

    Ok(())
}

/// Resolves configuration: `--data-dir` beats `MOODLOG_DATA_DIR`, which beats
/// the file's `data_dir`.
fn load_config(cli: &Cli) -> moodlog::Result<Config> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => {
            let base = Config::default().with_env_overrides();
            let base = Config {
                data_dir: cli.data_dir.clone().or(base.data_dir),
                ..base
            };
            base.data_dir()?.join(CONFIG_FILENAME)
        }
    };

    let mut config = Config::load(&path)?.with_env_overrides();
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    Ok(config)
}

fn password_or_stdin(password: Option<String>) -> io::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn list(
    app: &App,
    search: String,
    mood: Option<MoodDimension>,
    min: i32,
    sort: SortKey,
) -> moodlog::Result<()> {
    let mut query = JournalQuery::default().search(search).sort_by(sort);
    if let Some(dimension) = mood {
        query = query.mood_at_least(dimension, min);
    }

    let entries = app.entries(&query).await?;
    if entries.is_empty() {
        println!("No entries");
        return Ok(());
    }

    let now = Utc::now();
    for entry in entries {
        let strongest = entry
            .mood
            .strongest()
            .map(|(dimension, score)| format!("{} {score}", dimension.label()))
            .unwrap_or_default();
        println!(
            "{}  {:<8}  {:<40}  {}",
            entry.id,
            entry.age(now),
            preview(&entry.title, 40),
            strongest
        );
    }
    Ok(())
}

fn print_moods(entry: &JournalEntry) {
    let mut scores: Vec<(MoodDimension, i32)> = entry.mood.iter().collect();
    if scores.is_empty() {
        println!("No mood detected");
        return;
    }
    scores.sort_by(|a, b| b.1.cmp(&a.1));
    for (dimension, score) in scores {
        println!("  {:<10} {score:>2}", dimension.label());
    }
}

fn preview(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}
