//! SmartServe Assistant CLI
//!
//! # Commands
//! - `ask <question>`: print the best canned answer (`--json` for score details)
//! - `chat`: interactive session with suggested questions and a typing pause
//! - `suggest`, `catalog`: browse the knowledge base
//! - `register`, `login`, `logout`, `whoami`: toy local sign-in
//!
//! Logging goes to stderr and is off unless `RUST_LOG` is set.

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use smartserve::config::{self, Settings};
use smartserve::{
    AssistantError, AuthOutcome, AuthStore, FileStore, KeyValueStore, KnowledgeStore, Matcher,
    Result,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use tracing::{debug, error, info};

const WELCOME_MESSAGE: &str = "Welcome to SmartServe! I'm your AI assistant, here to help you learn about Nigeria's leading complaint management platform. Feel free to ask me anything about our features, benefits, pricing, or how SmartServe can transform your customer service experience!";

// ============================================================================
// Command Line
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "smartserve", version, about = "SmartServe AI complaint-management assistant")]
struct Cli {
    /// Directory for stored users and session
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Alternate catalog JSON file
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Answer a single question
    Ask {
        /// Question text
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,

        /// Emit JSON with score breakdown
        #[arg(long)]
        json: bool,

        /// Show which entry matched and why
        #[arg(long)]
        explain: bool,
    },
    /// Interactive chat session
    Chat {
        /// Answer immediately without the typing pause
        #[arg(long)]
        no_delay: bool,
    },
    /// List suggested questions
    Suggest,
    /// List every catalog entry
    Catalog,
    /// Create a local account and sign in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
    },
    /// Sign in with an existing account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
}

/// JSON output for `ask --json`
#[derive(Debug, Serialize)]
struct AskOutput {
    question: String,
    answer: String,
    /// Canonical question of the winning entry, if it cleared the threshold
    #[serde(skip_serializing_if = "Option::is_none")]
    matched: Option<String>,
    score: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    evidence: Vec<String>,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("Error: {}", e);
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::new(cli.data_dir, cli.catalog);
    debug!("Settings: {:?}", settings);

    match cli.command {
        Command::Ask {
            question,
            json,
            explain,
        } => {
            let store = load_store(&settings)?;
            ask(&store, &question.join(" "), json, explain)
        }
        Command::Chat { no_delay } => {
            let store = load_store(&settings)?;
            let auth = AuthStore::open(open_storage(&settings)?)?;
            chat(&store, &auth, !no_delay)
        }
        Command::Suggest => {
            let store = load_store(&settings)?;
            for question in store.suggested_questions() {
                println!("  {} {}", "•".cyan(), question);
            }
            Ok(())
        }
        Command::Catalog => {
            let store = load_store(&settings)?;
            print_catalog(&store);
            Ok(())
        }
        Command::Register {
            email,
            password,
            name,
        } => {
            let mut auth = AuthStore::open(open_storage(&settings)?)?;
            let outcome = auth.register(&email, &password, &name)?;
            finish_sign_in(&auth, outcome)
        }
        Command::Login { email, password } => {
            let mut auth = AuthStore::new(open_storage(&settings)?);
            let outcome = auth.login(&email, &password)?;
            finish_sign_in(&auth, outcome)
        }
        Command::Logout => {
            let auth = AuthStore::new(open_storage(&settings)?);
            auth.logout()?;
            println!("Signed out.");
            Ok(())
        }
        Command::Whoami => {
            let auth = AuthStore::new(open_storage(&settings)?);
            match auth.current_session()? {
                Some(user) => println!("{} <{}>", user.name.bold(), user.email),
                None => println!("Not signed in."),
            }
            Ok(())
        }
    }
}

fn open_storage(settings: &Settings) -> Result<FileStore> {
    let dir = settings.data_dir()?;
    debug!("Using data directory {}", dir.display());
    Ok(FileStore::new(dir))
}

fn load_store(settings: &Settings) -> Result<KnowledgeStore> {
    let store = match &settings.catalog {
        Some(path) => KnowledgeStore::from_path(path)?,
        None => KnowledgeStore::builtin()?,
    };
    info!("Catalog ready: {} entries", store.len());
    Ok(store)
}

// ============================================================================
// Commands
// ============================================================================

fn ask(store: &KnowledgeStore, question: &str, json: bool, explain: bool) -> Result<()> {
    let matcher = Matcher::new(store);
    let answer = matcher.find_answer(question);

    let best = matcher.best_match(question);
    let confident = best
        .as_ref()
        .filter(|m| m.is_confident(matcher.weights()));

    if json {
        let output = AskOutput {
            question: question.to_string(),
            answer,
            matched: confident.map(|m| m.entry.question.clone()),
            score: best.as_ref().map(|m| m.total).unwrap_or(0.0),
            evidence: best.as_ref().map(|m| m.evidence.clone()).unwrap_or_default(),
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{}", answer);

    if explain {
        match &best {
            Some(m) => eprintln!(
                "{} #{} {} (keyword {:.2} + similarity {:.2} = {:.2}){}",
                "matched".dimmed(),
                m.index,
                m.entry.question.bold(),
                m.keyword_score,
                m.similarity_score,
                m.total,
                if confident.is_some() {
                    String::new()
                } else {
                    format!(" {}", "below threshold".yellow())
                }
            ),
            None => eprintln!("{}", "no entry scored above zero".dimmed()),
        }
    }

    Ok(())
}

fn chat(store: &KnowledgeStore, auth: &AuthStore<FileStore>, typing_delay: bool) -> Result<()> {
    let matcher = Matcher::new(store);

    println!("{} {}", "SmartServe AI".cyan().bold(), "Complaint Management Assistant".dimmed());
    if let Some(user) = auth.current_session()? {
        println!("{} {}", "Signed in as".dimmed(), user.name.bold());
    }
    println!();
    println!("{}", WELCOME_MESSAGE);
    println!();
    println!("{}", "Suggested questions:".dimmed());
    for question in store.suggested_questions() {
        println!("  {} {}", "•".cyan(), question);
    }
    println!();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{} ", "you>".green().bold());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line?;
        let text = line.trim();

        if text.is_empty() {
            continue;
        }
        if text.eq_ignore_ascii_case("quit") || text.eq_ignore_ascii_case("exit") {
            break;
        }

        if typing_delay {
            print!("{}", "SmartServe is typing...".dimmed());
            io::stdout().flush()?;
            thread::sleep(config::typing_delay());
            print!("\r{}\r", " ".repeat(24));
        }

        let answer = matcher.find_answer(text);
        println!("{} {}", "smartserve>".cyan().bold(), answer);
        println!();
    }

    Ok(())
}

fn finish_sign_in<S: KeyValueStore>(auth: &AuthStore<S>, outcome: AuthOutcome) -> Result<()> {
    match outcome.user {
        Some(user) if outcome.success => {
            auth.set_current_session(&user)?;
            println!(
                "{} Signed in as {} <{}>",
                outcome.message.green(),
                user.name.bold(),
                user.email
            );
            Ok(())
        }
        _ => Err(AssistantError::SignInRejected(outcome.message)),
    }
}

fn print_catalog(store: &KnowledgeStore) {
    for topic in store.topics() {
        println!("{}", topic.to_uppercase().bold());
        for entry in store.entries().iter().filter(|e| e.topic == topic) {
            println!("  {}", entry.question);
            println!("    {}", entry.keywords.join(", ").dimmed());
        }
    }
}
