use std::borrow::Cow::{self, Borrowed, Owned};
use std::io::Write as _;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use verde_application::{ChatView, IdentifierView, Shell, Tab, analyze_upload};
use verde_core::plant::split_care_step;
use verde_core::secret::SecretService;
use verde_infrastructure::FileSecretService;
use verde_infrastructure::paths::VerdePaths;
use verde_interaction::{ChatSession, PlantIdentifier};

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: vec![
                "/identify".to_string(),
                "/history".to_string(),
                "/show".to_string(),
                "/tips".to_string(),
                "/chat".to_string(),
                "/plants".to_string(),
            ],
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

/// Prints an identification outcome the way the view currently shows it.
fn render_identifier(view: &IdentifierView) {
    if let Some(message) = view.error() {
        println!("{}", "Analysis Failed".red().bold());
        println!("{}", message.red());
        return;
    }

    let Some(profile) = view.profile() else {
        return;
    };

    println!();
    println!("{}", profile.plant_name.bright_green().bold());
    if !profile.description.is_empty() {
        println!("{}", profile.description.italic());
    }
    if !profile.history.is_empty() {
        println!();
        println!("{}", "A Bit of History".green().bold());
        println!("{}", profile.history);
    }
    if !profile.care_steps.is_empty() {
        println!();
        println!("{}", "Care Steps".green().bold());
        for step in &profile.care_steps {
            match split_care_step(step) {
                Some((category, instruction)) => {
                    println!("  - {} {}", format!("{category}:").bold(), instruction)
                }
                None => println!("  - {step}"),
            }
        }
    }
    println!();
    println!(
        "{}",
        "Type /tips to ask Verde for more follow-up tips.".bright_black()
    );
}

/// Makes sure the chat view is live, greeting any pending handoff exactly
/// once.
fn enter_chat(shell: &mut Shell, chat_view: &mut ChatView) {
    if chat_view.initialize() {
        // First entry into the chat tab: show the welcome.
        if let Some(welcome) = chat_view.messages().first() {
            print_model_message(&welcome.content);
        }
    }

    if let Some(profile) = shell.take_pending() {
        chat_view.greet(&profile);
        if let Some(greeting) = chat_view.messages().last() {
            print_model_message(&greeting.content);
        }
    }
}

fn print_model_message(content: &str) {
    for line in content.lines() {
        println!("{}", line.bright_blue());
    }
}

/// Sends one chat message and prints the streamed reply as it arrives.
async fn run_chat_turn(session: &ChatSession, chat_view: &mut ChatView, input: &str) {
    let Some(text) = chat_view.begin_send(input) else {
        return;
    };

    let mut stream = match session.send(text).await {
        Ok(stream) => stream,
        Err(err) => {
            tracing::debug!("[verde-readline] Chat send failed: {err}");
            chat_view.fail_send();
            if let Some(apology) = chat_view.messages().last() {
                println!("{}", apology.content.red());
            }
            return;
        }
    };

    loop {
        match stream.next_fragment().await {
            Ok(Some(fragment)) => {
                chat_view.apply_fragment(&fragment);
                print!("{}", fragment.bright_blue());
                let _ = std::io::stdout().flush();
            }
            Ok(None) => {
                chat_view.finish_send();
                println!();
                break;
            }
            Err(err) => {
                tracing::debug!("[verde-readline] Chat stream failed: {err}");
                chat_view.fail_send();
                println!();
                if let Some(apology) = chat_view.messages().last() {
                    println!("{}", apology.content.red());
                }
                break;
            }
        }
    }
}

async fn run_identification(identifier: &PlantIdentifier, view: &mut IdentifierView, path: &str) {
    view.begin_analysis();
    println!("{}", "Analyzing your plant...".bright_black());

    match analyze_upload(identifier, path).await {
        Ok((profile, preview)) => view.finish(profile, preview),
        Err(err) => view.fail(err.to_string()),
    }
    render_identifier(view);
}

fn show_history(view: &IdentifierView) {
    if view.history().is_empty() {
        println!("{}", "No identifications yet.".bright_black());
        return;
    }
    println!("{}", "Identification History".green().bold());
    for (index, entry) in view.history().entries().iter().enumerate() {
        println!("  {}. {}", index + 1, entry.profile.plant_name);
    }
}

fn restore_from_history(view: &mut IdentifierView, argument: Option<&str>) {
    let Some(index) = argument.and_then(|raw| raw.parse::<usize>().ok()) else {
        println!("{}", "Usage: /show <number> (see /history)".yellow());
        return;
    };
    let Some(id) = view
        .history()
        .entries()
        .get(index.wrapping_sub(1))
        .map(|entry| entry.id)
    else {
        println!("{}", format!("No history entry #{index}").yellow());
        return;
    };

    view.restore(id);
    render_identifier(view);
}

/// The main entry point for the Verde readline REPL.
///
/// Sets up a rustyline-based REPL that:
/// 1. Resolves Gemini credentials (fatal if none are configured)
/// 2. Provides command completion for the slash commands
/// 3. Drives the identifier and chat views from user input
/// 4. Displays colored output for user, AI, and system messages
#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    // ===== Fail-fast credential check =====
    // The REPL must not start without a configured API key.
    let secrets = FileSecretService::new()?;
    if secrets.load_secrets().await.is_err() && std::env::var("GEMINI_API_KEY").is_err() {
        anyhow::bail!(
            "No Gemini credentials found. Create {} with {{\"gemini\": {{\"api_key\": \"...\"}}}} or set GEMINI_API_KEY.",
            VerdePaths::secret_file()?.display()
        );
    }

    let identifier = PlantIdentifier::try_from_env()?;
    let chat_session = ChatSession::try_from_env()?;

    let mut shell = Shell::new();
    let mut identifier_view = IdentifierView::new();
    let mut chat_view = ChatView::new();

    // ===== REPL Setup =====
    let helper = CliHelper::new();
    let mut rl = Editor::new()?;
    rl.set_helper(Some(helper));

    println!("{}", "=== Verde - Gardening Assistant ===".bright_magenta().bold());
    println!(
        "{}",
        "Type '/identify <photo>' to identify a plant, '/chat' to talk to Verde, or 'quit' to exit."
            .bright_black()
    );
    println!();

    // ===== Main REPL Loop =====
    loop {
        let prompt = match shell.active() {
            Tab::Identifier => "plants>> ",
            Tab::Chat => "chat>> ",
        };
        let readline = rl.readline(prompt);

        match readline {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye! Keep growing!".bright_green());
                    break;
                }

                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                let (command, argument) = match trimmed.split_once(' ') {
                    Some((cmd, rest)) => (cmd, Some(rest.trim())),
                    None => (trimmed, None),
                };

                match command {
                    "/identify" => match argument {
                        Some(path) if !path.is_empty() => {
                            run_identification(&identifier, &mut identifier_view, path).await;
                        }
                        _ => println!("{}", "Usage: /identify <path-to-photo>".yellow()),
                    },
                    "/history" => show_history(&identifier_view),
                    "/show" => restore_from_history(&mut identifier_view, argument),
                    "/tips" => match identifier_view.request_tips() {
                        Some(profile) => {
                            shell.hand_off(profile);
                            enter_chat(&mut shell, &mut chat_view);
                        }
                        None => println!(
                            "{}",
                            "Identify a plant first, then ask for tips.".yellow()
                        ),
                    },
                    "/chat" => {
                        shell.activate(Tab::Chat);
                        enter_chat(&mut shell, &mut chat_view);
                    }
                    "/plants" => shell.activate(Tab::Identifier),
                    _ if shell.active() == Tab::Chat => {
                        println!("{}", format!("> {trimmed}").green());
                        run_chat_turn(&chat_session, &mut chat_view, trimmed).await;
                    }
                    _ => println!(
                        "{}",
                        "Use /identify <photo> here, or /chat to talk to Verde.".bright_black()
                    ),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    Ok(())
}
