use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::*;
use tracing_subscriber::EnvFilter;

use ask_jojo::cli::{resolve_model, Args};
use ask_jojo::config;
use ask_jojo::question::DEMO_QUESTION;
use ask_jojo::responder::{
    CannedResponder, Mode, RemoteResponder, Responder, HINT_REQUEST, STEPS_REQUEST,
};
use ask_jojo::segment::{tokenize, MathDisplay, SegmentKind};
use ask_jojo::{ConversationEngine, EngineConfig, Role, Turn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let cfg = config::load(Path::new(&args.config))?;

    let responder: Box<dyn Responder> = match args.mode {
        Mode::Canned => Box::new(CannedResponder::with_delay(cfg.thinking_delay())),
        Mode::Remote => {
            let model = resolve_model(&args.model, &cfg.model);
            Box::new(RemoteResponder::from_config(&cfg, model)?)
        }
    };

    let timeout = args
        .timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| cfg.response_timeout());
    let engine = Arc::new(ConversationEngine::new(
        responder,
        DEMO_QUESTION.clone(),
        EngineConfig::with_timeout(timeout),
    ));

    if args.web {
        ask_jojo::web::serve(args.port, engine).await?;
        return Ok(());
    }

    repl(engine).await
}

// ---------------------------------------------------------------------------
// Terminal REPL
// ---------------------------------------------------------------------------

async fn repl(engine: Arc<ConversationEngine>) -> Result<(), Box<dyn std::error::Error>> {
    print_header(&engine);
    render_turns(&engine.history());

    let stdin = io::stdin();
    loop {
        print!("{} ", "you>".bright_blue().bold());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();

        let utterance = match input {
            "/quit" | "/exit" => break,
            "/history" => {
                render_turns(&engine.history());
                continue;
            }
            "/hint" => HINT_REQUEST.to_string(),
            "/steps" => STEPS_REQUEST.to_string(),
            _ if input.starts_with("/answer") => {
                let draft = input.trim_start_matches("/answer").trim();
                engine.set_student_answer((!draft.is_empty()).then(|| draft.to_string()));
                println!(
                    "{}",
                    "  noted: your draft answer is part of the context now.".bright_black()
                );
                continue;
            }
            other => other.to_string(),
        };

        if !utterance.trim().is_empty() {
            println!("{}", "Jojo is thinking...".bright_black().italic());
        }

        let before = engine.history().len();
        match engine.submit(&utterance).await {
            Ok(()) => {
                let history = engine.history();
                for turn in &history[before..] {
                    if turn.role == Role::Assistant {
                        render_turn(turn);
                    }
                }
            }
            Err(reason) => {
                println!("{} {}", "!".bright_red().bold(), reason.to_string().bright_red());
            }
        }
    }

    println!("{}", "Bye! Keep practicing.".bright_magenta());
    Ok(())
}

fn print_header(engine: &ConversationEngine) {
    let question = engine.question();
    println!("{}", "ASK JOJO".bright_magenta().bold());
    println!("{}", "=".repeat(50).bright_blue());
    println!(
        "{} {} • {}  {}",
        "Question:".bright_yellow(),
        question.topic,
        question.difficulty,
        question.id.bright_black()
    );
    println!();
    println!("{}", render_line(&question.text));
    println!();
    println!(
        "{}",
        "Commands: /hint /steps /answer <draft> /history /quit".bright_black()
    );
    println!("{}", "=".repeat(50).bright_blue());
}

/// Render one content line with math segments highlighted.
fn render_line(text: &str) -> String {
    let mut out = String::new();
    for segment in tokenize(text) {
        match (segment.kind, segment.display) {
            (SegmentKind::Math, MathDisplay::Block) => {
                out.push('\n');
                out.push_str("    ");
                out.push_str(&segment.content.bright_cyan().bold().to_string());
                out.push('\n');
            }
            (SegmentKind::Math, MathDisplay::Inline) => {
                out.push_str(&segment.content.bright_cyan().to_string());
            }
            _ => out.push_str(&segment.content),
        }
    }
    out
}

fn render_turn(turn: &Turn) {
    let tag = match turn.role {
        Role::User => "you>".bright_blue().bold(),
        Role::Assistant => "jojo>".bright_magenta().bold(),
    };
    println!("{} {}", tag, render_line(&turn.content));
}

fn render_turns(turns: &[Turn]) {
    for turn in turns {
        render_turn(turn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_line_keeps_text_and_math_content() {
        let rendered = render_line("area is $\\pi r^2$ exactly");
        assert!(rendered.contains("area is "));
        assert!(rendered.contains("\\pi r^2"));
        assert!(rendered.contains(" exactly"));
    }

    #[test]
    fn test_render_line_block_math_on_own_line() {
        let rendered = render_line("so $$x = 2$$ done");
        assert!(rendered.contains('\n'));
        assert!(rendered.contains("x = 2"));
    }

    #[test]
    fn test_render_line_plain_text_unchanged_content() {
        let rendered = render_line("no math at all");
        assert!(rendered.contains("no math at all"));
    }
}
