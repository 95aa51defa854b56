use std::io::{self, Write};

use opsagent::{Assistant, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("opsagent=info")),
        )
        .init();

    let query = match read_query() {
        Some(query) => query,
        None => {
            eprintln!("Usage: opsagent \"<your query>\"");
            std::process::exit(2);
        }
    };

    let config = Config::from_env();
    let assistant = match Assistant::new(&config) {
        Ok(assistant) => assistant,
        Err(e) => {
            eprintln!("Startup failed: {e}");
            std::process::exit(1);
        }
    };

    let outcome = assistant.run(&query).await;

    if let Some(error) = &outcome.plan.error {
        eprintln!("Planning failed: {error}");
    } else {
        println!(
            "Plan: {} step(s); execution: {}/{} successful",
            outcome.plan.steps.len(),
            outcome.execution.steps_completed,
            outcome.execution.total_steps
        );
    }

    println!("\n{}", outcome.verification.formatted_answer);

    if !outcome.verification.failed_steps.is_empty() {
        println!("\nFailed steps:");
        for step in &outcome.verification.failed_steps {
            println!(
                "- {}: {}",
                step.action,
                step.error.as_deref().unwrap_or("Unknown error")
            );
        }
    }

    if !outcome.verification.suggestions.is_empty() {
        println!("\nSuggestions:");
        for suggestion in &outcome.verification.suggestions {
            println!("- {suggestion}");
        }
    }
}

/// One query per invocation: from argv, or prompted on a TTY.
fn read_query() -> Option<String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        return Some(args.join(" "));
    }

    print!("Enter your query: ");
    io::stdout().flush().ok()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line).ok()?;
    let line = line.trim().to_string();
    (!line.is_empty()).then_some(line)
}
