use agent_stream::{
    logging::setup_logging, AgentClient, EventCallback, Framing, SessionState, StreamEvent,
};
use anyhow::{bail, Result};
use clap::Parser;

#[derive(Parser)]
#[command(name = "agent-stream", about = "Terminal client for agent event streams")]
struct Args {
    /// Question to send to the agent backend
    query: String,

    /// Base URL of the backend
    #[arg(long, default_value = "http://localhost:8000")]
    url: String,

    /// Wire framing of the endpoint: "json" (concatenated objects) or "sse"
    #[arg(long, default_value = "json")]
    framing: String,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);

    let framing = match args.framing.as_str() {
        "json" => Framing::JsonStream,
        "sse" => Framing::Sse,
        other => bail!("unknown framing '{}', expected 'json' or 'sse'", other),
    };

    let client = AgentClient::new(args.url);
    let mut state = SessionState::new();

    let on_event: EventCallback = Box::new(|event| {
        match event {
            StreamEvent::ToolCall { tool, .. } => println!("[tool] {tool} ..."),
            StreamEvent::ToolResult {
                tool,
                duration_seconds,
                ..
            } => match duration_seconds {
                Some(secs) => println!("[tool] {tool} done in {secs:.1}s"),
                None => println!("[tool] {tool} done"),
            },
            StreamEvent::AgentTransition { agent } => println!("[agent] {agent}"),
            _ => {}
        }
        Ok(())
    });

    if let Err(e) = client
        .run_turn(&args.query, framing, &mut state, Some(&on_event))
        .await
    {
        // A failed transport is terminal for the turn; surface it in the
        // transcript like any other failure.
        state.apply(&StreamEvent::Error {
            message: format!("connection error: {e}"),
        });
        state.finish_turn(None);
    }

    print_summary(&state);
    Ok(())
}

fn print_summary(state: &SessionState) {
    for message in &state.messages {
        match message.role {
            agent_stream::state::Role::User => println!("\n> {}", message.text),
            agent_stream::state::Role::Assistant => {
                println!("\n{}", message.text);
                if let Some(sources) = &message.sources {
                    println!("\nSources:");
                    for source in sources {
                        println!("  - {source}");
                    }
                }
                if let Some(latency) = message.latency_ms {
                    println!("\n({latency} ms)");
                }
            }
        }
    }

    if state.usage.total_tokens > 0 {
        println!(
            "\nTokens: {} prompt, {} completion, {} total",
            state.usage.prompt_tokens, state.usage.candidate_tokens, state.usage.total_tokens
        );
    }

    if let Some(chart) = &state.chart {
        if let Ok(rendered) = serde_json::to_string_pretty(chart) {
            println!("\nChart override:\n{rendered}");
        }
    }
}
