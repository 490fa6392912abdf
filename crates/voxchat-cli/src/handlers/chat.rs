//! Chat command handler.
//!
//! Runs an interactive terminal session against a running proxy. The
//! terminal has neither speech capability, so the session runs in its
//! degraded mode: each typed line is fed in as a recognition hypothesis
//! and submitted, and replies are printed instead of spoken.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use voxchat_core::{MessageRole, Settings};
use voxchat_gateway::HttpChatGateway;
use voxchat_voice::{
    ChatSession, NullRecognizer, NullSynthesizer, SessionCommand, SessionConfig, SessionEvent,
};

/// Execute the chat command.
///
/// # Arguments
///
/// * `settings` - Loaded application settings
/// * `endpoint` - Optional chat endpoint override
/// * `no_speak` - Disable auto-speak regardless of settings
pub async fn execute(settings: &Settings, endpoint: Option<String>, no_speak: bool) -> Result<()> {
    let mut settings = settings.clone();
    if let Some(endpoint) = endpoint {
        settings.chat_endpoint = Some(endpoint);
    }
    if no_speak {
        settings.auto_speak = Some(false);
    }

    let gateway = Arc::new(HttpChatGateway::from_settings(&settings)?);
    println!("Chatting via {}", gateway.endpoint());
    println!("Type a message and press Enter. Commands: /stop /pause /resume /replay N /dismiss /quit");

    let (session, mut events) = ChatSession::new(
        Box::new(NullRecognizer),
        Box::new(NullSynthesizer),
        gateway,
        SessionConfig::from_settings(&settings),
    );
    let commands = session.commands();
    let runner = tokio::spawn(session.run());

    // Print turns and failures as the session emits them.
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                SessionEvent::MessageAppended { message, .. }
                    if message.role == MessageRole::Assistant =>
                {
                    println!("assistant> {}", message.content);
                }
                SessionEvent::SendFailed { reason } => {
                    eprintln!("[send failed: {reason}] (/dismiss to clear)");
                }
                _ => {}
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        match line.as_str() {
            "" => {}
            "/quit" => break,
            "/stop" => commands.send(SessionCommand::StopSpeaking),
            "/pause" => commands.send(SessionCommand::PauseSpeaking),
            "/resume" => commands.send(SessionCommand::ResumeSpeaking),
            "/dismiss" => commands.send(SessionCommand::DismissError),
            _ => {
                if let Some(rest) = line.strip_prefix("/replay ") {
                    match rest.trim().parse() {
                        Ok(index) => commands.send(SessionCommand::Replay { index }),
                        Err(_) => eprintln!("usage: /replay <turn index>"),
                    }
                } else {
                    commands.send(SessionCommand::TranscriptUpdated {
                        segments: vec![line],
                    });
                    commands.send(SessionCommand::Send);
                }
            }
        }
    }

    commands.send(SessionCommand::Shutdown);
    runner.await?;
    printer.await?;
    Ok(())
}
