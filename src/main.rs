use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;

use interview_coach::{
    export, AudioCapture, CaptureConfig, Config, HttpEvaluationClient, InterviewSession,
    JsonlRecordSink, MicrophoneFactory, Role, StaticIdentity,
};

#[derive(Parser)]
#[command(name = "interview-coach")]
#[command(about = "Practice interview answers in the terminal")]
struct Args {
    /// Config file (name without extension, resolved by the config loader)
    #[arg(long, default_value = "config/interview-coach")]
    config: String,

    /// Role to practice for
    #[arg(long, default_value = "software-engineer")]
    role: Role,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} starting", cfg.service.name);

    let client = Arc::new(HttpEvaluationClient::new(&cfg.remote));
    let sink = Arc::new(JsonlRecordSink::new(&cfg.storage.records_path)?);
    let identity = Arc::new(StaticIdentity::new(cfg.identity.user_id.clone()));

    let capture_config = CaptureConfig {
        sample_rate: cfg.audio.sample_rate,
        channels: cfg.audio.channels,
        max_duration: Duration::from_secs(cfg.audio.max_record_secs),
    };
    let microphone = MicrophoneFactory::create(capture_config.clone());
    let capture = AudioCapture::new(microphone, client.clone(), capture_config);

    let session = InterviewSession::new(client, sink, identity, capture);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let question = match session.start_interview(args.role).await {
            Ok(question) => question,
            Err(e) => {
                eprintln!("Couldn't load the question: {e}");
                break;
            }
        };

        println!("\nQuestion ({}):\n  {}\n", args.role, question);
        println!("Type your answer, \":rec\" to speak it, or \":q\" to quit.");

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let points = match line.trim() {
            ":q" => break,
            ":rec" => match record_answer(&session, &mut lines).await {
                Ok(points) => points,
                Err(e) => {
                    eprintln!("Could not process audio: {e}");
                    continue;
                }
            },
            "" => {
                println!("Please write your answer.");
                continue;
            }
            text => match session.submit_answer(text).await {
                Ok(points) => points,
                Err(e) => {
                    eprintln!("Could not evaluate answer: {e}");
                    continue;
                }
            },
        };

        println!("\nFeedback:");
        for point in &points {
            println!("  - {point}");
        }

        let snapshot = session.snapshot().await;
        if let Some(sentiment) = &snapshot.sentiment {
            println!("Detected tone: {sentiment:?}");
        }

        if confirm(&mut lines, "\nImprove the answer? [y/N]").await? {
            match session.improve_answer().await {
                Ok(improved) => println!("\nImproved answer:\n{improved}"),
                Err(e) => eprintln!("Could not improve answer: {e}"),
            }
        }

        if confirm(&mut lines, "\nExport the report? [y/N]").await? {
            let path = format!("{}_feedback.txt", args.role.as_str().replace(' ', "_"));
            export::export_to_file(&session.snapshot().await, &path)?;
            println!("Report written to {path}");
        }

        if !confirm(&mut lines, "\nAnother question? [y/N]").await? {
            break;
        }
    }

    Ok(())
}

async fn record_answer(
    session: &InterviewSession,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<Vec<String>> {
    let control = session.start_recording().await?;

    println!("Recording (press Enter to stop)...");
    let _ = lines.next_line().await?;
    session.stop_recording().await?;

    let points = control
        .done
        .await
        .context("Recording pipeline ended unexpectedly")??;

    Ok(points)
}

async fn confirm(lines: &mut Lines<BufReader<Stdin>>, prompt: &str) -> Result<bool> {
    println!("{prompt}");
    let answer = lines.next_line().await?;
    Ok(matches!(
        answer.as_deref().map(str::trim),
        Some("y") | Some("Y")
    ))
}
