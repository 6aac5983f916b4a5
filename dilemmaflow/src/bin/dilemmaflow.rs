//! Line-oriented terminal front end for the dilemmaflow pipeline.

use anyhow::{Context, Result};
use dilemmaflow::catalog::stage_names;
use dilemmaflow::prelude::*;
use dilemmaflow::structured::{canvases, swot_options};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

const HELP: &str = "Commands: r <feedback> | a | s [n] | show | q";
const SAVE_HELP: &str = "Commands: w [dir] | show | q";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Refine(String),
    Approve,
    ListOptions,
    Select(usize),
    Show,
    Write(Option<PathBuf>),
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    match head {
        "r" => Command::Refine(rest.to_string()),
        "a" => Command::Approve,
        "s" if rest.is_empty() => Command::ListOptions,
        "s" => rest
            .parse::<usize>()
            .map_or_else(|_| Command::Unknown(line.to_string()), Command::Select),
        "show" => Command::Show,
        "w" if rest.is_empty() => Command::Write(None),
        "w" => Command::Write(Some(PathBuf::from(rest))),
        "q" => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

async fn read_story(lines: &mut Lines<BufReader<Stdin>>) -> Result<Option<String>> {
    println!("Enter the full story or context. Finish with an empty line.");
    let mut story = Vec::new();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() && !story.is_empty() {
            break;
        }
        story.push(line);
    }
    Ok((!story.is_empty()).then(|| story.join("\n")))
}

fn print_log(controller: &StageController) {
    for (index, record) in controller.state().log().iter().enumerate() {
        println!("\n### {}. {}", index + 1, record.stage_name());
        println!("{}", record.response());
        if record.has_feedback() {
            println!("(feedback: {})", record.feedback());
        }
    }
}

fn print_current(controller: &StageController) {
    if let Some(record) = controller.state().current_record() {
        println!("\n=== {} ===", record.stage_name());
        println!("{}", record.response());
    }
    if let Some(selection) = controller.state().branch_selection() {
        println!("(working from: {})", selection.label());
    }
}

fn current_options(controller: &StageController) -> Vec<BranchSelection> {
    controller
        .state()
        .record_for(stage_names::SWOT_ANALYSIS)
        .and_then(|record| swot_options(record.response()).ok())
        .unwrap_or_default()
}

fn save_reports(controller: &StageController, exporter: &ReportExporter, dir: &Path) -> Result<(), ExportError> {
    let log = controller.state().log();
    let path = exporter.write(log, dir, ReportFormat::Text)?;
    println!("✅ Saved successfully at: {}", path.display());

    if let Some(record) = controller.state().record_for(stage_names::BUSINESS_MODEL_CANVAS) {
        match canvases(record.response()) {
            Ok(entries) if !entries.is_empty() => {
                let path = exporter.write_canvases(&entries, dir)?;
                println!("✅ Canvas report saved at: {}", path.display());
            }
            Ok(_) => println!("No Business Model Canvas entries found in output."),
            Err(error) => println!("⚠️ Could not read the Business Model Canvas: {error}"),
        }
    }
    Ok(())
}

/// Saves the finished session, offering a retry or another directory until a
/// save succeeds or the user quits.
async fn finish_session(
    controller: &StageController,
    config: &AppConfig,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<()> {
    let exporter = ReportExporter::new(config.report_file_name.clone());
    let mut dir = config.report_dir.clone();
    loop {
        match save_reports(controller, &exporter, &dir) {
            Ok(()) => return Ok(()),
            Err(error) => {
                tracing::warn!(%error, dir = %dir.display(), "report export failed");
                println!("❌ {error}");
            }
        }

        loop {
            println!("{SAVE_HELP}");
            let Some(line) = lines.next_line().await? else {
                return Ok(());
            };
            match parse_command(&line) {
                Command::Write(Some(new_dir)) => {
                    dir = new_dir;
                    break;
                }
                Command::Write(None) => break,
                Command::Show => print_log(controller),
                Command::Quit => return Ok(()),
                _ => println!("The session is finished; save it or quit."),
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("loading configuration")?;
    init_tracing(&config.log_filter, config.log_json);

    let backend = Arc::new(GeminiBackend::new(config.gemini.clone())?);
    let mut controller = StageController::new(Arc::new(StageCatalog::dilemma_triangle()), backend)
        .with_event_sink(Arc::new(LoggingEventSink::debug()));

    println!("🧭 Dilemma Triangle → Business Model Canvas");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let Some(story) = read_story(&mut lines).await? else {
            return Ok(());
        };
        match controller.submit_input(&story).await {
            Ok(()) => break,
            Err(error) if error.is_rejection() => println!("⚠️ {error}"),
            Err(error) => return Err(error.into()),
        }
    }

    loop {
        if controller.is_finished() {
            println!("\n🎉 All stages completed!");
            return finish_session(&controller, &config, &mut lines).await;
        }

        let stage = controller.current_stage().name().to_string();
        if controller.state().needs_generation() {
            println!("\n⏳ Generating {stage}...");
        }
        controller.ensure_generated().await?;
        print_current(&controller);
        println!("{HELP}");

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };

        let result = match parse_command(&line) {
            Command::Refine(feedback) => controller.refine(&stage, &feedback).await,
            Command::Approve => controller.approve(&stage).await.map(|_| ()),
            Command::ListOptions => {
                let options = current_options(&controller);
                if options.is_empty() {
                    println!("No selectable options yet.");
                }
                for (index, option) in options.iter().enumerate() {
                    println!("  {}. {}", index + 1, option.label());
                }
                Ok(())
            }
            Command::Select(number) => match current_options(&controller).into_iter().nth(number.saturating_sub(1)) {
                Some(selection) => controller.select_branch(selection).await,
                None => {
                    println!("No option {number}.");
                    Ok(())
                }
            },
            Command::Show => {
                print_log(&controller);
                Ok(())
            }
            Command::Write(_) => {
                println!("Reports are saved once every stage is approved.");
                Ok(())
            }
            Command::Quit => return Ok(()),
            Command::Unknown(text) => {
                println!("Unknown command '{text}'. {HELP}");
                Ok(())
            }
        };

        match result {
            Ok(()) => {}
            Err(error) if error.is_rejection() => println!("⚠️ {error}"),
            Err(error) => return Err(error.into()),
        }
    }
}
