use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{ArgAction, Parser};
use inkboard::Config;
use inkboard::input::{Board, BoardSettings};
use inkboard::pen::{FilePenStore, PenLimits, PenService};
use inkboard::replay;
use inkboard::storage::{
    FileRecordStore, PersistenceGateway, RecordId, RecordInspection, RecordStore,
    options_from_config,
};

#[derive(Parser, Debug)]
#[command(name = "inkboard")]
#[command(
    version,
    about = "Freehand annotation engine for judging score sheets"
)]
struct Cli {
    /// Record whose board is used
    #[arg(long, short = 'r', value_name = "ID", default_value = "default")]
    record: String,

    /// Replay a JSON action script into the board, then save it
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Show storage details and stroke counts for the record
    #[arg(long, action = ArgAction::SetTrue)]
    inspect: bool,

    /// Remove the stored board (and its backup) for the record
    #[arg(long, action = ArgAction::SetTrue)]
    clear: bool,

    /// Print the saved pen configuration
    #[arg(long, action = ArgAction::SetTrue)]
    pen: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if cli.replay.is_none() && !cli.inspect && !cli.clear && !cli.pen {
        print_usage();
        return Ok(());
    }

    let config = Config::load()?;
    let config_dir = Config::config_dir()?;
    let options = options_from_config(&config.storage, &config_dir)?;
    let store = Arc::new(FileRecordStore::new(options.clone()));
    let record = RecordId::new(cli.record.as_str());

    let pen_store = Arc::new(FilePenStore::at_default_location()?);
    let pen = Arc::new(PenService::new(
        pen_store,
        PenLimits::from_config(&config.drawing),
        config.default_pen(),
    ));

    if cli.clear {
        let outcome = store.clear(&record)?;
        if outcome.removed_record || outcome.removed_backup {
            println!("Cleared board for record '{}'", record);
        } else {
            println!("No stored board for record '{}'", record);
        }
    }

    if let Some(script_path) = cli.replay.as_deref() {
        let actions = replay::load_script(script_path)?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .build()
            .context("Failed to start persistence runtime")?;
        let gateway = PersistenceGateway::with_settings(
            runtime.handle(),
            store.clone() as Arc<dyn RecordStore>,
            options.debounce,
            options.max_persisted,
        );

        let mut board = Board::open(
            record.clone(),
            BoardSettings::from_config(&config),
            pen.clone(),
            gateway,
        )
        .with_context(|| format!("Failed to open board for record '{}'", record))?;

        let report = replay::apply(&mut board, &actions);
        if board.is_drawing() {
            log::warn!("Replay script ended mid-stroke; discarding the unfinished stroke");
        }
        board
            .close()
            .with_context(|| format!("Failed to save board for record '{}'", record))?;

        println!(
            "Replayed {} actions: {} strokes, {} undoable",
            report.actions, report.strokes, report.undo_depth
        );
    }

    if cli.inspect {
        let inspection = store.inspect(&record)?;
        print_inspection(&record, &inspection);
    }

    if cli.pen {
        let current = pen.get();
        println!("Pen configuration:");
        println!("  Color     : {}", current.color.to_token());
        println!("  Width     : {}", current.stroke_width);
        println!("  Tool      : {}", current.tool_mode);
        println!("  Normal pen: {}", pen.normal_pen_color().to_token());
    }

    Ok(())
}

fn print_inspection(record: &RecordId, inspection: &RecordInspection) {
    println!("Record '{}'", record);
    println!("  File      : {}", inspection.record_path.display());
    if !inspection.exists {
        println!("  Stored    : no");
        return;
    }

    if let Some(size) = inspection.size_bytes {
        println!("  Size      : {} bytes", size);
    }
    if let Some(modified) = inspection.modified {
        let local: chrono::DateTime<chrono::Local> = modified.into();
        println!("  Modified  : {}", local.format("%Y-%m-%d %H:%M:%S"));
    }
    println!(
        "  Compressed: {}",
        if inspection.compressed { "yes" } else { "no" }
    );
    if inspection.backup_exists {
        println!(
            "  Backup    : {} ({} bytes)",
            inspection.backup_path.display(),
            inspection.backup_size_bytes.unwrap_or(0)
        );
    }

    if let Some(counts) = inspection.stroke_counts {
        println!("  Strokes   : {}", counts.total());
        println!("    normal      {}", counts.normal);
        println!("    telestrator {}", counts.telestrator);
        println!("    highlighter {}", counts.highlighter);
        println!("    eraser      {}", counts.eraser);
    }
    if inspection.skipped_entries > 0 {
        println!("  Skipped   : {} unreadable entries", inspection.skipped_entries);
    }
}

fn print_usage() {
    println!("inkboard: Freehand annotation engine for judging score sheets");
    println!();
    println!("Usage:");
    println!("  inkboard --replay FILE [--record ID]   Replay a JSON action script into a board");
    println!("  inkboard --inspect [--record ID]       Show the stored board for a record");
    println!("  inkboard --clear [--record ID]         Remove the stored board for a record");
    println!("  inkboard --pen                         Print the saved pen configuration");
    println!("  inkboard --help                        Show help");
    println!();
    println!("Files:");
    println!("  Config : ~/.config/inkboard/config.toml");
    println!("  Pen    : ~/.config/inkboard/pen.toml");
    println!("  Boards : ~/.local/share/inkboard/board-<record>.json");
}
