//! `stureg` - CLI for the student register
//!
//! This binary is a thin front end over the `student_register` library:
//! each subcommand opens the store, runs one operation, and prints the
//! outcome as a short status message.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use student_register::cli::{
    BackupCommand, Cli, ClearCommand, Command, ConfigCommand, EditCommand, ExportCommand,
    ListCommand, OutputFormat, RemoveCommand, RestoreCommand,
};
use student_register::exchange::{self, ReportInputs, REPORT_FILE_NAME};
use student_register::{
    compute_stats, init_logging, view, AccessContext, Config, EditTarget, Error, RosterRepository,
    RosterStats, Storage, Student, StudentId,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            let failure = Failure::of(&e);
            if let Some(hint) = failure.hint() {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(failure.status())
        }
    }
}

/// How a command failed, as far as the user is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    /// The request was refused for the caller's role or PIN.
    Permission,
    /// The request itself was wrong: bad input, unknown student, bad file.
    Input,
    /// The environment is broken: store, config, or file system.
    System,
}

impl Failure {
    fn of(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<Error>() {
            Some(e) if e.is_permission_error() => Self::Permission,
            Some(e) if e.is_user_error() => Self::Input,
            _ => Self::System,
        }
    }

    fn status(self) -> u8 {
        match self {
            Self::Permission | Self::Input => 1,
            Self::System => 2,
        }
    }

    fn hint(self) -> Option<&'static str> {
        match self {
            Self::Permission => Some("pass --pin with the admin PIN to make changes"),
            Self::Input => None,
            Self::System => Some("run again with -v for details"),
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_from(cli.config.clone())?;

    if let Command::Config(cmd) = cli.command {
        return handle_config(&config, cmd);
    }

    let ctx = AccessContext::from_pin(cli.pin.as_deref(), &config.auth)?;
    let store = Storage::open(config.database_path())?;
    debug!(role = %ctx.role(), store = %store.path().display(), "Ready");

    match cli.command {
        Command::List(cmd) => handle_list(&store, &config, &ctx, &cmd)?,
        Command::Add(cmd) => {
            let saved = RosterRepository::new(&store).save(&ctx, cmd.draft(), EditTarget::New)?;
            println!(
                "Student saved: {} (roll {}, class {})",
                saved.name, saved.roll, saved.student_class
            );
        }
        Command::Edit(cmd) => handle_edit(&store, &ctx, &cmd)?,
        Command::Remove(cmd) => handle_remove(&store, &ctx, &cmd)?,
        Command::Stats(cmd) => {
            let roster = RosterRepository::new(&store).list_all()?;
            let stats = compute_stats(&roster, &config.register.classes);
            if cmd.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_dashboard(&stats);
            }
        }
        Command::Export(cmd) => handle_export(&store, &config, cmd).await?,
        Command::Backup(cmd) => handle_backup(&store, cmd).await?,
        Command::Restore(cmd) => handle_restore(&store, &ctx, &cmd).await?,
        Command::Clear(cmd) => handle_clear(&store, &ctx, &cmd)?,
        Command::Status(cmd) => handle_status(&store, &ctx, cmd.json)?,
        Command::Config(cmd) => handle_config(&config, cmd)?,
    }
    Ok(())
}

fn handle_list(
    store: &Storage,
    config: &Config,
    ctx: &AccessContext,
    cmd: &ListCommand,
) -> anyhow::Result<()> {
    let roster = RosterRepository::new(store).list_all()?;
    let rows = view(&roster, &cmd.query());
    let stats = compute_stats(&roster, &config.register.classes);

    match cmd.format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "role": ctx.role(),
                "students": rows,
                "stats": stats,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Plain => {
            for s in &rows {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    s.id,
                    s.name,
                    s.roll,
                    s.student_class,
                    or_dash(&s.guardian),
                    or_dash(&s.phone),
                    or_dash(&s.notes)
                );
            }
        }
        OutputFormat::Table => {
            print_table(&rows);
            println!();
            print_dashboard(&stats);
            if !ctx.can_edit() {
                println!();
                println!("View only. Pass --pin with the admin PIN to make changes.");
            }
        }
    }
    Ok(())
}

fn handle_edit(store: &Storage, ctx: &AccessContext, cmd: &EditCommand) -> anyhow::Result<()> {
    let repo = RosterRepository::new(store);
    let id: StudentId = cmd.id.parse()?;
    let existing = repo.get(id)?.ok_or_else(|| Error::StudentNotFound {
        id: cmd.id.clone(),
    })?;

    let saved = repo.save(ctx, cmd.apply(existing.to_draft()), EditTarget::Existing(id))?;
    println!(
        "Student updated: {} (roll {}, class {})",
        saved.name, saved.roll, saved.student_class
    );
    Ok(())
}

fn handle_remove(store: &Storage, ctx: &AccessContext, cmd: &RemoveCommand) -> anyhow::Result<()> {
    if RosterRepository::new(store).remove(ctx, &cmd.roll, &cmd.class)? {
        println!("Student removed: roll {}, class {}", cmd.roll, cmd.class);
    } else {
        println!("No student with roll {} in class {}", cmd.roll, cmd.class);
    }
    Ok(())
}

async fn handle_export(store: &Storage, config: &Config, cmd: ExportCommand) -> anyhow::Result<()> {
    let roster = RosterRepository::new(store).list_all()?;
    let inputs = ReportInputs::load(store)?;
    let report = exchange::export_csv(&roster, &inputs, &config.export)?;

    let path = cmd.output.unwrap_or_else(|| PathBuf::from(REPORT_FILE_NAME));
    if path == Path::new("-") {
        print!("{report}");
        return Ok(());
    }
    write_file(&path, report).await?;
    println!("Report written to {} ({} students)", path.display(), roster.len());
    Ok(())
}

async fn handle_backup(store: &Storage, cmd: BackupCommand) -> anyhow::Result<()> {
    let backup = exchange::export_backup(store)?;
    let text = exchange::render_backup(&backup)?;

    let path = cmd.output.unwrap_or_else(|| {
        PathBuf::from(exchange::backup_file_name(
            chrono::Local::now().date_naive(),
        ))
    });
    write_file(&path, text).await?;
    println!("Backup written to {} ({} keys)", path.display(), backup.len());
    Ok(())
}

async fn handle_restore(
    store: &Storage,
    ctx: &AccessContext,
    cmd: &RestoreCommand,
) -> anyhow::Result<()> {
    ctx.require_edit("restore backup")?;

    let contents = tokio::fs::read_to_string(&cmd.file)
        .await
        .with_context(|| format!("failed to read {}", cmd.file.display()))?;
    let written = exchange::import_backup(ctx, store, &contents)?;
    println!("System restored: {written} keys from {}", cmd.file.display());
    Ok(())
}

fn handle_clear(store: &Storage, ctx: &AccessContext, cmd: &ClearCommand) -> anyhow::Result<()> {
    if !cmd.yes {
        println!("This will delete ALL data in {}.", store.path().display());
        println!("Use --yes to confirm.");
        return Ok(());
    }
    let removed = exchange::clear_all(ctx, store)?;
    println!("All data deleted ({removed} keys).");
    Ok(())
}

fn handle_status(store: &Storage, ctx: &AccessContext, json: bool) -> anyhow::Result<()> {
    let stats = store.stats()?;
    let keys = store.keys()?;
    let students = RosterRepository::new(store).list_all()?.len();

    if json {
        let status = serde_json::json!({
            "database_path": store.path(),
            "role": ctx.role(),
            "keys": stats.total_keys,
            "key_names": keys,
            "students": students,
            "last_updated": stats.last_updated,
            "db_size_bytes": stats.db_size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("stureg status");
        println!("-------------");
        println!("Database:      {}", store.path().display());
        println!("Role:          {}", ctx.role());
        println!("Keys:          {} ({})", stats.total_keys, keys.join(", "));
        println!("Students:      {students}");
        match stats.last_updated {
            Some(at) => println!("Last updated:  {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
            None => println!("Last updated:  never"),
        }
        println!("Size:          {} bytes", stats.db_size_bytes);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:  {}", config.database_path().display());
                println!();
                println!("[Register]");
                println!("  Classes:        {}", config.register.classes.join(", "));
                println!();
                println!("[Export]");
                println!("  Subjects:       {}", config.export.subjects.join(", "));
                println!("  Exams:          {}", config.export.exams.join(", "));
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

async fn write_file(path: &Path, contents: String) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("failed to write {}", path.display()))
}

fn print_table(rows: &[Student]) {
    if rows.is_empty() {
        println!("No students found.");
        return;
    }

    let name_width = column_width(rows.iter().map(|s| s.name.as_str()), "Name");
    let guardian_width = column_width(rows.iter().map(|s| s.guardian.as_str()), "Guardian");
    let phone_width = column_width(rows.iter().map(|s| s.phone.as_str()), "Phone");

    println!(
        "{:<36}  {:<name_width$}  {:>5}  {:>5}  {:<guardian_width$}  {:<phone_width$}  Notes",
        "ID", "Name", "Roll", "Class", "Guardian", "Phone"
    );
    for s in rows {
        println!(
            "{:<36}  {:<name_width$}  {:>5}  {:>5}  {:<guardian_width$}  {:<phone_width$}  {}",
            s.id.to_string(),
            s.name,
            s.roll,
            s.student_class,
            or_dash(&s.guardian),
            or_dash(&s.phone),
            or_dash(&s.notes)
        );
    }
}

fn print_dashboard(stats: &RosterStats) {
    print!("Total: {}", stats.total);
    for class in &stats.per_class {
        print!("  |  Class {}: {}", class.class, class.count);
    }
    println!();
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.chars().count()))
        .max()
        .unwrap_or(0)
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
