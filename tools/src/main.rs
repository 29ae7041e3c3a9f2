//! orgchart-runner: headless directory runner.
//!
//! Usage:
//!   orgchart-runner --seed 12345 --db directory.db --data-dir ./data
//!   orgchart-runner --seed 12345 --ipc-mode --actor admin-1

use anyhow::Result;
use orgchart_core::{
    config::DirectoryConfig,
    population,
    record::{LevelFilter, NewRecord, RecordFilter},
    store::DirectoryStore,
    DirectoryError, DirectoryService, Level, RequestContext,
};
use serde::Serialize;
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetRecord { id: String },
    ListRecords {
        #[serde(default)]
        filter: RecordFilter,
    },
    ListCandidates { source_id: String },
    Assign { source_id: String, target_id: String },
    Unassign { source_id: String },
    Provision { record: NewRecord },
    Chain { id: String },
    Reports { id: String },
    History { id: String },
    Quit,
}

#[derive(Serialize)]
struct IpcError<'a> {
    error: String,
    kind: &'a str,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let empty = args.iter().any(|a| a == "--empty");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");
    let ctx = match string_arg(&args, "--actor") {
        Some(actor) => RequestContext::for_actor(actor),
        None => RequestContext::anonymous(),
    };

    if !ipc_mode {
        println!("orgchart-runner");
        println!("  seed:      {seed}");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!();
    }

    let db_effective: String = if db == ":memory:" {
        format!(
            "file:orgchart_{}?mode=memory&cache=shared",
            chrono::Utc::now().timestamp()
        )
    } else {
        db.to_string()
    };
    let store = DirectoryStore::open(&db_effective)?;
    store.migrate()?;
    let fresh = store.record_count()? == 0;
    let service = DirectoryService::new(store);

    if fresh && !empty {
        let config = DirectoryConfig::load(data_dir)?;
        population::populate(&service, &config, seed, &ctx)?;
    }

    if ipc_mode {
        run_ipc_loop(&service, &ctx)?;
    } else {
        print_summary(&service)?;
    }

    Ok(())
}

fn run_ipc_loop(service: &DirectoryService, ctx: &RequestContext) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let reply = IpcError {
                    error: e.to_string(),
                    kind: "bad_command",
                };
                writeln!(stdout, "{}", serde_json::to_string(&reply)?)?;
                stdout.flush()?;
                continue;
            }
        };

        if matches!(cmd, IpcCommand::Quit) {
            break;
        }
        let reply = match handle_command(service, ctx, cmd) {
            Ok(value) => value,
            Err(e) => serde_json::to_value(IpcError {
                error: e.to_string(),
                kind: e.kind(),
            })?,
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(
    service: &DirectoryService,
    ctx: &RequestContext,
    cmd: IpcCommand,
) -> Result<serde_json::Value, DirectoryError> {
    let value = match cmd {
        IpcCommand::GetRecord { id } => serde_json::to_value(service.get_record(&id)?)?,
        IpcCommand::ListRecords { filter } => serde_json::to_value(service.list_records(&filter)?)?,
        IpcCommand::ListCandidates { source_id } => {
            serde_json::to_value(service.list_candidates(&source_id)?)?
        }
        IpcCommand::Assign {
            source_id,
            target_id,
        } => serde_json::to_value(service.assign_supervisor(&source_id, &target_id, ctx)?)?,
        IpcCommand::Unassign { source_id } => {
            serde_json::to_value(service.unassign_supervisor(&source_id, ctx)?)?
        }
        IpcCommand::Provision { record } => serde_json::to_value(service.provision(record, ctx)?)?,
        IpcCommand::Chain { id } => serde_json::to_value(service.supervisor_chain(&id)?)?,
        IpcCommand::Reports { id } => serde_json::to_value(service.direct_reports(&id)?)?,
        IpcCommand::History { id } => serde_json::to_value(service.assignment_history(&id)?)?,
        IpcCommand::Quit => serde_json::Value::Null,
    };
    Ok(value)
}

fn print_summary(service: &DirectoryService) -> Result<()> {
    let store = service.store();
    let total = store.record_count()?;
    let supervised = store.supervised_count()?;

    println!("=== DIRECTORY SUMMARY ===");
    println!("  records:      {total}");
    println!("  supervised:   {supervised}");
    println!("  unsupervised: {}", total - supervised);
    println!("  departments:  {}", service.departments()?.len());

    println!();
    println!("=== HEADCOUNT BY LEVEL ===");
    for (level, count) in store.count_by_level()? {
        let name = level.map(Level::as_str).unwrap_or("unassigned");
        println!("  {name:<11} {count}");
    }

    println!();
    println!("=== OPEN SEATS (records with no supervisor) ===");
    for level in Level::ALL.into_iter().skip(1) {
        let filter = RecordFilter {
            level: Some(LevelFilter::Exactly(level)),
            ..Default::default()
        };
        let open = service
            .list_records(&filter)?
            .into_iter()
            .filter(|r| !r.is_supervised())
            .count();
        println!("  {level:<11} {open}");
    }
    Ok(())
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
