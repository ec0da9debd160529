use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};

use justichain::ledger::{Block, Ledger};
use justichain::petition::{PetitionDraft, PetitionStore};

#[derive(Parser)]
#[command(
    name = "justichain",
    about = "Tamper-evident submission log for citizen petitions"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit petition drafts (one JSON object per line) and chain them.
    Submit {
        /// JSONL file of petition drafts.
        input: PathBuf,
        /// Write the resulting chain as pretty JSON.
        #[arg(long)]
        chain_out: Option<PathBuf>,
    },
    /// Audit a chain export.
    Verify {
        /// Chain JSON produced by `submit --chain-out`.
        chain: PathBuf,
    },
    /// List the entries of a chain export.
    Show {
        /// Chain JSON produced by `submit --chain-out`.
        chain: PathBuf,
    },
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn read_chain(path: &Path) -> Vec<Block> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("error: cannot read {}: {err}", path.display());
            std::process::exit(2);
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(blocks) => blocks,
        Err(err) => {
            eprintln!("error: cannot parse {}: {err}", path.display());
            std::process::exit(2);
        }
    }
}

fn submit_cmd(input: &Path, chain_out: Option<&Path>) {
    let raw = match fs::read_to_string(input) {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("error: cannot read {}: {err}", input.display());
            std::process::exit(2);
        }
    };

    let mut store = PetitionStore::new();
    let mut ledger = Ledger::new();

    for (line_no, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let draft: PetitionDraft = match serde_json::from_str(line) {
            Ok(draft) => draft,
            Err(err) => {
                eprintln!("error: line {}: {err}", line_no + 1);
                std::process::exit(2);
            }
        };
        let petition = store.submit(draft, now_ms());
        let block = match ledger.append(&petition.id, petition.created_at, &petition) {
            Ok(block) => block,
            Err(err) => {
                eprintln!("error: line {}: {err}", line_no + 1);
                std::process::exit(2);
            }
        };
        println!(
            "{}  seq={}  digest={}",
            petition.id,
            block.sequence_index,
            block.digest_hex()
        );
    }

    let audit = ledger.verify();
    println!(
        "chained {} petition(s), audit: {}",
        ledger.len(),
        if audit.valid { "OK" } else { "BROKEN" }
    );

    if let Some(path) = chain_out {
        let blocks: Vec<&Block> = ledger.entries().collect();
        let json = serde_json::to_vec_pretty(&blocks).expect("chain json");
        if let Err(err) = fs::write(path, json) {
            eprintln!("error: cannot write {}: {err}", path.display());
            std::process::exit(2);
        }
        println!("Chain exported → {}", path.display());
    }
}

fn verify_cmd(chain: &Path) {
    let ledger = Ledger::from_blocks(read_chain(chain));
    let audit = ledger.verify();
    match audit.broken_at {
        None => println!(
            "verify: OK ({} blocks, tip {})",
            ledger.len(),
            hex::encode(ledger.tip_digest())
        ),
        Some(index) => {
            eprintln!("verify: chain broken at index {index}");
            std::process::exit(2);
        }
    }
}

fn show_cmd(chain: &Path) {
    let ledger = Ledger::from_blocks(read_chain(chain));
    for block in ledger.entries() {
        println!(
            "#{:<4} {}  at={}  digest={}",
            block.sequence_index,
            block.reference_id,
            block.created_at,
            &block.digest_hex()[..16]
        );
    }
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Submit { input, chain_out } => submit_cmd(&input, chain_out.as_deref()),
        Command::Verify { chain } => verify_cmd(&chain),
        Command::Show { chain } => show_cmd(&chain),
    }
}
