use std::path::PathBuf;
use std::process::ExitCode;

use board::ledger::{self, Ledger};
use board::{Format, Reference};
use clap::{Parser, Subcommand};
use solana_client::rpc_client::RpcClient;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::program_error::ProgramError;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signer;
use solana_sdk::signer::keypair::Keypair;
use solana_sdk::transaction::Transaction;
use solana_transaction_status::option_serializer::OptionSerializer;
use solana_transaction_status::UiTransactionEncoding;
use tracing_subscriber::EnvFilter;


/// Default address of the board program.
const PROGRAM_ID: Pubkey = solana_sdk::pubkey!(
    "CjYnjL2CTRPfW2W1yfyUvAhRRkFr6xMTcUa3CHTUDZY8"
);

/// Default JSON RPC endpoint.
const RPC_URL: &str = "http://127.0.0.1:8899";


type Result<T = (), E = Error> = core::result::Result<T, E>;


#[derive(Parser)]
#[command(name = "board-cli", about = "Reads and writes a Solana message board")]
struct Cli {
    /// JSON RPC endpoint of the cluster.
    #[arg(long, env = "BOARD_RPC_URL", default_value = RPC_URL)]
    url: String,

    /// Keypair paying for and signing transactions.  Defaults to
    /// `~/.config/solana/id.json`.
    #[arg(long, env = "BOARD_KEYPAIR")]
    keypair: Option<PathBuf>,

    /// Address of the board program.
    #[arg(long, env = "BOARD_PROGRAM_ID", default_value_t = PROGRAM_ID)]
    program_id: Pubkey,

    /// Size of board accounts’ data.
    #[arg(long, env = "BOARD_CAPACITY", default_value_t = board::CAPACITY)]
    capacity: usize,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Prints records of a board.
    View { account: Pubkey },

    /// Appends a post to a board.
    Post { account: Pubkey, body: String },

    /// Appends a like of record number INDEX (as printed by `view`) of the
    /// SOURCE board.
    Like { account: Pubkey, source: Pubkey, index: u32 },

    /// Appends a like quoting a record given in the form printed by `view`.
    LikeRendered { account: Pubkey, rendered: String },
}


fn main() -> ExitCode {
    init_logging();
    if let Err(err) = run(Cli::parse()) {
        eprintln!("{err}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}


/// Sets up `tracing` output on stderr.  `RUST_LOG` overrides the default
/// `info` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}


/// Executes the program.
fn run(cli: Cli) -> Result {
    let format =
        Format::new(cli.capacity).ok_or(Error::Msg("capacity too small"))?;
    let client = RpcClient::new(cli.url);
    let payer = load_payer(&cli.cmd, cli.keypair)?;
    let ledger = RpcLedger {
        client: &client,
        payer: payer.as_ref(),
        program_id: cli.program_id,
        format,
    };

    match cli.cmd {
        Cmd::View { account } => view(&ledger, &account),
        Cmd::Post { account, body } => {
            let record = board::encode_post(&body)?;
            post(&ledger, &account, &record)
        }
        Cmd::Like { account, source, index } => {
            let record_index =
                index.checked_sub(1).ok_or(Error::Msg("records start at 1"))?;
            let reference = Reference { source, record_index };
            let target = reference.resolve(&ledger)?;
            tracing::info!(
                %reference,
                body = %target.as_record().text(),
                "liking record"
            );
            post(&ledger, &account, &board::encode_like_reference(&reference))
        }
        Cmd::LikeRendered { account, rendered } => {
            let record = board::encode_like(&rendered)?;
            post(&ledger, &account, &record)
        }
    }
}


/// Reads the payer keypair unless the command only reads the board.
fn load_payer(cmd: &Cmd, path: Option<PathBuf>) -> Result<Option<Keypair>> {
    match cmd {
        Cmd::View { .. } => Ok(None),
        _ => read_keypair(path).map(Some),
    }
}

/// Reads keypair from given path or the default Solana CLI location.
fn read_keypair(path: Option<PathBuf>) -> Result<Keypair> {
    let path = match path {
        Some(path) => path,
        None => {
            let home = std::env::var_os("HOME")
                .ok_or(Error::Msg("HOME is not set; use --keypair"))?;
            let mut path = PathBuf::from(home);
            path.push(".config/solana/id.json");
            path
        }
    };
    solana_sdk::signer::keypair::read_keypair_file(path).map_err(Error::from)
}


/// Prints all records of the board.
fn view(ledger: &RpcLedger, account: &Pubkey) -> Result {
    let buffer = ledger.read_buffer(account)?;
    let board = ledger.format().decode(&buffer)?;

    let count = board.advisory_count();
    let records = board.records().count();
    tracing::info!(%account, count, records, "read board");
    if usize::from(count) != records {
        tracing::warn!(count, records, "post count disagrees with records");
    }

    for rendered in board.rendered(account) {
        println!("{rendered}");
        if let Err(err) = rendered.record.kind() {
            tracing::warn!(index = rendered.index, %err, "unrecognised record");
        }
        if let Some(reference) = rendered.record.reference() {
            tracing::debug!(index = rendered.index, %reference, "like");
        }
    }
    println!(
        "Account has used {} out of {} available bytes",
        board.stream_end(),
        board.capacity()
    );
    Ok(())
}


/// Appends record at the current end of the board.
fn post(ledger: &RpcLedger, account: &Pubkey, record: &[u8]) -> Result {
    tracing::info!(%account, len = record.len(), "appending record");
    let end = ledger::append_record(ledger, account, record)?;
    tracing::info!(end, "record appended");
    Ok(())
}


/// Ledger backed by a cluster’s JSON RPC.
struct RpcLedger<'a> {
    client: &'a RpcClient,
    payer: Option<&'a Keypair>,
    program_id: Pubkey,
    format: Format,
}

impl Ledger for RpcLedger<'_> {
    type Error = Error;

    fn format(&self) -> Format { self.format }

    fn read_buffer(&self, account: &Pubkey) -> Result<Vec<u8>> {
        let commitment = self.client.commitment();
        self.client
            .get_account_with_commitment(account, commitment)?
            .value
            .map(|account| account.data)
            .ok_or_else(|| board::Error::AccountNotFound(*account).into())
    }

    fn append(
        &self,
        account: &Pubkey,
        expected_end: usize,
        record: &[u8],
    ) -> Result<usize> {
        let payer = self.payer.ok_or(Error::Msg("keypair required"))?;
        let instruction = board::instruction::append(
            self.program_id,
            *account,
            expected_end,
            record,
        )?;
        send_and_confirm_instruction(self.client, payer, instruction)?;
        Ok(expected_end + record.len())
    }
}


/// Sends a transaction and logs result.
fn send_and_confirm_instruction(
    client: &RpcClient,
    keypair: &Keypair,
    instruction: Instruction,
) -> Result {
    let blockhash = client.get_latest_blockhash()?;
    tracing::debug!(%blockhash, "latest blockhash");

    tracing::info!(program = %instruction.program_id, "sending transaction");

    let message = Message::new_with_blockhash(
        core::slice::from_ref(&instruction),
        Some(&keypair.pubkey()),
        &blockhash,
    );
    let mut tx = Transaction::new_unsigned(message);
    tx.sign(&[&keypair], blockhash);

    let sig = client.send_and_confirm_transaction(&tx)?;
    tracing::info!(%sig, "transaction confirmed");

    let encoding = UiTransactionEncoding::Binary;
    let resp = client.get_transaction(&sig, encoding)?;
    let (slot, tx) = (resp.slot, resp.transaction);
    tracing::info!(slot, "executed");

    // Print log messages
    let log_messages = tx
        .meta
        .map(|meta| meta.log_messages)
        .ok_or(Error::Msg("No transaction metadata"))?;
    if let OptionSerializer::Some(messages) = log_messages {
        for msg in messages {
            println!("{msg}");
        }
        Ok(())
    } else {
        Err(Error::Msg("No log message"))
    }
}


#[derive(derive_more::From, derive_more::Display)]
enum Error {
    Msg(&'static str),
    Board(board::Error),
    Client(solana_client::client_error::ClientError),
    Prog(ProgramError),
    Box(Box<dyn std::error::Error>),
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const MISSING: &str = "/nonexistent/board-cli/id.json";

    #[test]
    fn test_view_needs_no_keypair() {
        let cmd = Cmd::View { account: Pubkey::new_unique() };
        let payer = load_payer(&cmd, Some(MISSING.into())).ok().flatten();
        assert_eq!(None, payer.map(|payer| payer.pubkey()));
    }

    #[test]
    fn test_post_needs_keypair() {
        let cmd = Cmd::Post {
            account: Pubkey::new_unique(),
            body: "hello".into(),
        };
        let res = load_payer(&cmd, Some(MISSING.into()));
        assert!(matches!(res, Err(Error::Box(_))));
    }

    #[test]
    fn test_append_without_payer() {
        let client = RpcClient::new(RPC_URL.to_string());
        let ledger = RpcLedger {
            client: &client,
            payer: None,
            program_id: PROGRAM_ID,
            format: Format::DEFAULT,
        };
        let res = ledger.append(&Pubkey::new_unique(), 2, b"Phi\0");
        assert!(matches!(res, Err(Error::Msg("keypair required"))));
    }
}
