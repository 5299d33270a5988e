//! Byte-machine simulator CLI.
//!
//! This binary is the command-line front end for the simulation core. It
//! performs:
//! 1. **Program loading:** reads one encoded instruction bit pattern per
//!    line (blank lines and `#` comments ignored).
//! 2. **Execution:** unlimited-speed budgeted slices, or a timed tick loop
//!    when a clock frequency is set.
//! 3. **Reporting:** output bytes as they happen, then a register dump and
//!    run statistics at exit.

use std::time::Duration;
use std::{fs, process, thread};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bytesim_core::common::{Flag, Word};
use bytesim_core::core::registers::Snapshot;
use bytesim_core::soc::io::IoDevice;
use bytesim_core::{Config, Machine, MachineMode};

#[derive(Parser, Debug)]
#[command(
    name = "bytesim",
    author,
    version,
    about = "Byte-oriented stored-program computer simulator",
    long_about = "Run an encoded program on the simulated machine.\n\nPrograms are text files with one instruction bit pattern per line:\n14 bits in standard mode, a header byte plus operand bytes in expanded mode.\n\nExamples:\n  bytesim run demos/add.bin\n  bytesim run --expanded --hz 100 demos/count.bin\n  bytesim run --input 5,7 demos/sum.bin"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run an encoded program file to completion.
    Run {
        /// Program file: one instruction bit pattern per line.
        file: String,

        /// Use the 32-bit sparse expanded mode instead of standard mode.
        #[arg(long)]
        expanded: bool,

        /// Clock frequency in Hz; omit or pass 0 for unlimited speed.
        #[arg(long)]
        hz: Option<u64>,

        /// JSON configuration file; flags override its values.
        #[arg(long)]
        config: Option<String>,

        /// Input bytes staged before the run, comma separated.
        #[arg(long, value_delimiter = ',')]
        input: Vec<u8>,
    },
}

/// Prints every output byte to stdout as it arrives.
struct ConsoleDevice;

impl IoDevice for ConsoleDevice {
    fn output(&mut self, value: &Word) -> Option<u8> {
        println!("[out] {} ({value})", value.to_u64());
        None
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            file,
            expanded,
            hz,
            config,
            input,
        } => cmd_run(&file, expanded, hz, config.as_deref(), &input),
    }
}

/// Builds the machine from config and flags, loads the program, runs it to
/// completion, and prints the register dump and statistics.
fn cmd_run(file: &str, expanded: bool, hz: Option<u64>, config: Option<&str>, input: &[u8]) {
    let mut config = match config {
        Some(path) => read_config(path),
        None => Config::default(),
    };
    if expanded {
        config.mode = MachineMode::Expanded;
    }
    if let Some(hz) = hz {
        config.clock_hz = hz;
    }

    let program = read_program(file);
    println!(
        "[*] {}: {} instructions, {:?} mode, {}",
        file,
        program.len(),
        config.mode,
        if config.clock_hz == 0 {
            "unlimited speed".to_string()
        } else {
            format!("{} Hz", config.clock_hz)
        }
    );

    let mut machine = Machine::with_device(config.clone(), Box::new(ConsoleDevice));
    if let Err(e) = machine.load_program(&program) {
        eprintln!("Error loading {file}: {e}");
        process::exit(1);
    }
    for &byte in input {
        machine.receive_input(byte);
    }

    let result = if config.clock_hz == 0 {
        machine.run_to_halt()
    } else {
        timed_loop(&mut machine, config.clock_hz)
    };
    if let Err(fault) = result {
        eprintln!("\n[!] FATAL: {fault}");
        dump_registers(&machine.snapshot());
        machine.stats().print();
        process::exit(1);
    }

    dump_registers(&machine.snapshot());
    machine.stats().print();
}

/// Ticks the clock line at the configured frequency until the run ends.
fn timed_loop(machine: &mut Machine, hz: u64) -> Result<(), bytesim_core::Fault> {
    let period = Duration::from_secs_f64(1.0 / hz as f64);
    while !machine.is_halted() {
        let _ = machine.tick()?;
        thread::sleep(period);
    }
    Ok(())
}

fn read_config(path: &str) -> Config {
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading config {path}: {e}");
        process::exit(1);
    });
    serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("Error parsing config {path}: {e}");
        process::exit(1);
    })
}

/// Reads a program file: one bit pattern per line, `#` comments and blank
/// lines skipped.
fn read_program(path: &str) -> Vec<String> {
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading program {path}: {e}");
        process::exit(1);
    });
    text.lines()
        .map(|line| {
            line.split('#')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

fn dump_registers(snap: &Snapshot) {
    println!("--- registers ---");
    println!("  pc:  {:>10}  {}", snap.pc.to_u64(), snap.pc);
    println!("  mar: {:>10}  {}", snap.mar.to_u64(), snap.mar);
    println!("  mdr: {:>10}  {}", snap.mdr.to_u64(), snap.mdr);
    println!("  acc: {:>10}  {}", snap.acc.to_u64(), snap.acc);
    println!("  cir: {:>10}  {}", snap.cir.to_u64(), snap.cir);
    let flags: String = Flag::ALL
        .iter()
        .map(|f| {
            if snap.status[f.index()] {
                f.to_string()
            } else {
                "-".to_string()
            }
        })
        .collect();
    println!("  status: {flags}");
}
