//! # panelseq
//!
//! Host front-end for the panel sequencer: loads a JSON hardware
//! description, runs sequences against the simulated board and prints the
//! resulting operation trace.
//!
//! # Usage
//!
//! ```bash
//! # Run two sequences, 290ms apart, on virtual time
//! panelseq --board board.json run lcd_init bl_on --gap-ms 290
//!
//! # Same, but actually sleep
//! panelseq --board board.json --realtime run lcd_init
//!
//! # GPIO helpers
//! panelseq --board board.json --preset 45=1 gpio-active gpio_lcd_en
//! panelseq --board board.json gpio-set gpio_lcd_en 0
//!
//! # Repoint a single-reference property
//! panelseq --board board.json update-phandle decon_board panel_b
//! ```
//!
//! Log verbosity follows `RUST_LOG` (e.g. `RUST_LOG=panelseq=debug`).

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};
use tracing_subscriber::EnvFilter;

use panelseq::adapters::board::Board;
use panelseq::adapters::log_sink::LogEventSink;
use panelseq::adapters::sim::{SimBoard, SimOp};
use panelseq::adapters::time::StdTime;
use panelseq::app::ports::Hardware;
use panelseq::{gpio, Device, DeviceTree, Sequencer, SequencerConfig};

/// Panel power-sequencing interpreter
#[derive(Parser, Debug)]
#[command(name = "panelseq")]
#[command(version)]
#[command(about = "Run declarative panel power sequences against a simulated board")]
struct Args {
    /// Hardware description (JSON).
    #[arg(short, long, value_name = "FILE")]
    board: PathBuf,

    /// Sequencer configuration (JSON). Defaults apply when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Build only delay and timer entries, as when no panel is attached.
    #[arg(long)]
    no_panel: bool,

    /// Sleep on the host clock instead of advancing virtual time.
    #[arg(long)]
    realtime: bool,

    /// Name of the node the sequences belong to.  When omitted the board
    /// property is searched for anywhere in the description.
    #[arg(short, long, value_name = "NODE")]
    device: Option<String>,

    /// Preset an input level on the simulated board, e.g. `45=1`.
    #[arg(long, value_name = "LINE=LEVEL", action = clap::ArgAction::Append)]
    preset: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run sequences in order, building each on first use.
    Run {
        #[arg(required = true)]
        sequences: Vec<String>,
        /// Virtual (or real) time to let pass between consecutive runs.
        #[arg(long, default_value_t = 0)]
        gap_ms: u32,
    },
    /// Resolve a GPIO property to its line number.
    GpioLine { property: String },
    /// Read the raw level of a GPIO property.
    GpioValue { property: String },
    /// Read whether a GPIO property is at its active level.
    GpioActive { property: String },
    /// Drive a GPIO property: claim, set, release.
    GpioSet {
        property: String,
        #[arg(value_parser = clap::value_parser!(u8).range(0..=1))]
        value: u8,
    },
    /// Repoint a single-reference property to another node.
    UpdatePhandle { property: String, node: String },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    if let Err(e) = run() {
        error!("{:#}", e);
        eprintln!("panelseq: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let mut tree = load_tree(&args.board)?;
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SequencerConfig::default(),
    };
    if args.no_panel {
        config.panel_present = false;
    }

    let mut sim = SimBoard::from_tree(&tree);
    for preset in &args.preset {
        let (line, level) = parse_preset(preset)?;
        sim.set_level(line, level);
    }

    match args.command {
        Command::Run { sequences, gap_ms } => {
            let device = resolve_device(&tree, args.device.as_deref())?;
            let mut sequencer = Sequencer::new(config);
            if args.realtime {
                let mut board = Board::new(sim, StdTime::new());
                run_sequences(&mut sequencer, &tree, &mut board, &device, &sequences, gap_ms)?;
                print_trace(board.io.trace());
            } else {
                run_sequences(&mut sequencer, &tree, &mut sim, &device, &sequences, gap_ms)?;
                print_trace(sim.trace());
                println!("virtual time: {} ms", sim.now_ns() / 1_000_000);
            }
            for timer in sequencer.timers().iter() {
                println!("timer {}: delay {} ms, armed: {}", timer.name(), timer.delay_ms, timer.is_armed());
            }
        }
        Command::GpioLine { property } => {
            println!("{}", gpio::get_gpio_by_name(&tree, &property)?);
        }
        Command::GpioValue { property } => {
            println!("{}", u8::from(gpio::get_value(&tree, &mut sim, &property)?));
        }
        Command::GpioActive { property } => {
            println!("{}", u8::from(gpio::get_active(&tree, &mut sim, &property)?));
        }
        Command::GpioSet { property, value } => {
            gpio::set_value(&tree, &mut sim, &property, value != 0)?;
            print_trace(sim.trace());
        }
        Command::UpdatePhandle { property, node } => {
            let (old, new) = tree
                .update_phandle_property(&property, &node)
                .with_context(|| format!("cannot repoint {property} to {node}"))?;
            println!("{property}: {old} -> {new}");
        }
    }
    Ok(())
}

fn run_sequences<H: Hardware>(
    sequencer: &mut Sequencer,
    tree: &DeviceTree,
    hw: &mut H,
    device: &Device,
    names: &[String],
    gap_ms: u32,
) -> Result<()> {
    let mut sink = LogEventSink::new();
    for (i, name) in names.iter().enumerate() {
        if i > 0 && gap_ms > 0 {
            hw.sleep_ms(gap_ms);
        }
        info!("run {}", name);
        sequencer
            .run(tree, hw, &mut sink, device, name)
            .with_context(|| format!("sequence {name}"))?;
    }
    Ok(())
}

fn load_tree(path: &Path) -> Result<DeviceTree> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    DeviceTree::from_json(&json).with_context(|| format!("parsing {}", path.display()))
}

fn load_config(path: &Path) -> Result<SequencerConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    SequencerConfig::from_json(&json).with_context(|| format!("loading {}", path.display()))
}

fn resolve_device(tree: &DeviceTree, name: Option<&str>) -> Result<Device> {
    match name {
        None => Ok(Device::new("panel", None)),
        Some(name) => match tree.find_node_by_name(None, name) {
            Some(node) => Ok(Device::new(name, Some(node))),
            None => bail!("no node named {name}"),
        },
    }
}

fn parse_preset(s: &str) -> Result<(u32, bool)> {
    let (line, level) = s
        .split_once('=')
        .with_context(|| format!("preset '{s}' is not LINE=LEVEL"))?;
    let line: u32 = line.trim().parse().with_context(|| format!("bad line in '{s}'"))?;
    let level = match level.trim() {
        "0" => false,
        "1" => true,
        other => bail!("bad level '{other}' in '{s}'"),
    };
    Ok((line, level))
}

fn print_trace(trace: &[SimOp]) {
    for (i, op) in trace.iter().enumerate() {
        let line = match op {
            SimOp::GpioRequest { line, high } => format!("gpio {line} request {}", if *high { "high" } else { "low" }),
            SimOp::GpioFree { line } => format!("gpio {line} free"),
            SimOp::RegulatorEnable { supply } => format!("regulator {supply} enable"),
            SimOp::RegulatorDisable { supply } => format!("regulator {supply} disable"),
            SimOp::PinctrlSelect { device, state } => format!("pinctrl {device} -> {state}"),
            SimOp::BusyWait { ms } => format!("mdelay {ms}"),
            SimOp::Sleep { ms } => format!("msleep {ms}"),
            SimOp::SleepRange { min_us, max_us } => format!("usleep_range {min_us} {max_us}"),
        };
        println!("{i:3}: {line}");
    }
}
