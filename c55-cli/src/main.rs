//! This crate provides the `c55` command line tool to inspect, convert and encode stored map
//! blocks and single nodes.

mod config_file;

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use c55_core::{ContentId, MapBlockPos, MapNode};
use c55_wire::{
    Compression, StoredMapBlock, deserialize_map_block, serialize_map_block, serialize_node,
    types::BlockLayout,
};
use clap::{Parser, Subcommand};
use config_file::{CompressionKind, Settings};
use log::{LevelFilter, debug, info, warn};

/// c55 - inspect, convert and encode c55 map blocks and nodes
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file with one `key = value` per line
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (up to -vv)
    #[arg(short, long, default_value_t = 0, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a stored map block and print what it contains
    Inspect {
        /// The stored block
        file: PathBuf,
    },
    /// Decode a stored map block and store it again with another version or compression
    Convert {
        /// The stored block
        input: PathBuf,
        /// Where to write the converted block
        output: PathBuf,
        /// Serialization version to write
        #[arg(long)]
        ser_fmt: Option<u8>,
        /// Compression of the written sections
        #[arg(long, value_enum)]
        compression: Option<CompressionKind>,
        /// Compression level
        #[arg(long)]
        level: Option<i32>,
    },
    /// Print the serialized bytes of a single node as hex
    Node {
        /// Content id
        content: u8,
        /// First auxiliary parameter
        #[arg(default_value_t = 0, allow_negative_numbers = true)]
        param: i8,
        /// Second auxiliary parameter
        #[arg(default_value_t = 0)]
        param2: u8,
        /// Serialization version to write
        #[arg(long)]
        ser_fmt: Option<u8>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    let mut settings = match args.config {
        Some(ref path) => Settings::load(path)?,
        None => Settings::default(),
    };

    match args.command {
        Command::Inspect { file } => inspect(&file, &settings),
        Command::Convert {
            input,
            output,
            ser_fmt,
            compression,
            level,
        } => {
            if let Some(ser_fmt) = ser_fmt {
                settings.ser_fmt = ser_fmt;
            }
            if let Some(compression) = compression {
                settings.compression = compression;
            }
            if level.is_some() {
                settings.compression_level = level;
            }
            convert(&input, &output, &settings)
        }
        Command::Node {
            content,
            param,
            param2,
            ser_fmt,
        } => {
            let node = MapNode::with_params(ContentId(content), param, param2);
            print_node(&node, ser_fmt.unwrap_or(settings.ser_fmt))
        }
    }
}

/// Reads a block, detecting the compression of its sections.
fn read_block(path: &Path, settings: &Settings) -> Result<StoredMapBlock> {
    let data = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let mut context = settings.context()?;
    // version and flags precede the first compressed section
    if let Some(compression) = data.get(2..).and_then(Compression::detect) {
        debug!("{} uses {compression}", path.display());
        context.compression = compression;
    }
    deserialize_map_block(&data, context)
        .with_context(|| format!("cannot decode map block {}", path.display()))
}

fn inspect(path: &Path, settings: &Settings) -> Result<()> {
    let stored = read_block(path, settings)?;
    let block = &stored.block;

    info!("{}: version {}", path.display(), stored.ser_fmt);
    info!(
        "flags: underground={}, day_night_differs={}, lighting_expired={}",
        block.is_underground, block.day_night_differs, block.lighting_expired
    );

    let mut histogram = BTreeMap::<u8, usize>::new();
    for node in &block.nodes.0 {
        *histogram.entry(node.content.0).or_default() += 1;
    }
    info!("contents:");
    for (content, count) in histogram {
        info!("  {count:>5} {}", ContentId(content));
    }

    info!("node metadata: {} entries", block.node_metadata.len());
    for (index, metadata) in &block.node_metadata.metadata {
        let pos = MapBlockPos::ZERO.node_pos(*index).0;
        match metadata.sign_text() {
            Ok(Some(text)) => info!("  {pos}: sign {text:?}"),
            Ok(None) => info!(
                "  {pos}: type {} with {} bytes",
                metadata.type_id,
                metadata.data.len()
            ),
            Err(err) => warn!("  {pos}: broken sign: {err}"),
        }
    }

    info!("static objects: {}", block.static_objects.objects.len());
    for object in &block.static_objects.objects {
        info!(
            "  type {} at {} with {} bytes",
            object.type_id,
            object.pos.to_vec3(),
            object.data.len()
        );
    }

    match block.timestamp.seconds() {
        Some(seconds) => info!("saved at {seconds}"),
        None => info!("save time unknown"),
    }
    Ok(())
}

fn convert(input: &Path, output: &Path, settings: &Settings) -> Result<()> {
    let stored = read_block(input, settings)?;
    let context = settings.context()?;

    if let Some(layout) = BlockLayout::for_version(context.ser_fmt) {
        let block = &stored.block;
        if !layout.node_metadata && !block.node_metadata.is_empty() {
            warn!(
                "version {} drops {} node metadata entries",
                context.ser_fmt,
                block.node_metadata.len()
            );
        }
        if !layout.static_objects && !block.static_objects.objects.is_empty() {
            warn!(
                "version {} drops {} static objects",
                context.ser_fmt,
                block.static_objects.objects.len()
            );
        }
    }

    let data = serialize_map_block(&stored.block, context)?;
    fs::write(output, &data).with_context(|| format!("cannot write {}", output.display()))?;
    info!(
        "converted {} (version {}) to {} (version {}, {}, {} bytes)",
        input.display(),
        stored.ser_fmt,
        output.display(),
        context.ser_fmt,
        context.compression,
        data.len()
    );
    Ok(())
}

#[expect(clippy::print_stdout, reason = "the encoded node is the output of the command")]
fn print_node(node: &MapNode, ser_fmt: u8) -> Result<()> {
    let content = node.content;
    debug!(
        "{content}: light_propagates={}, solidness={:?}, light={}, param2={:?}",
        content.light_propagates(),
        content.solidness(),
        node.light(),
        node.param2_kind()
    );
    let bytes = serialize_node(node, ser_fmt)?;
    let hex: Vec<String> = bytes.iter().map(|byte| format!("{byte:02x}")).collect();
    println!("{}", hex.join(" "));
    Ok(())
}
