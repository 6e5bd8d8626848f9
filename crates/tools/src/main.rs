use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dungeon_core::{Direction, Floor, FloorParams, GridPos, HeadlessScene, RoomKind};
use xxhash_rust::xxh3::xxh3_64;

#[derive(Parser)]
#[command(name = "floorctl", about = "Inspect procedurally generated dungeon floors")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct GenArgs {
    /// Seed to generate with
    #[arg(long)]
    seed: u64,
    /// Soft target for total room count
    #[arg(long, default_value_t = 12)]
    rooms: usize,
    /// Room side length in tiles (even, at least 6)
    #[arg(long, default_value_t = 8)]
    room_size: u32,
}

#[derive(Subcommand)]
enum Command {
    /// Render the room graph and a per-room table
    Inspect(GenArgs),
    /// Print the canonical xxh3 digest of the generated floor
    Fingerprint(GenArgs),
    /// Dump the floor snapshot as JSON
    Snapshot {
        #[command(flatten)]
        gen_args: GenArgs,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Inspect(gen_args) => {
            let floor = build_floor(&gen_args)?;
            print_graph(&floor);
            print_room_table(&floor);
        }
        Command::Fingerprint(gen_args) => {
            let floor = build_floor(&gen_args)?;
            let digest = xxh3_64(&floor.snapshot().canonical_bytes());
            println!("0x{digest:016x}");
        }
        Command::Snapshot { gen_args, out } => {
            let floor = build_floor(&gen_args)?;
            let json = serde_json::to_string_pretty(&floor.snapshot())
                .context("serializing the floor snapshot")?;
            match out {
                Some(path) => fs::write(&path, json)
                    .with_context(|| format!("writing snapshot to {}", path.display()))?,
                None => println!("{json}"),
            }
        }
    }
    Ok(())
}

fn build_floor(args: &GenArgs) -> Result<Floor> {
    let params = FloorParams {
        room_size: args.room_size,
        target_room_count: args.rooms,
        ..FloorParams::default()
    };
    let mut scene = HeadlessScene::with_tile_atlas(params.tile_len);
    let mut floor = Floor::new(params).context("invalid floor parameters")?;
    floor.generate(&mut scene, Some(args.seed)).context("floor generation failed")?;
    Ok(floor)
}

fn room_glyph(kind: RoomKind) -> char {
    match kind {
        RoomKind::Normal => '#',
        RoomKind::Spawn => 'S',
        RoomKind::Boss => 'B',
        RoomKind::Upgrade => 'U',
    }
}

/// Two text rows per room row: glyphs with `-` for right doorways, then a
/// row of `|` for down doorways.
fn print_graph(floor: &Floor) {
    let coords: Vec<GridPos> = floor.rooms().keys().copied().collect();
    let min_y = coords.iter().map(|coord| coord.y).min().unwrap_or(0);
    let max_y = coords.iter().map(|coord| coord.y).max().unwrap_or(0);
    let min_x = coords.iter().map(|coord| coord.x).min().unwrap_or(0);
    let max_x = coords.iter().map(|coord| coord.x).max().unwrap_or(0);

    for y in min_y..=max_y {
        let mut cells = String::new();
        let mut links = String::new();
        for x in min_x..=max_x {
            match floor.room_at(GridPos { y, x }) {
                Some(room) => {
                    cells.push(room_glyph(room.kind()));
                    cells.push(if room.connections().contains(&Direction::Right) {
                        '-'
                    } else {
                        ' '
                    });
                    links.push(if room.connections().contains(&Direction::Down) {
                        '|'
                    } else {
                        ' '
                    });
                    links.push(' ');
                }
                None => {
                    cells.push_str(". ");
                    links.push_str("  ");
                }
            }
        }
        println!("{}", cells.trim_end());
        if y < max_y {
            println!("{}", links.trim_end());
        }
    }
    println!();
}

fn print_room_table(floor: &Floor) {
    let (completed, total) = floor.completion_status();
    println!("seed {}  rooms {total}  cleared {completed}", floor.seed());

    for (coord, room) in floor.rooms() {
        let connections: Vec<String> =
            room.connections().iter().map(|direction| format!("{direction:?}")).collect();
        let enemies: u32 = room.enemy_pool().values().sum();
        let tags: Vec<&str> = room.tags().iter().map(String::as_str).collect();
        println!(
            "({:>3},{:>3})  {:<7?}  doors [{}]  enemies {}  tags [{}]",
            coord.y,
            coord.x,
            room.kind(),
            connections.join(", "),
            enemies,
            tags.join(", "),
        );
    }
}
