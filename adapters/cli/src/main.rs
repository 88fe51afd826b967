#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives terrain discovery against a fixture world.

mod config;
mod fixture;
mod memory_file;
mod render;
mod survey;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use terrain_knowledge_core::{
    Direction, PathStep, RoomCoord, RoomName, RoomPosition, TerrainBlobStore, ROOM_AREA,
};
use terrain_knowledge_system_path_cost::{FindPathOptions, FindPathResult};
use terrain_knowledge_world::{TerrainAtlas, TerrainMap};

use crate::{config::Config, fixture::FixtureWorld, survey::Surveyor};

#[derive(Debug, Parser)]
#[command(name = "terrain-knowledge")]
#[command(about = "Budgeted terrain discovery with compressed persistence")]
struct Cli {
    /// Optional TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan every visible room for a number of ticks and persist what was learned
    Survey {
        /// TOML description of the world being observed
        #[arg(long)]
        world: PathBuf,
        /// JSON file standing in for the persisted memory blob
        #[arg(long)]
        memory: PathBuf,
        /// Number of ticks to simulate
        #[arg(long, default_value_t = 1)]
        ticks: u32,
    },

    /// Print the stored knowledge of one room
    Inspect {
        /// JSON file standing in for the persisted memory blob
        #[arg(long)]
        memory: PathBuf,
        /// Room to print
        #[arg(long)]
        room: String,
    },

    /// Price a path through stored terrain knowledge
    Cost {
        /// TOML description of the world being observed
        #[arg(long)]
        world: PathBuf,
        /// JSON file standing in for the persisted memory blob
        #[arg(long)]
        memory: PathBuf,
        /// Room the path lies in
        #[arg(long)]
        room: String,
        /// Starting cell as `x,y`
        #[arg(long)]
        from: String,
        /// Comma-separated directions, e.g. `top,top,right`
        #[arg(long)]
        moves: String,
        /// Body parts slowing the unit down
        #[arg(long, default_value_t = 0)]
        weight: u32,
        /// Body parts carrying the unit
        #[arg(long, default_value_t = 1)]
        move_parts: u32,
    },
}

/// Entry point for the terrain knowledge command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    env_logger::Builder::new()
        .parse_filters(&config.diagnostics.log_level)
        .parse_default_env()
        .init();

    match cli.command {
        Command::Survey {
            world,
            memory,
            ticks,
        } => survey(&config, &world, &memory, ticks),
        Command::Inspect { memory, room } => inspect(&memory, &RoomName::new(room)),
        Command::Cost {
            world,
            memory,
            room,
            from,
            moves,
            weight,
            move_parts,
        } => {
            let request = CostRequest {
                room: RoomName::new(room),
                from: parse_cell(&from)?,
                moves: parse_moves(&moves)?,
                weight,
                move_parts,
            };
            cost(&world, &memory, &request)
        }
    }
}

fn survey(config: &Config, world: &Path, memory: &Path, ticks: u32) -> Result<()> {
    let world = FixtureWorld::load(world)?;
    let mut blob = memory_file::load(memory)?;
    let rooms: Vec<RoomName> = world.visible_rooms().cloned().collect();
    if rooms.is_empty() {
        log::warn!("world fixture has no visible rooms");
    }
    let mut surveyor = Surveyor::new(config.scan.clone(), rooms);

    for tick in 1..=ticks {
        let mut atlas = TerrainAtlas::new(blob, &world);
        for scan in surveyor.tick(&mut atlas) {
            log::debug!("tick {tick}: offered {} lookups to {}", scan.offered, scan.room);
            println!(
                "tick {tick} {}: {} lookups, {}/{ROOM_AREA} cells known",
                scan.room, scan.performed, scan.known
            );
        }
        let written = atlas.save_all();
        log::info!("tick {tick}: persisted {written} room(s)");
        blob = atlas.into_blob();
    }

    memory_file::save(memory, &blob)
        .with_context(|| format!("failed to persist memory to {}", memory.display()))
}

fn inspect(memory: &Path, room: &RoomName) -> Result<()> {
    let blob = memory_file::load(memory)?;
    if blob.read(room).is_none() {
        bail!("no terrain stored for room {room}");
    }
    let map = TerrainMap::load(room.clone(), &blob);
    print!("{}", render::render_map(&map));
    Ok(())
}

struct CostRequest {
    room: RoomName,
    from: RoomCoord,
    moves: Vec<Direction>,
    weight: u32,
    move_parts: u32,
}

fn cost(world: &Path, memory: &Path, request: &CostRequest) -> Result<()> {
    let world = FixtureWorld::load(world)?;
    let blob = memory_file::load(memory)?;

    let mut cell = request.from;
    let mut steps = Vec::with_capacity(request.moves.len());
    for &direction in &request.moves {
        let Some(step) = PathStep::toward(cell, direction) else {
            bail!(
                "moving {direction:?} from ({}, {}) leaves the room",
                cell.x(),
                cell.y()
            );
        };
        cell = step.cell;
        steps.push(step);
    }

    let result = FindPathResult::new(
        RoomPosition::new(request.room.clone(), request.from),
        RoomPosition::new(request.room.clone(), cell),
        FindPathOptions::default(),
        steps,
    );

    let mut atlas = TerrainAtlas::new(blob, &world);
    for leg in result.legs(&mut atlas) {
        println!(
            "{:?} x{}: ({}, {}) -> ({}, {}) cost {}",
            leg.direction,
            leg.dx.abs().max(leg.dy.abs()),
            i32::from(leg.end.x()) - leg.dx,
            i32::from(leg.end.y()) - leg.dy,
            leg.end.x(),
            leg.end.y(),
            leg.movement_cost
        );
    }
    println!("total cost {}", result.movement_cost(&mut atlas));
    println!(
        "estimated duration {} ticks",
        result.move_duration(&mut atlas, request.weight, request.move_parts)
    );

    let written = atlas.save_all();
    log::info!("persisted {written} room(s) after pricing the path");
    memory_file::save(memory, atlas.blob())
        .with_context(|| format!("failed to persist memory to {}", memory.display()))
}

fn parse_cell(value: &str) -> Result<RoomCoord> {
    let Some((x, y)) = value.split_once(',') else {
        bail!("expected a cell as `x,y`, found `{value}`");
    };
    let x: i32 = x
        .trim()
        .parse()
        .with_context(|| format!("invalid column in `{value}`"))?;
    let y: i32 = y
        .trim()
        .parse()
        .with_context(|| format!("invalid row in `{value}`"))?;
    Ok(RoomCoord::try_new(x, y)?)
}

fn parse_moves(value: &str) -> Result<Vec<Direction>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(parse_direction)
        .collect()
}

fn parse_direction(name: &str) -> Result<Direction> {
    match name.to_ascii_lowercase().replace('-', "_").as_str() {
        "top" => Ok(Direction::Top),
        "top_right" => Ok(Direction::TopRight),
        "right" => Ok(Direction::Right),
        "bottom_right" => Ok(Direction::BottomRight),
        "bottom" => Ok(Direction::Bottom),
        "bottom_left" => Ok(Direction::BottomLeft),
        "left" => Ok(Direction::Left),
        "top_left" => Ok(Direction::TopLeft),
        _ => bail!("unknown direction `{name}`"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_parse_and_stay_in_the_room() {
        assert_eq!(parse_cell("3, 49").expect("valid"), RoomCoord::new(3, 49));
        assert!(parse_cell("50,0").is_err());
        assert!(parse_cell("-1,0").is_err());
        assert!(parse_cell("7").is_err());
    }

    #[test]
    fn moves_accept_both_separators() {
        let moves = parse_moves("top, Top-Right,bottom_left,").expect("valid moves");
        assert_eq!(
            moves,
            vec![Direction::Top, Direction::TopRight, Direction::BottomLeft]
        );
        assert!(parse_moves("up").is_err());
    }
}
