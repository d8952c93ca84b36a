use docopt::Docopt;
use error_chain::bail;
use log::info;
use mazegen::{
    generators::Algorithm,
    maze::Maze,
    Completion, MazeFactory, StubOrder,
};
use petgraph::visit::EdgeRef;
use serde_derive::Deserialize;
use std::{
    io::prelude::*,
    fs::File,
    io,
    sync::Arc
};

const USAGE: &str = "Mazes

Usage:
    mazes_driver -h | --help
    mazes_driver [dfs|prim|eller] [--skill=<n>] [--seed=<s>] [--perfect] [--show-distances] [--save-edges=<path>] [--wall-log=<path>]

Options:
    -h --help              Show this screen.
    --skill=<n>            Skill level 0 to 15, which sets the maze size and room count [default: 0].
    --seed=<s>             Seed for the random generator, the same seed always builds the same maze [default: 0].
    --perfect              Build a maze without rooms.
    --show-distances       Print the distance from every cell to the exit.
    --save-edges=<path>    Serialize the maze to a text file: each line is a pair of numbers. Line 1: n(#vertices) m(#edges). Line 2+ edge between vertices. Uses 1-based vertex indices.
    --wall-log=<path>      Write every wall the carver removed to a text file, one \"x y Direction\" per line in removal order.
";
#[derive(Debug, Deserialize)]
struct MazeArgs {
    cmd_dfs: bool,
    cmd_prim: bool,
    cmd_eller: bool,
    flag_skill: i32,
    flag_seed: u64,
    flag_perfect: bool,
    flag_show_distances: bool,
    flag_save_edges: String,
    flag_wall_log: String,
}

mod errors {
    use error_chain::*;
    error_chain! {

        links {
            Maze(::mazegen::errors::Error, ::mazegen::errors::ErrorKind);
        }

        foreign_links {
            DocOptFailure(::docopt::Error);
            Io(::std::io::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {
    env_logger::init();

    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    let order = Arc::new(StubOrder::new(args.flag_skill,
                                        requested_algorithm(&args),
                                        args.flag_perfect,
                                        args.flag_seed));
    let mut factory = MazeFactory::new();
    factory.submit(order.clone())?;

    match factory.await_completion()? {
        Completion::Delivered => {}
        other => bail!("the maze build finished without a maze: {:?}", other),
    }
    let maze = order.maze().ok_or("the order holds no maze after delivery")?;
    info!("maze delivered with {} rooms", maze.floorplan().rooms().len());

    let start = maze.start_position();
    println!("{}x{} maze, start {} exit {} ({} steps apart)",
             maze.width().0,
             maze.height().0,
             start,
             maze.exit_position(),
             maze.distance(start.x, start.y));

    if args.flag_show_distances {
        print!("{}", maze.distances());
    }

    if !args.flag_save_edges.is_empty() {
        save_maze_graph(&maze, &args.flag_save_edges)?;
    }

    if !args.flag_wall_log.is_empty() {
        save_wall_log(&maze, &args.flag_wall_log)?;
    }

    Ok(())
}

/// Eller's algorithm unless another one is named on the command line.
fn requested_algorithm(maze_args: &MazeArgs) -> Algorithm {
    match (maze_args.cmd_dfs, maze_args.cmd_prim, maze_args.cmd_eller) {
        (true, _, _) => Algorithm::Dfs,
        (_, true, _) => Algorithm::Prim,
        (_, _, true) | (false, false, false) => Algorithm::Eller,
    }
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}

fn save_maze_graph(maze: &Maze, file_path: &str) -> Result<()> {

    let graph = maze.floorplan().passage_graph();
    let mut graph_data = String::new();
    graph_data.push_str(graph.node_count().to_string().as_ref());
    graph_data.push(' ');
    graph_data.push_str(graph.edge_count().to_string().as_ref());
    graph_data.push('\n');

    for edge in graph.edge_references() {
        let src_as_1_based_index = edge.source().index() + 1;
        let dst_as_1_based_index = edge.target().index() + 1;

        graph_data.push_str(src_as_1_based_index.to_string().as_ref());
        graph_data.push(' ');
        graph_data.push_str(dst_as_1_based_index.to_string().as_ref());
        graph_data.push('\n');
    }

    write_text_to_file(&graph_data, file_path)
        .chain_err(|| format!("Failed to write maze graph to text file {}", file_path))?;

    Ok(())
}

fn save_wall_log(maze: &Maze, file_path: &str) -> Result<()> {
    let log_data = maze.floorplan()
        .wall_log()
        .iter()
        .map(|wallboard| format!("{}\n", wallboard))
        .collect::<String>();

    write_text_to_file(&log_data, file_path)
        .chain_err(|| format!("Failed to write wall log to text file {}", file_path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> MazeArgs {
        Docopt::new(USAGE)
            .and_then(|d| d.argv(argv.iter().cloned()).deserialize())
            .unwrap()
    }

    #[test]
    fn algorithm_commands() {
        assert_eq!(requested_algorithm(&parse(&["mazes_driver"])), Algorithm::Eller);
        assert_eq!(requested_algorithm(&parse(&["mazes_driver", "eller"])), Algorithm::Eller);
        assert_eq!(requested_algorithm(&parse(&["mazes_driver", "dfs"])), Algorithm::Dfs);
        assert_eq!(requested_algorithm(&parse(&["mazes_driver", "prim"])), Algorithm::Prim);
    }

    #[test]
    fn option_defaults_and_values() {
        let defaults = parse(&["mazes_driver"]);
        assert_eq!(defaults.flag_skill, 0);
        assert_eq!(defaults.flag_seed, 0);
        assert!(!defaults.flag_perfect);
        assert!(defaults.flag_save_edges.is_empty());

        let args = parse(&["mazes_driver", "eller", "--skill=3", "--seed=42", "--perfect",
                           "--wall-log=walls.txt"]);
        assert!(args.cmd_eller);
        assert_eq!(args.flag_skill, 3);
        assert_eq!(args.flag_seed, 42);
        assert!(args.flag_perfect);
        assert_eq!(args.flag_wall_log, "walls.txt");
    }
}
