use std::io::{self, BufRead};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::fmt::SubscriberBuilder;

use delaunay::prelude::*;

#[derive(Parser)]
#[command(name = "delaunay")]
#[command(
    about = "Triangulate a set of points in any number of dimensions. \
             Reads whitespace-separated coordinates from stdin, one point \
             per non-empty line, and prints the finite Delaunay faces."
)]
struct Cmd {
    /// Set this flag if the input has homogeneous coordinates already.
    #[arg(short = 'g', long)]
    homogeneous: bool,

    /// Insert points in input order instead of shuffling them first.
    #[arg(long)]
    no_randomize: bool,

    /// Also print the Voronoi diagram (vertices and edges).
    #[arg(long)]
    voronoi: bool,
}

fn line_to_point(line: &str) -> Result<Point> {
    let trimmed = line.trim_matches(|c| matches!(c, '(' | ')' | ' ' | '\t'));
    let coords: Vec<f64> = trimmed
        .split_whitespace()
        .map(|x| {
            x.parse::<f64>()
                .with_context(|| format!("bad coordinate {x:?}"))
        })
        .collect::<Result<_>>()?;
    Point::new(coords).context("empty point")
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();

    let stdin = io::stdin();
    let mut points = Vec::new();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        // Lines without a digit are blank or decoration; skip them.
        if !line.chars().any(|c| c.is_ascii_digit()) {
            continue;
        }
        points.push(line_to_point(&line)?);
    }
    if points.is_empty() {
        bail!("no points on stdin");
    }
    tracing::debug!(count = points.len(), "parsed input points");

    let cfg = DtCfg {
        randomize: !cmd.no_randomize,
        homogeneous: cmd.homogeneous,
        name: "cli".to_string(),
    };
    let dt = DelaunayTriangulation::new(points, cfg)
        .context("triangulation failed; consider jittering the input")?;
    if !dt.is_delaunay() {
        bail!("triangulation lost the Delaunay property");
    }
    for face in dt.face_point_sets(false) {
        let row: Vec<String> = face.iter().map(|p| p.to_string()).collect();
        println!("{}", row.join(" "));
    }

    if cmd.voronoi {
        let vor = Voronoi::new(&dt).context("voronoi construction failed")?;
        for p in &vor.points {
            println!("voronoi point {p}");
        }
        for (a, b) in &vor.edges {
            println!("voronoi edge {a} -- {b}");
        }
    }
    Ok(())
}
