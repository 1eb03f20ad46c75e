// Command line front end for inspecting and playing back drills.

use std::process::ExitCode;

use anyhow::{ensure, Result};
use clap::Parser;
use log::debug;

use choreo::core::cli::{CliArgs, Command};
use choreo::io::load_drill;
use choreo::timeline::{EntityPose, Playhead};
use choreo::utils::logger::init_custom_logger;
use choreo::{ChoreoSettings, DrillState, Interpolator};

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_custom_logger(args.debug);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<()> {
    let settings = match &args.config {
        Some(path) => ChoreoSettings::load(path)?,
        None => ChoreoSettings::default(),
    };
    debug!("Using settings {:?}", settings);
    let state = DrillState::new(load_drill(&args.drill)?, settings);

    match args.command {
        Command::Info => print_info(&state),
        Command::At { time, json } => {
            print_poses(time, &state.poses_at(time), json)?
        }
        Command::Play { fps, json } => play(&state, fps, json)?,
        Command::Path { from, samples } => {
            print_paths(&state, from, samples)?
        }
    }
    Ok(())
}

fn print_info(state: &DrillState) {
    let sequence = state.sequence();
    println!("{}", sequence.info.title);
    println!(
        "{} keyframes, {:.2} s",
        sequence.len(),
        sequence.total_duration()
    );
    for keyframe in sequence.keyframes() {
        let labels: Vec<&str> =
            keyframe.entities.iter().map(|e| e.label.as_str()).collect();
        println!(
            "  #{:<3} at {:>7.2} s for {:>6.2} s  {}",
            keyframe.index,
            keyframe.timestamp,
            keyframe.duration,
            labels.join(", ")
        );
    }
}

fn print_poses(time: f64, poses: &[EntityPose], json: bool) -> Result<()> {
    if json {
        let line = serde_json::json!({ "time": time, "poses": poses });
        println!("{line}");
        return Ok(());
    }
    println!("t = {time:.3} s");
    for pose in poses {
        println!(
            "  {:<12} ({:>8.3}, {:>8.3})  {:>6.1}°",
            pose.label,
            pose.position.x,
            pose.position.y,
            pose.heading.to_degrees()
        );
    }
    Ok(())
}

fn play(state: &DrillState, fps: f64, json: bool) -> Result<()> {
    ensure!(
        fps.is_finite() && fps > 0.0,
        "Frame rate must be positive, got {}",
        fps
    );
    let keyframes = state.sequence().keyframes();
    let total = state.sequence().total_duration();
    let frames = (total * fps).ceil() as usize;
    let mut playhead = Playhead::new();
    for frame in 0..=frames {
        let time = (frame as f64 / fps).min(total);
        let poses = state
            .interpolator()
            .poses_with(&mut playhead, keyframes, time);
        print_poses(time, &poses, json)?;
    }
    Ok(())
}

fn print_paths(
    state: &DrillState,
    from: usize,
    samples: Option<usize>,
) -> Result<()> {
    ensure!(
        from + 1 < state.sequence().len(),
        "Keyframe {} has no following keyframe",
        from
    );
    let interpolator = Interpolator {
        samples: samples.unwrap_or(state.interpolator().samples).max(1),
        ..*state.interpolator()
    };
    let keyframes = state.sequence().keyframes();
    for path in interpolator.transition_paths(keyframes, from) {
        println!("{} ({:.2} m)", path.label, path.length);
        for point in &path.points {
            println!("  {:.3} {:.3}", point.x, point.y);
        }
    }
    Ok(())
}
