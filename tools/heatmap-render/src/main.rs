// Render a point file to a PNG heatmap.
//
// Usage:
//   heatmap-render <points.txt> <width> <height> [-c <options.json>] [-m <min_opacity>] -o <out.png>

use agg_heatmap::OptionsPatch;
use heatmap_render::{parse_options, parse_points, render, save_png, RenderError};
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        print_usage();
        process::exit(1);
    }

    let width: u32 = args[2].parse().unwrap_or_else(|_| fail(&format!("Invalid width: {}", args[2])));
    let height: u32 = args[3].parse().unwrap_or_else(|_| fail(&format!("Invalid height: {}", args[3])));

    let mut config: Option<String> = None;
    let mut output: Option<String> = None;
    let mut min_opacity: Option<f64> = None;
    let mut i = 4;
    while i < args.len() {
        match args[i].as_str() {
            "-c" if i + 1 < args.len() => {
                config = Some(args[i + 1].clone());
                i += 2;
            }
            "-o" if i + 1 < args.len() => {
                output = Some(args[i + 1].clone());
                i += 2;
            }
            "-m" if i + 1 < args.len() => {
                let v = args[i + 1]
                    .parse()
                    .unwrap_or_else(|_| fail(&format!("Invalid min opacity: {}", args[i + 1])));
                min_opacity = Some(v);
                i += 2;
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
    }
    let output = output.unwrap_or_else(|| format!("heatmap_{}x{}.png", width, height));

    if let Err(e) = run(&args[1], width, height, config.as_deref(), min_opacity, &output) {
        fail(&e.to_string());
    }
    println!("Saved: {}", output);
}

fn run(
    points_path: &str,
    width: u32,
    height: u32,
    config: Option<&str>,
    min_opacity: Option<f64>,
    output: &str,
) -> Result<(), RenderError> {
    let points = parse_points(&std::fs::read_to_string(points_path)?)?;
    let patch = match config {
        Some(path) => parse_options(&std::fs::read_to_string(path)?)?,
        None => OptionsPatch::new(),
    };

    println!("Rendering {} points at {}x{}...", points.len(), width, height);
    let surface = render(points, width, height, patch, min_opacity);
    save_png(Path::new(output), &surface)
}

fn fail(msg: &str) -> ! {
    eprintln!("{}", msg);
    process::exit(1);
}

fn print_usage() {
    eprintln!("heatmap-render - render weighted, signed points to a PNG heatmap");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  heatmap-render <points.txt> <width> <height> [-c <options.json>] [-m <min_opacity>] -o <out.png>");
    eprintln!();
    eprintln!("  points.txt    one `x y weight [sign]` per line, `#` starts a comment");
    eprintln!("  options.json  options patch, e.g. {{\"radius\": 10, \"blendMode\": \"lighter\"}}");
}
