//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::IngestBlueprint;
use serde::Serialize;
use tracing::info;

use super::checks::config_warnings;
use crate::cli::InfoArgs;
use crate::error::load_blueprint;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    frontend: FrontendInfo,
    source: SourceInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    transforms: Vec<TransformInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

#[derive(Serialize)]
struct FrontendInfo {
    frame_id: String,
    sync_policy: &'static str,
    queue_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_interval_s: Option<f64>,
    input: &'static str,
    keep_color: bool,
    already_rectified: bool,
    topics: Vec<String>,
}

#[derive(Serialize)]
struct SourceInfo {
    left_frame: String,
    right_frame: String,
    resolution: String,
    encoding: String,
    rate_hz: f64,
    baseline_m: f64,
}

#[derive(Serialize)]
struct TransformInfo {
    parent: String,
    child: String,
    xyz: [f64; 3],
    rpy_deg: [f64; 3],
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let blueprint = load_blueprint(&args.config)?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{json}");
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn topics(blueprint: &IngestBlueprint) -> Vec<String> {
    let frontend = &blueprint.frontend;
    if frontend.subscribe_rgbd {
        vec![frontend.topics.rgbd.clone()]
    } else {
        vec![
            frontend.topics.left_image.clone(),
            frontend.topics.right_image.clone(),
            frontend.topics.left_info.clone(),
            frontend.topics.right_info.clone(),
        ]
    }
}

fn build_config_info(blueprint: &IngestBlueprint, args: &InfoArgs) -> ConfigInfo {
    let frontend = &blueprint.frontend;
    let source = &blueprint.source;
    let settings = frontend.sync_settings();

    let transforms = if args.transforms {
        blueprint
            .transforms
            .iter()
            .map(|t| TransformInfo {
                parent: t.parent.clone(),
                child: t.child.clone(),
                xyz: [t.location.x, t.location.y, t.location.z],
                rpy_deg: [t.rotation.roll, t.rotation.pitch, t.rotation.yaw],
            })
            .collect()
    } else {
        Vec::new()
    };

    let sinks = if args.sinks {
        blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        frontend: FrontendInfo {
            frame_id: frontend.frame_id.clone(),
            sync_policy: settings.policy.as_str(),
            queue_size: settings.queue_size,
            max_interval_s: settings.max_interval.map(|d| d.as_secs_f64()),
            input: if frontend.subscribe_rgbd {
                "packed"
            } else {
                "four_stream"
            },
            keep_color: frontend.keep_color,
            already_rectified: frontend.already_rectified,
            topics: topics(blueprint),
        },
        source: SourceInfo {
            left_frame: source.left_frame.clone(),
            right_frame: source.right_frame.clone(),
            resolution: format!("{}x{}", source.width, source.height),
            encoding: source.encoding.clone(),
            rate_hz: source.rate_hz,
            baseline_m: source.baseline_m,
        },
        transforms,
        sinks,
        warnings: config_warnings(blueprint),
    }
}

fn print_config_info(blueprint: &IngestBlueprint, args: &InfoArgs) {
    let frontend = &blueprint.frontend;
    let source = &blueprint.source;
    let settings = frontend.sync_settings();

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                Stereo Ingest Configuration                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🎯 Front end");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Reference frame: {}", frontend.frame_id);
    match settings.max_interval {
        Some(max) => println!(
            "   ├─ Sync: {} (queue_size={}, max_interval={:.3}s)",
            settings.policy.as_str(),
            settings.queue_size,
            max.as_secs_f64()
        ),
        None => println!(
            "   ├─ Sync: {} (queue_size={})",
            settings.policy.as_str(),
            settings.queue_size
        ),
    }
    println!(
        "   ├─ Keep color: {}, already rectified: {}",
        frontend.keep_color, frontend.already_rectified
    );
    let topics = topics(blueprint);
    println!("   └─ Topics ({}):", topics.len());
    for topic in &topics {
        println!("        {topic}");
    }

    println!("\n📷 Synthetic rig");
    println!(
        "   ├─ Cameras: {} / {}",
        source.left_frame, source.right_frame
    );
    println!(
        "   ├─ Images: {}x{} {} @ {} Hz",
        source.width, source.height, source.encoding, source.rate_hz
    );
    println!(
        "   └─ Focal: {} px, baseline: {} m",
        source.focal_px, source.baseline_m
    );

    if args.transforms && !blueprint.transforms.is_empty() {
        println!("\n🧭 Static transforms ({})", blueprint.transforms.len());
        for (i, t) in blueprint.transforms.iter().enumerate() {
            let prefix = if i == blueprint.transforms.len() - 1 {
                "└─"
            } else {
                "├─"
            };
            println!(
                "   {} {} -> {} xyz=({}, {}, {}) rpy=({}, {}, {})°",
                prefix,
                t.parent,
                t.child,
                t.location.x,
                t.location.y,
                t.location.z,
                t.rotation.roll,
                t.rotation.pitch,
                t.rotation.yaw
            );
        }
    } else {
        println!("\n🧭 Static transforms: {}", blueprint.transforms.len());
    }

    if args.sinks && !blueprint.sinks.is_empty() {
        println!("\n📤 Sinks ({})", blueprint.sinks.len());
        for (i, sink) in blueprint.sinks.iter().enumerate() {
            let prefix = if i == blueprint.sinks.len() - 1 {
                "└─"
            } else {
                "├─"
            };
            println!(
                "   {} {} ({:?}, queue={})",
                prefix, sink.name, sink.sink_type, sink.queue_capacity
            );
        }
    } else {
        println!("\n📤 Sinks: {}", blueprint.sinks.len());
    }

    let warnings = config_warnings(blueprint);
    if !warnings.is_empty() {
        println!("\n⚠️  Warnings");
        for warning in &warnings {
            println!("   - {warning}");
        }
    }

    println!();
}
