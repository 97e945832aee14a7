// Minimal smoke run: resolve one run in memory and print its ffmpeg command

use tick_compositor::{
    config::Config,
    media::MediaController,
    timing::TimeContainer,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🎬 Testing Tick-Compositor Core Functionality");

    // Test 1: Tick parsing
    println!("\n1. Parsing tick codes...");
    let source = std::path::PathBuf::from("clip.mp4");
    let mut timings = TimeContainer::new();
    let timed = timings.parse_str(
        "1=0 ab1cp0a\n2=10 ab1cp0b|ab1cp1a\n3=15 x2\n4=20 ab1cp1b\n",
        &source,
    );
    println!("   Timed lines: {}", timed);

    // Test 2: Speed-change resolution
    println!("\n2. Resolving speed changes...");
    let intervals = timings.resolve_run(&"ab1".parse()?)?;
    for interval in &intervals {
        println!("   {}", interval);
    }

    // Test 3: Block planning
    println!("\n3. Planning blocks...");
    let mut controller = MediaController::new();
    let output = controller.add_output_source("ab1.mp4");
    let blocks = controller.add_intervals(&output, &intervals, &[])?;
    println!("   Blocks: {}", blocks);

    // Test 4: Graph compilation
    println!("\n4. Compiling filter graph...");
    let command = controller.compile(&output, &Config::default())?;
    println!("   {}", command.filter_complex);

    println!("\n5. Command line:");
    println!("   {}", command.to_args().join(" "));

    println!("\n🎉 Core pipeline is working.");
    Ok(())
}
