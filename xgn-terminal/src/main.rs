/// XGN Terminal Viewer
///
/// Loads a window description and renders its active 3D scene.
/// Usage: xgn-terminal [scene.toml]
///
/// Controls:
///   - WASD / E/R: Rotate objects
///   - Arrows / PgUp / PgDn: Move the camera. After the first move the
///     camera looks straight down world -Z with +Y up instead of at the
///     origin, so scenes meant to be flown through should sit below it.
///   - Space: Toggle spinning
///   - Q/ESC: Quit

use anyhow::{Context, Result};
use log::warn;
use std::env;
use xgn_core::{load_window, FileMeshLoader};
use xgn_terminal::{SceneSession, TerminalApp};

const DEFAULT_SCENE: &str = "demos/spinning_shapes.toml";

fn main() -> Result<()> {
    env_logger::builder().format_timestamp(None).init();

    let path = env::args().nth(1).unwrap_or_else(|| DEFAULT_SCENE.to_string());
    println!("XGN Terminal Viewer - Loading {}...", path);

    let window = load_window(&path).with_context(|| format!("loading scene {}", path))?;
    let (session, report) = SceneSession::new(window, &FileMeshLoader);
    for skipped in &report.skipped {
        warn!("skipped object: {}", skipped);
    }
    if report.attached.is_empty() {
        anyhow::bail!("no objects could be loaded from {}", path);
    }

    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(session)?;
    app.run()?;

    println!("Thank you for using the XGN Terminal Viewer!");
    Ok(())
}
