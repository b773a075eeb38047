use anyhow::Result;
use calview_core::viewer::Viewer;

use crate::render::Render;

pub fn run(viewer: Viewer) -> Result<()> {
    println!("{}", viewer.months().render());
    Ok(())
}
