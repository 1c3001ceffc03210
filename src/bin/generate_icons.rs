use std::path::Path;

use pwa_devtools::icon;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Icons land in the working directory
    icon::generate_default_icons(Path::new(""))?;
    Ok(())
}
