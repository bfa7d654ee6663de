//! Version command implementation.

use crate::style::colors::SemanticStyle;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run() {
    println!();
    println!(
        "  {} {} {}",
        "◆".info(),
        "Vellum".header(),
        format!("v{VERSION}").muted()
    );
    println!("  {}", "Admin console for the document-management backend".muted());
    println!();
    println!("  {}: {}", "Target".muted(), std::env::consts::ARCH);
    println!("  {}: {}", "OS".muted(), std::env::consts::OS);
}
