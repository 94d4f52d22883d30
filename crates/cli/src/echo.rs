use std::time::Duration;

use epaper_core::ConversionReport;
use owo_colors::OwoColorize;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!("\n{} {} {}", "epaper".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Download e-paper issues as EPUB\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

/// Print the summary of one converted issue
pub fn print_report(report: &ConversionReport, elapsed: Duration) {
    eprintln!(
        "  {} {}",
        "Pages:".dimmed(),
        report.pages.to_string().bright_white()
    );
    eprintln!(
        "  {} {} {}",
        "Articles:".dimmed(),
        report.articles_linked.to_string().bright_white(),
        format!("({} rendered)", report.articles_rendered).dimmed()
    );
    eprintln!("  {} {:.1}s", "Time:".dimmed(), elapsed.as_secs_f64());

    if !report.has_cover_image {
        print_warning("Front page image unavailable");
    }
    if report.missing_pictures > 0 {
        print_warning(&format!("{} picture(s) could not be loaded", report.missing_pictures));
    }
    if report.unresolved_pages > 0 {
        print_warning(&format!("{} page(s) only available online", report.unresolved_pages));
    }
}

/// Format file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
